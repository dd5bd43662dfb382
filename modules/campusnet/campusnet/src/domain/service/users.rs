use std::sync::Arc;

use campusnet_sdk::{NewUser, Preferences, ProfilePatch, User, UserType};
use time::OffsetDateTime;
use uuid::Uuid;

use super::ServiceConfig;
use crate::config::AdminBootstrap;
use crate::domain::error::DomainError;
use crate::domain::password::{hash_password, verify_password};
use crate::domain::repos::{StoredUser, UsersRepository};
use crate::infra::tokens::JwtCodec;

/// A freshly authenticated user and the token that proves it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct UsersService {
    repo: Arc<dyn UsersRepository>,
    tokens: Arc<JwtCodec>,
    config: ServiceConfig,
}

impl UsersService {
    pub fn new(repo: Arc<dyn UsersRepository>, tokens: Arc<JwtCodec>, config: ServiceConfig) -> Self {
        Self {
            repo,
            tokens,
            config,
        }
    }

    /// Lifetime of issued session tokens.
    #[must_use]
    pub fn session_ttl_secs(&self) -> i64 {
        self.tokens.ttl_secs()
    }

    /// # Errors
    /// `Validation` on bad input, `EmailTaken` if the e-mail is registered.
    pub async fn register(&self, new_user: NewUser) -> Result<AuthSession, DomainError> {
        tracing::info!(user_type = %new_user.user_type, "Registering user");

        if new_user.user_type == UserType::Admin {
            return Err(DomainError::validation(
                "userType",
                "userType must be student or professional",
            ));
        }
        let user = self.create_user(new_user).await?;
        let token = self.tokens.issue(&user)?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(AuthSession { user, token })
    }

    /// # Errors
    /// `InvalidCredentials` on an unknown e-mail or a wrong password.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, DomainError> {
        let email = normalize_email(email);
        tracing::debug!("Login attempt");

        let Some(stored) = self.repo.find_credentials(&email).await? else {
            tracing::debug!("Login failed: unknown e-mail");
            return Err(DomainError::InvalidCredentials);
        };
        if !check_password(password, &stored.password_hash).await? {
            tracing::debug!(user_id = %stored.user.id, "Login failed: wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.tokens.issue(&stored.user)?;
        tracing::info!(user_id = %stored.user.id, "User logged in");
        Ok(AuthSession {
            user: stored.user,
            token,
        })
    }

    /// # Errors
    /// `NotFound` if there is no such user.
    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))
    }

    /// Lookup used by the authentication gate.
    ///
    /// # Errors
    /// Propagates repository failures.
    pub async fn find_user(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        self.repo.find_by_id(id).await
    }

    /// # Errors
    /// `NotFound` for an unknown actor, `Validation` when the patch breaks a
    /// profile rule.
    pub async fn update_profile(&self, actor: Uuid, patch: ProfilePatch) -> Result<User, DomainError> {
        tracing::info!(user_id = %actor, "Updating profile");

        let mut user = self.get_user(actor).await?;
        apply_patch(&mut user, patch);
        self.validate_profile(&user)?;
        user.updated_at = OffsetDateTime::now_utc();

        self.repo.update_profile(&user).await?;
        tracing::info!(user_id = %actor, "Profile updated");
        Ok(user)
    }

    /// # Errors
    /// `InvalidCredentials` if `current` does not match, `Validation` if the
    /// new password is too short.
    pub async fn update_password(
        &self,
        actor: Uuid,
        current: &str,
        new_password: &str,
    ) -> Result<(), DomainError> {
        tracing::info!(user_id = %actor, "Updating password");

        let stored = self
            .repo
            .find_credentials_by_id(actor)
            .await?
            .ok_or_else(|| DomainError::not_found("User"))?;
        if !check_password(current, &stored.password_hash).await? {
            return Err(DomainError::InvalidCredentials);
        }
        self.validate_password(new_password)?;

        let hash = hash_off_thread(new_password).await?;
        self.repo
            .update_password(actor, &hash, OffsetDateTime::now_utc())
            .await?;
        tracing::info!(user_id = %actor, "Password updated");
        Ok(())
    }

    /// # Errors
    /// Propagates repository failures.
    pub async fn list_professionals(&self) -> Result<Vec<User>, DomainError> {
        tracing::debug!("Listing professionals");
        self.repo.list_by_type(UserType::Professional).await
    }

    /// Create the configured admin identity unless the e-mail is taken.
    /// Returns whether a user was created.
    ///
    /// # Errors
    /// `Validation` if the configured credentials are unusable.
    pub async fn ensure_admin(&self, bootstrap: &AdminBootstrap) -> Result<bool, DomainError> {
        let email = normalize_email(&bootstrap.email);
        if self.repo.email_exists(&email).await? {
            tracing::debug!("Admin account already present");
            return Ok(false);
        }
        let user = self
            .create_user(NewUser {
                user_type: UserType::Admin,
                name: bootstrap.name.clone(),
                email,
                password: bootstrap.password.clone(),
                department: None,
                year: None,
                profession: None,
                interests: Vec::new(),
            })
            .await?;
        tracing::info!(user_id = %user.id, "Admin account created");
        Ok(true)
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let email = normalize_email(&new_user.email);
        validate_email(&email)?;
        self.validate_password(&new_user.password)?;

        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            user_type: new_user.user_type,
            name: new_user.name.trim().to_owned(),
            email,
            phone: String::new(),
            location: String::new(),
            bio: String::new(),
            website: String::new(),
            github: String::new(),
            linkedin: String::new(),
            department: clean_optional(new_user.department),
            year: clean_optional(new_user.year),
            profession: clean_optional(new_user.profession),
            interests: clean_interests(new_user.interests),
            preferences: Preferences::default(),
            created_at: now,
            updated_at: now,
        };
        self.validate_profile(&user)?;

        if self.repo.email_exists(&user.email).await? {
            return Err(DomainError::EmailTaken);
        }

        let password_hash = hash_off_thread(&new_user.password).await?;
        self.repo
            .insert(&StoredUser {
                user: user.clone(),
                password_hash,
            })
            .await?;
        Ok(user)
    }

    fn validate_password(&self, password: &str) -> Result<(), DomainError> {
        if password.chars().count() < self.config.min_password_len {
            return Err(DomainError::validation(
                "password",
                format!(
                    "Password must be at least {} characters",
                    self.config.min_password_len
                ),
            ));
        }
        Ok(())
    }

    fn validate_profile(&self, user: &User) -> Result<(), DomainError> {
        if user.name.is_empty() {
            return Err(DomainError::validation("name", "Name is required"));
        }
        if user.name.chars().count() > self.config.max_name_length {
            return Err(DomainError::validation(
                "name",
                format!(
                    "Name must be at most {} characters",
                    self.config.max_name_length
                ),
            ));
        }
        match user.user_type {
            UserType::Student => {
                if user.department.is_none() {
                    return Err(DomainError::validation(
                        "department",
                        "Department is required for students",
                    ));
                }
                if user.year.is_none() {
                    return Err(DomainError::validation(
                        "year",
                        "Year is required for students",
                    ));
                }
            }
            UserType::Professional => {
                if user.profession.is_none() {
                    return Err(DomainError::validation(
                        "profession",
                        "Profession is required for professionals",
                    ));
                }
            }
            UserType::Admin => {}
        }
        Ok(())
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let invalid = || DomainError::validation("email", "Please provide a valid email");

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }
    Ok(())
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn clean_interests(interests: Vec<String>) -> Vec<String> {
    interests
        .into_iter()
        .map(|i| i.trim().to_owned())
        .filter(|i| !i.is_empty())
        .collect()
}

fn apply_patch(user: &mut User, patch: ProfilePatch) {
    let ProfilePatch {
        name,
        phone,
        location,
        bio,
        website,
        github,
        linkedin,
        department,
        year,
        profession,
        interests,
        preferences,
    } = patch;

    if let Some(name) = name {
        user.name = name.trim().to_owned();
    }
    for (slot, value) in [
        (&mut user.phone, phone),
        (&mut user.location, location),
        (&mut user.bio, bio),
        (&mut user.website, website),
        (&mut user.github, github),
        (&mut user.linkedin, linkedin),
    ] {
        if let Some(value) = value {
            *slot = value.trim().to_owned();
        }
    }
    for (slot, value) in [
        (&mut user.department, department),
        (&mut user.year, year),
        (&mut user.profession, profession),
    ] {
        if value.is_some() {
            *slot = clean_optional(value);
        }
    }
    if let Some(interests) = interests {
        user.interests = clean_interests(interests);
    }
    if let Some(preferences) = preferences {
        user.preferences = preferences;
    }
}

// Argon2 is deliberately slow; keep it off the async workers.
async fn hash_off_thread(password: &str) -> Result<String, DomainError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DomainError::internal(format!("hashing task failed: {e}")))?
}

async fn check_password(password: &str, hash: &str) -> Result<bool, DomainError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| DomainError::internal(format!("verification task failed: {e}")))?
}
