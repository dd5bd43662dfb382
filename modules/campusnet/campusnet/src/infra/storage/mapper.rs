//! Entity to domain model mappers.

use campusnet_sdk::{Connection, ConnectionRequest, Preferences, User};
use sea_orm::ActiveValue::Set;

use super::db::db_err;
use super::entity::{connection, connection_request, user};
use crate::domain::error::DomainError;
use crate::domain::repos::StoredUser;

impl TryFrom<user::Model> for StoredUser {
    type Error = DomainError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        let interests: Vec<String> = serde_json::from_str(&model.interests).map_err(db_err)?;
        let preferences: Preferences =
            serde_json::from_str(&model.preferences).map_err(db_err)?;
        Ok(Self {
            user: User {
                id: model.id,
                user_type: model.user_type.parse().map_err(db_err)?,
                name: model.name,
                email: model.email,
                phone: model.phone,
                location: model.location,
                bio: model.bio,
                website: model.website,
                github: model.github,
                linkedin: model.linkedin,
                department: model.department,
                year: model.year,
                profession: model.profession,
                interests,
                preferences,
                created_at: model.created_at,
                updated_at: model.updated_at,
            },
            password_hash: model.password_hash,
        })
    }
}

impl TryFrom<user::Model> for User {
    type Error = DomainError;

    fn try_from(model: user::Model) -> Result<Self, Self::Error> {
        StoredUser::try_from(model).map(|stored| stored.user)
    }
}

impl TryFrom<connection_request::Model> for ConnectionRequest {
    type Error = DomainError;

    fn try_from(model: connection_request::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            sender_id: model.sender_id,
            receiver_id: model.receiver_id,
            status: model.status.parse().map_err(db_err)?,
            message: model.message,
            sent_at: model.sent_at,
            responded_at: model.responded_at,
        })
    }
}

impl From<connection::Model> for Connection {
    fn from(model: connection::Model) -> Self {
        Self {
            id: model.id,
            owner_id: model.owner_id,
            peer_id: model.peer_id,
            connected_at: model.connected_at,
        }
    }
}

/// Profile columns of `user`, leaving credential and creation time untouched.
pub fn profile_active_model(user: &User) -> Result<user::ActiveModel, DomainError> {
    Ok(user::ActiveModel {
        id: Set(user.id),
        name: Set(user.name.clone()),
        phone: Set(user.phone.clone()),
        location: Set(user.location.clone()),
        bio: Set(user.bio.clone()),
        website: Set(user.website.clone()),
        github: Set(user.github.clone()),
        linkedin: Set(user.linkedin.clone()),
        department: Set(user.department.clone()),
        year: Set(user.year.clone()),
        profession: Set(user.profession.clone()),
        name_search: Set(user.name.to_lowercase()),
        profession_search: Set(user
            .profession
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()),
        interests: Set(serde_json::to_string(&user.interests).map_err(db_err)?),
        preferences: Set(serde_json::to_string(&user.preferences).map_err(db_err)?),
        updated_at: Set(user.updated_at),
        ..Default::default()
    })
}

/// Full row for a freshly registered user.
pub fn new_user_active_model(stored: &StoredUser) -> Result<user::ActiveModel, DomainError> {
    let mut model = profile_active_model(&stored.user)?;
    model.user_type = Set(stored.user.user_type.as_str().to_owned());
    model.email = Set(stored.user.email.clone());
    model.password_hash = Set(stored.password_hash.clone());
    model.created_at = Set(stored.user.created_at);
    Ok(model)
}

pub fn request_active_model(request: &ConnectionRequest) -> connection_request::ActiveModel {
    connection_request::ActiveModel {
        id: Set(request.id),
        sender_id: Set(request.sender_id),
        receiver_id: Set(request.receiver_id),
        status: Set(request.status.as_str().to_owned()),
        message: Set(request.message.clone()),
        sent_at: Set(request.sent_at),
        responded_at: Set(request.responded_at),
    }
}
