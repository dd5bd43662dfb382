//! In-memory repositories for service unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use campusnet_sdk::{
    Connection, ConnectionRequest, RequestStatus, User, UserFilter, UserSummary, UserType,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repos::{
    ConnectionsRepository, StoredUser, UserListQuery, UserTypeCounts, UsersRepository,
};

#[derive(Default)]
struct State {
    users: HashMap<Uuid, StoredUser>,
    requests: Vec<ConnectionRequest>,
    connections: Vec<Connection>,
}

/// One store backing both repository traits, so cascades can be observed.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    fn with<T>(&self, f: impl FnOnce(&mut State) -> T) -> T {
        let mut guard = self.state.lock().unwrap();
        f(&mut guard)
    }

    pub fn add_user(&self, user_type: UserType, name: &str, profession: Option<&str>) -> User {
        let now = OffsetDateTime::now_utc();
        let id = Uuid::new_v4();
        let user = User {
            id,
            user_type,
            name: name.to_owned(),
            email: format!("{id}@example.com"),
            phone: String::new(),
            location: String::new(),
            bio: String::new(),
            website: String::new(),
            github: String::new(),
            linkedin: String::new(),
            department: Some("Engineering".to_owned()),
            year: Some("2".to_owned()),
            profession: profession.map(str::to_owned),
            interests: Vec::new(),
            preferences: campusnet_sdk::Preferences::default(),
            created_at: now,
            updated_at: now,
        };
        self.with(|s| {
            s.users.insert(
                id,
                StoredUser {
                    user: user.clone(),
                    password_hash: String::new(),
                },
            );
        });
        user
    }

    pub fn set_created_at(&self, id: Uuid, at: OffsetDateTime) {
        self.with(|s| {
            if let Some(stored) = s.users.get_mut(&id) {
                stored.user.created_at = at;
            }
        });
    }

    pub fn stored_user(&self, id: Uuid) -> Option<StoredUser> {
        self.with(|s| s.users.get(&id).cloned())
    }

    pub fn connection_rows(&self) -> Vec<Connection> {
        self.with(|s| s.connections.clone())
    }

    pub fn requests(&self) -> Vec<ConnectionRequest> {
        self.with(|s| s.requests.clone())
    }
}

fn matches_filter(user: &User, filter: &UserFilter) -> bool {
    let type_ok = filter.user_type.is_none_or(|t| t == user.user_type);
    let search_ok = filter.search_term().is_none_or(|term| {
        let term = term.to_lowercase();
        user.name.to_lowercase().contains(&term)
            || user
                .profession
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&term))
    });
    type_ok && search_ok
}

#[async_trait]
impl UsersRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        Ok(self.with(|s| s.users.get(&id).map(|u| u.user.clone())))
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<StoredUser>, DomainError> {
        Ok(self.with(|s| s.users.values().find(|u| u.user.email == email).cloned()))
    }

    async fn find_credentials_by_id(&self, id: Uuid) -> Result<Option<StoredUser>, DomainError> {
        Ok(self.with(|s| s.users.get(&id).cloned()))
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        Ok(self.with(|s| s.users.values().any(|u| u.user.email == email)))
    }

    async fn insert(&self, user: &StoredUser) -> Result<(), DomainError> {
        self.with(|s| {
            s.users.insert(user.user.id, user.clone());
        });
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> Result<(), DomainError> {
        self.with(|s| {
            if let Some(stored) = s.users.get_mut(&user.id) {
                stored.user = user.clone();
            }
        });
        Ok(())
    }

    async fn update_password(
        &self,
        id: Uuid,
        password_hash: &str,
        updated_at: OffsetDateTime,
    ) -> Result<(), DomainError> {
        self.with(|s| {
            if let Some(stored) = s.users.get_mut(&id) {
                password_hash.clone_into(&mut stored.password_hash);
                stored.user.updated_at = updated_at;
            }
        });
        Ok(())
    }

    async fn list_by_type(&self, user_type: UserType) -> Result<Vec<User>, DomainError> {
        let mut users: Vec<User> = self.with(|s| {
            s.users
                .values()
                .filter(|u| u.user.user_type == user_type)
                .map(|u| u.user.clone())
                .collect()
        });
        users.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(users)
    }

    async fn summaries(
        &self,
        ids: &[Uuid],
        filter: &UserFilter,
    ) -> Result<Vec<UserSummary>, DomainError> {
        Ok(self.with(|s| {
            ids.iter()
                .filter_map(|id| s.users.get(id))
                .filter(|u| matches_filter(&u.user, filter))
                .map(|u| u.user.summary())
                .collect()
        }))
    }

    async fn discover(
        &self,
        exclude: &[Uuid],
        filter: &UserFilter,
        limit: u64,
    ) -> Result<Vec<UserSummary>, DomainError> {
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(self.with(|s| {
            s.users
                .values()
                .filter(|u| u.user.user_type != UserType::Admin)
                .filter(|u| !exclude.contains(&u.user.id))
                .filter(|u| matches_filter(&u.user, filter))
                .take(limit)
                .map(|u| u.user.summary())
                .collect()
        }))
    }

    async fn count_by_type(&self) -> Result<UserTypeCounts, DomainError> {
        Ok(self.with(|s| {
            let mut counts = UserTypeCounts::default();
            for u in s.users.values() {
                match u.user.user_type {
                    UserType::Student => counts.students += 1,
                    UserType::Professional => counts.professionals += 1,
                    UserType::Admin => counts.admins += 1,
                }
            }
            counts
        }))
    }

    async fn list_page(&self, query: &UserListQuery) -> Result<(Vec<User>, u64), DomainError> {
        let mut users: Vec<User> = self.with(|s| {
            s.users
                .values()
                .map(|u| u.user.clone())
                .filter(|u| query.user_type.is_none_or(|t| t == u.user_type))
                .filter(|u| {
                    query.search.as_deref().is_none_or(|term| {
                        let term = term.to_lowercase();
                        u.name.to_lowercase().contains(&term) || u.email.contains(&term)
                    })
                })
                .collect()
        });
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = users.len() as u64;
        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);
        Ok((users.into_iter().skip(offset).take(limit).collect(), total))
    }

    async fn delete_with_relations(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.with(|s| {
            if s.users.remove(&id).is_none() {
                return false;
            }
            s.connections.retain(|c| c.owner_id != id && c.peer_id != id);
            s.requests
                .retain(|r| r.sender_id != id && r.receiver_id != id);
            true
        }))
    }
}

#[async_trait]
impl ConnectionsRepository for InMemoryStore {
    async fn find_request(&self, id: Uuid) -> Result<Option<ConnectionRequest>, DomainError> {
        Ok(self.with(|s| s.requests.iter().find(|r| r.id == id).cloned()))
    }

    async fn find_pending(
        &self,
        sender: Uuid,
        receiver: Uuid,
    ) -> Result<Option<ConnectionRequest>, DomainError> {
        Ok(self.with(|s| {
            s.requests
                .iter()
                .find(|r| {
                    r.sender_id == sender
                        && r.receiver_id == receiver
                        && r.status == RequestStatus::Pending
                })
                .cloned()
        }))
    }

    async fn insert_request(&self, request: &ConnectionRequest) -> Result<(), DomainError> {
        self.with(|s| s.requests.push(request.clone()));
        Ok(())
    }

    async fn pending_for(&self, receiver: Uuid) -> Result<Vec<ConnectionRequest>, DomainError> {
        let mut pending: Vec<ConnectionRequest> = self.with(|s| {
            s.requests
                .iter()
                .filter(|r| r.receiver_id == receiver && r.status == RequestStatus::Pending)
                .cloned()
                .collect()
        });
        pending.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        Ok(pending)
    }

    async fn pending_counterparts(&self, user: Uuid) -> Result<Vec<Uuid>, DomainError> {
        Ok(self.with(|s| {
            s.requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .filter_map(|r| {
                    if r.sender_id == user {
                        Some(r.receiver_id)
                    } else if r.receiver_id == user {
                        Some(r.sender_id)
                    } else {
                        None
                    }
                })
                .collect()
        }))
    }

    async fn close_request(
        &self,
        id: Uuid,
        status: RequestStatus,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        Ok(self.with(|s| {
            match s
                .requests
                .iter_mut()
                .find(|r| r.id == id && r.status == RequestStatus::Pending)
            {
                Some(r) => {
                    r.status = status;
                    r.responded_at = Some(responded_at);
                    true
                }
                None => false,
            }
        }))
    }

    async fn accept_request(
        &self,
        request: &ConnectionRequest,
        responded_at: OffsetDateTime,
    ) -> Result<bool, DomainError> {
        Ok(self.with(|s| {
            let Some(r) = s
                .requests
                .iter_mut()
                .find(|r| r.id == request.id && r.status == RequestStatus::Pending)
            else {
                return false;
            };
            r.status = RequestStatus::Accepted;
            r.responded_at = Some(responded_at);

            for (owner, peer) in [
                (request.sender_id, request.receiver_id),
                (request.receiver_id, request.sender_id),
            ] {
                let exists = s
                    .connections
                    .iter()
                    .any(|c| c.owner_id == owner && c.peer_id == peer);
                if !exists {
                    s.connections.push(Connection {
                        id: Uuid::new_v4(),
                        owner_id: owner,
                        peer_id: peer,
                        connected_at: responded_at,
                    });
                }
            }
            true
        }))
    }

    async fn connection_exists(&self, owner: Uuid, peer: Uuid) -> Result<bool, DomainError> {
        Ok(self.with(|s| {
            s.connections
                .iter()
                .any(|c| c.owner_id == owner && c.peer_id == peer)
        }))
    }

    async fn connections_of(&self, owner: Uuid) -> Result<Vec<Connection>, DomainError> {
        let mut rows: Vec<Connection> = self.with(|s| {
            s.connections
                .iter()
                .filter(|c| c.owner_id == owner)
                .cloned()
                .collect()
        });
        rows.sort_by(|a, b| b.connected_at.cmp(&a.connected_at));
        Ok(rows)
    }

    async fn delete_pair(&self, a: Uuid, b: Uuid) -> Result<u64, DomainError> {
        Ok(self.with(|s| {
            let before = s.connections.len();
            s.connections.retain(|c| {
                !((c.owner_id == a && c.peer_id == b) || (c.owner_id == b && c.peer_id == a))
            });
            (before - s.connections.len()) as u64
        }))
    }

    async fn count_connection_rows(&self) -> Result<u64, DomainError> {
        Ok(self.with(|s| s.connections.len() as u64))
    }

    async fn count_pending(&self) -> Result<u64, DomainError> {
        Ok(self.with(|s| {
            s.requests
                .iter()
                .filter(|r| r.status == RequestStatus::Pending)
                .count() as u64
        }))
    }
}
