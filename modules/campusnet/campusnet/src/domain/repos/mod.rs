mod connections_repo;
mod users_repo;

pub use connections_repo::ConnectionsRepository;
pub use users_repo::{StoredUser, UserListQuery, UserTypeCounts, UsersRepository};
