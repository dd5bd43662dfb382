//! Storage infrastructure for campusnet.

pub mod connections_sea_repo;
pub mod db;
pub mod entity;
pub mod mapper;
pub mod migrations;
pub mod users_sea_repo;

pub use connections_sea_repo::SeaOrmConnectionsRepository;
pub use users_sea_repo::SeaOrmUsersRepository;
