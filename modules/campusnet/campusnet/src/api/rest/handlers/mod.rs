pub mod admin;
pub mod auth;
pub mod connections;
pub mod system;
pub mod users;
