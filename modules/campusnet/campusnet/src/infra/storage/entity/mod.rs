pub mod connection;
pub mod connection_request;
pub mod user;
