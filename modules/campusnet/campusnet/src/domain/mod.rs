pub mod error;
pub mod password;
pub mod repos;
pub mod service;
