//! REST surface of the campusnet module.

pub mod auth;
pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod openapi;
pub mod routes;

#[cfg(test)]
mod routes_tests;
