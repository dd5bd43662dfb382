//! Campusnet module implementation.
//!
//! Public models live in `campusnet-sdk` and are re-exported here.

pub use campusnet_sdk::{
    AdminStats, Connection, ConnectionRequest, ConnectionStatus, RequestStatus, User,
    UserSummary, UserType,
};

pub mod module;
pub use module::CampusnetModule;

pub use config::{AdminBootstrap, CampusnetConfig};

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
