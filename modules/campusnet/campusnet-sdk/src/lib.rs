//! Campusnet SDK
//!
//! Public models for the `campusnet` module:
//! - identities (`User`, `UserSummary`, `NewUser`, `ProfilePatch`)
//! - the connection workflow (`ConnectionRequest`, `Connection`, `ConnectionStatus`)
//! - admin aggregates (`AdminStats`, `UserPage`)

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod models;

pub use models::{
    AdminStats, Connection, ConnectionRequest, ConnectionStatus, ConnectionWithPeer, NewUser,
    PendingRequest, Preferences, ProfilePatch, ProfileVisibility, RequestStatus, UnknownVariant,
    User, UserFilter, UserPage, UserSummary, UserType,
};
