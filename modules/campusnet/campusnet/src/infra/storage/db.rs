//! Database error conversion helpers.

use std::fmt::Display;

use sea_orm::{DbErr, SqlErr};

use crate::domain::error::DomainError;

/// Convert any displayable error into a `DomainError::Database`.
pub fn db_err(e: impl Display) -> DomainError {
    DomainError::database(e.to_string())
}

/// Map a unique-constraint violation to `conflict`, anything else to `db_err`.
pub fn unique_or_db_err(e: DbErr, conflict: DomainError) -> DomainError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        conflict
    } else {
        db_err(e)
    }
}
