//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Repository writes enforce model validation before persistence.
//! - Repository reads reject invalid persisted state instead of masking
//!   it.
//! - Repository APIs return semantic errors (`NotFound`) in addition to
//!   DB transport errors.

use crate::db::DbError;
use crate::model::ticket::TicketValidationError;
use crate::model::user::UserValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod estate_repo;
pub mod ticket_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Error shared by the estate, ticket and user repositories.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// The referenced record does not exist.
    NotFound { entity: &'static str, id: Uuid },
    /// Persisted data cannot be converted to a valid domain record.
    InvalidData(String),
    /// A record failed model validation before a write.
    Validation(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::Validation(message) => write!(f, "{message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TicketValidationError> for RepoError {
    fn from(value: TicketValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

impl From<UserValidationError> for RepoError {
    fn from(value: UserValidationError) -> Self {
        Self::Validation(value.to_string())
    }
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}
