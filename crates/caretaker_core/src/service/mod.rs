//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply the access control gate before any privileged mutation.
//! - Map repository errors onto the caller-facing error kinds.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence
//!   contracts.
//! - `Unauthorized` reveals nothing about which check failed.

use crate::repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

pub mod estate_service;
pub mod ticket_service;
pub mod user_service;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Caller-facing error kinds for the service surface.
#[derive(Debug)]
pub enum ServiceError {
    /// Missing/invalid required input, duplicate username and the like.
    /// The message is safe to display to the caller.
    Validation(String),
    /// The referenced record does not resolve.
    NotFound { entity: &'static str, id: Uuid },
    /// Credential mismatch or an action the role does not permit.
    Unauthorized,
    /// Persistence failure; logged in detail, surfaced generically.
    Internal(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "{message}"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Internal(_) => write!(f, "internal error"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Internal(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity, id } => Self::NotFound { entity, id },
            RepoError::Validation(message) => Self::Validation(message),
            other => Self::Internal(other),
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}
