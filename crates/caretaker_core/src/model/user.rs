//! User domain model.
//!
//! # Responsibility
//! - Define the account record used for authentication and scoping.
//! - Validate role/assignment consistency before persistence.
//!
//! # Invariants
//! - Usernames are unique among persisted users.
//! - Admins never carry a building/room assignment.
//! - Creation requires customers to carry a full building/room assignment;
//!   reconciliation may later clear either half when the referenced
//!   building or room is removed, so persisted customers can be partially
//!   or fully unassigned.

use crate::model::estate::{BuildingId, RoomId};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a user.
pub type UserId = Uuid;

/// Account role controlling visibility and permitted actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full visibility over buildings, tickets and users.
    Admin,
    /// Scoped to one assigned building/room.
    Customer,
}

/// Account record. Credentials are stored as a salted hash, never as
/// plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Stable global ID.
    pub uuid: UserId,
    /// Unique login name.
    pub username: String,
    /// Hex-encoded salted SHA-256 digest of the password.
    pub password_hash: String,
    /// Hex-encoded random salt used for `password_hash`.
    pub password_salt: String,
    /// Account role.
    pub role: Role,
    /// Assigned building for customers. `None` for admins or customers
    /// whose building was removed by reconciliation.
    pub building_uuid: Option<BuildingId>,
    /// Assigned room for customers; belongs to `building_uuid`.
    pub room_uuid: Option<RoomId>,
}

impl User {
    /// Checks record-level invariants before persistence.
    ///
    /// Assignment *presence* for customers is a creation-time rule enforced
    /// by the user service; a persisted customer may legally be unassigned.
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.username.trim().is_empty() {
            return Err(UserValidationError::MissingUsername);
        }
        if self.password_hash.trim().is_empty() || self.password_salt.trim().is_empty() {
            return Err(UserValidationError::MissingCredentials);
        }
        if self.role == Role::Admin && (self.building_uuid.is_some() || self.room_uuid.is_some()) {
            return Err(UserValidationError::AdminWithAssignment);
        }
        Ok(())
    }

    /// Returns whether this user carries a full building/room assignment.
    pub fn is_assigned(&self) -> bool {
        self.building_uuid.is_some() && self.room_uuid.is_some()
    }
}

/// User record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Username is empty.
    MissingUsername,
    /// Password hash or salt is empty.
    MissingCredentials,
    /// Admin accounts must not be assigned to a building/room.
    AdminWithAssignment,
}

impl Display for UserValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingUsername => write!(f, "username must not be empty"),
            Self::MissingCredentials => write!(f, "password hash and salt must not be empty"),
            Self::AdminWithAssignment => {
                write!(f, "admin accounts must not carry a building/room assignment")
            }
        }
    }
}

impl Error for UserValidationError {}

#[cfg(test)]
mod tests {
    use super::{Role, User, UserValidationError};
    use uuid::Uuid;

    fn base_user(role: Role) -> User {
        User {
            uuid: Uuid::new_v4(),
            username: "ada".to_string(),
            password_hash: "ab".to_string(),
            password_salt: "cd".to_string(),
            role,
            building_uuid: None,
            room_uuid: None,
        }
    }

    #[test]
    fn admin_without_assignment_is_valid() {
        base_user(Role::Admin).validate().expect("admin is valid");
    }

    #[test]
    fn admin_with_assignment_is_rejected() {
        let mut user = base_user(Role::Admin);
        user.building_uuid = Some(Uuid::new_v4());
        user.room_uuid = Some(Uuid::new_v4());
        assert_eq!(
            user.validate().expect_err("assigned admin"),
            UserValidationError::AdminWithAssignment
        );
    }

    #[test]
    fn customer_assignment_may_be_partial_after_reconciliation() {
        let mut user = base_user(Role::Customer);
        user.validate().expect("unassigned customer is storable");
        assert!(!user.is_assigned());

        user.building_uuid = Some(Uuid::new_v4());
        user.validate().expect("half-cleared assignment is storable");
        assert!(!user.is_assigned());

        user.room_uuid = Some(Uuid::new_v4());
        user.validate().expect("full assignment is valid");
        assert!(user.is_assigned());
    }
}
