//! Ticket domain model.
//!
//! # Responsibility
//! - Define the maintenance ticket record and its lifecycle states.
//! - Validate required fields before persistence.
//!
//! # Invariants
//! - Status only ever transitions `open -> closed`, never back.
//! - `closed_at` is set if and only if the ticket is closed.
//! - `room_uuid` always references an existing room.

use crate::model::estate::RoomId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a ticket.
pub type TicketId = Uuid;

/// Ticket lifecycle state. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    /// Reported and awaiting resolution.
    Open,
    /// Resolved; no further transitions.
    Closed,
}

/// A maintenance request raised against a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Stable global ID.
    pub uuid: TicketId,
    /// Room this ticket was raised against.
    pub room_uuid: RoomId,
    /// Reporter display name.
    pub customer_name: String,
    /// Reporter contact number.
    pub phone_number: String,
    /// Free-form problem category. The UI offers an enumerated list but
    /// the core only requires a non-empty string.
    pub problem_type: String,
    /// Free-text description.
    pub note: String,
    /// Lifecycle state.
    pub status: TicketStatus,
    /// Creation time in epoch milliseconds.
    pub created_at: i64,
    /// Close time in epoch milliseconds. Set only when closed; re-closing
    /// re-stamps this value.
    pub closed_at: Option<i64>,
}

impl Ticket {
    /// Checks record-level invariants before persistence.
    ///
    /// # Errors
    /// - [`TicketValidationError::MissingField`] when a required text field
    ///   is empty after trimming.
    /// - [`TicketValidationError::ClosedAtMismatch`] when `closed_at`
    ///   presence disagrees with `status`.
    pub fn validate(&self) -> Result<(), TicketValidationError> {
        for (field, value) in [
            ("customer_name", &self.customer_name),
            ("phone_number", &self.phone_number),
            ("problem_type", &self.problem_type),
            ("note", &self.note),
        ] {
            if value.trim().is_empty() {
                return Err(TicketValidationError::MissingField(field));
            }
        }

        match (self.status, self.closed_at) {
            (TicketStatus::Open, Some(_)) | (TicketStatus::Closed, None) => {
                Err(TicketValidationError::ClosedAtMismatch)
            }
            _ => Ok(()),
        }
    }
}

/// Ticket record validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketValidationError {
    /// A required text field is empty.
    MissingField(&'static str),
    /// `closed_at` presence disagrees with `status`.
    ClosedAtMismatch,
}

impl Display for TicketValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "ticket field `{field}` must not be empty"),
            Self::ClosedAtMismatch => {
                write!(f, "ticket closed_at must be set exactly when status is closed")
            }
        }
    }
}

impl Error for TicketValidationError {}

#[cfg(test)]
mod tests {
    use super::{Ticket, TicketStatus, TicketValidationError};
    use uuid::Uuid;

    fn open_ticket() -> Ticket {
        Ticket {
            uuid: Uuid::new_v4(),
            room_uuid: Uuid::new_v4(),
            customer_name: "Ada".to_string(),
            phone_number: "555-0101".to_string(),
            problem_type: "plumbing".to_string(),
            note: "leaking tap".to_string(),
            status: TicketStatus::Open,
            created_at: 1,
            closed_at: None,
        }
    }

    #[test]
    fn valid_open_ticket_passes() {
        open_ticket().validate().expect("open ticket should be valid");
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut ticket = open_ticket();
        ticket.note = "   ".to_string();
        let err = ticket.validate().expect_err("blank note must be rejected");
        assert_eq!(err, TicketValidationError::MissingField("note"));
    }

    #[test]
    fn closed_at_must_match_status() {
        let mut ticket = open_ticket();
        ticket.closed_at = Some(2);
        assert_eq!(
            ticket.validate().expect_err("open with closed_at"),
            TicketValidationError::ClosedAtMismatch
        );

        ticket.status = TicketStatus::Closed;
        ticket.validate().expect("closed with closed_at is valid");

        ticket.closed_at = None;
        assert_eq!(
            ticket.validate().expect_err("closed without closed_at"),
            TicketValidationError::ClosedAtMismatch
        );
    }
}
