//! Ticket lifecycle use-cases.
//!
//! # Responsibility
//! - Create open tickets against existing rooms.
//! - Close tickets, gated by the acting user's permissions.
//!
//! # Invariants
//! - Tickets are created `open` and only ever transition to `closed`.
//! - Closing an already-closed ticket re-stamps `closed_at`; callers that
//!   need exactly-once semantics must guard against double-close.

use crate::access;
use crate::model::estate::{Room, RoomId};
use crate::model::ticket::{Ticket, TicketId, TicketStatus};
use crate::model::user::User;
use crate::repo::estate_repo::EstateRepository;
use crate::repo::ticket_repo::TicketRepository;
use crate::service::{now_epoch_ms, ServiceError, ServiceResult};
use log::info;
use uuid::Uuid;

/// Request model for raising a new ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTicketRequest {
    /// Room the problem was observed in.
    pub room_uuid: RoomId,
    /// Reporter display name.
    pub customer_name: String,
    /// Reporter contact number.
    pub phone_number: String,
    /// Problem category; free-form, non-empty.
    pub problem_type: String,
    /// Free-text description.
    pub note: String,
}

/// Use-case service for the ticket lifecycle.
pub struct TicketService<E: EstateRepository, T: TicketRepository> {
    estate: E,
    tickets: T,
}

impl<E: EstateRepository, T: TicketRepository> TicketService<E, T> {
    /// Creates a service over estate and ticket repositories.
    pub fn new(estate: E, tickets: T) -> Self {
        Self { estate, tickets }
    }

    /// Raises a new open ticket against the requested room.
    ///
    /// # Errors
    /// - `NotFound` when the room does not exist.
    /// - `Unauthorized` when `actor` may not raise tickets for that room.
    /// - `Validation` when a required field is empty.
    pub fn open_ticket(&self, actor: &User, request: &OpenTicketRequest) -> ServiceResult<Ticket> {
        let room = self.require_room(request.room_uuid)?;
        if !access::can_open_ticket(actor, &room) {
            return Err(ServiceError::Unauthorized);
        }

        let ticket = Ticket {
            uuid: Uuid::new_v4(),
            room_uuid: room.uuid,
            customer_name: request.customer_name.clone(),
            phone_number: request.phone_number.clone(),
            problem_type: request.problem_type.clone(),
            note: request.note.clone(),
            status: TicketStatus::Open,
            created_at: now_epoch_ms(),
            closed_at: None,
        };
        self.tickets.insert_ticket(&ticket)?;

        info!(
            "event=ticket_open module=ticket status=ok ticket={} room={}",
            ticket.uuid, room.uuid
        );
        Ok(ticket)
    }

    /// Closes the ticket with the given id.
    ///
    /// # Errors
    /// - `NotFound` when no ticket with that id exists.
    /// - `Unauthorized` when `actor` may not close tickets for the
    ///   ticket's room.
    pub fn close_ticket(&self, actor: &User, ticket_id: TicketId) -> ServiceResult<Ticket> {
        let ticket = self
            .tickets
            .get_ticket(ticket_id)?
            .ok_or(ServiceError::NotFound {
                entity: "ticket",
                id: ticket_id,
            })?;
        let room = self.require_room(ticket.room_uuid)?;
        if !access::can_close_ticket(actor, &room) {
            return Err(ServiceError::Unauthorized);
        }

        let closed = self.tickets.close_ticket(ticket_id, now_epoch_ms())?;
        info!(
            "event=ticket_close module=ticket status=ok ticket={} room={}",
            closed.uuid, room.uuid
        );
        Ok(closed)
    }

    fn require_room(&self, room_uuid: RoomId) -> ServiceResult<Room> {
        self.estate
            .get_room(room_uuid)?
            .ok_or(ServiceError::NotFound {
                entity: "room",
                id: room_uuid,
            })
    }
}
