//! Ticket repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for maintenance tickets.
//! - Keep the close operation a single UPDATE so the `open -> closed`
//!   transition cannot be reversed through this layer.
//!
//! # Invariants
//! - Write paths call `Ticket::validate()` before SQL mutations.
//! - `close_ticket` never rewrites status back to `open`; re-closing only
//!   re-stamps `closed_at`.

use crate::model::ticket::{Ticket, TicketId, TicketStatus};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const TICKET_SELECT_SQL: &str = "SELECT
    uuid,
    room_uuid,
    customer_name,
    phone_number,
    problem_type,
    note,
    status,
    created_at,
    closed_at
FROM tickets";

/// Repository interface for ticket persistence.
pub trait TicketRepository {
    /// Persists one ticket record.
    fn insert_ticket(&self, ticket: &Ticket) -> RepoResult<()>;
    /// Gets one ticket by id.
    fn get_ticket(&self, id: TicketId) -> RepoResult<Option<Ticket>>;
    /// Marks a ticket closed and stamps `closed_at`, returning the updated
    /// record. Closing an already-closed ticket re-stamps the timestamp.
    fn close_ticket(&self, id: TicketId, closed_at: i64) -> RepoResult<Ticket>;
}

/// SQLite-backed ticket repository.
pub struct SqliteTicketRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTicketRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TicketRepository for SqliteTicketRepository<'_> {
    fn insert_ticket(&self, ticket: &Ticket) -> RepoResult<()> {
        ticket.validate()?;

        self.conn.execute(
            "INSERT INTO tickets (
                uuid,
                room_uuid,
                customer_name,
                phone_number,
                problem_type,
                note,
                status,
                created_at,
                closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                ticket.uuid.to_string(),
                ticket.room_uuid.to_string(),
                ticket.customer_name.as_str(),
                ticket.phone_number.as_str(),
                ticket.problem_type.as_str(),
                ticket.note.as_str(),
                ticket_status_to_db(ticket.status),
                ticket.created_at,
                ticket.closed_at,
            ],
        )?;

        Ok(())
    }

    fn get_ticket(&self, id: TicketId) -> RepoResult<Option<Ticket>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TICKET_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_ticket_row(row)?));
        }
        Ok(None)
    }

    fn close_ticket(&self, id: TicketId, closed_at: i64) -> RepoResult<Ticket> {
        let changed = self.conn.execute(
            "UPDATE tickets SET status = 'closed', closed_at = ?2 WHERE uuid = ?1;",
            params![id.to_string(), closed_at],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "ticket",
                id,
            });
        }

        match self.get_ticket(id)? {
            Some(ticket) => Ok(ticket),
            None => Err(RepoError::NotFound {
                entity: "ticket",
                id,
            }),
        }
    }
}

pub(crate) fn parse_ticket_row(row: &Row<'_>) -> RepoResult<Ticket> {
    let uuid_text: String = row.get("uuid")?;
    let room_text: String = row.get("room_uuid")?;
    let status_text: String = row.get("status")?;
    let status = parse_ticket_status(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid ticket status `{status_text}` in tickets.status"
        ))
    })?;

    let ticket = Ticket {
        uuid: parse_uuid(&uuid_text, "tickets.uuid")?,
        room_uuid: parse_uuid(&room_text, "tickets.room_uuid")?,
        customer_name: row.get("customer_name")?,
        phone_number: row.get("phone_number")?,
        problem_type: row.get("problem_type")?,
        note: row.get("note")?,
        status,
        created_at: row.get("created_at")?,
        closed_at: row.get("closed_at")?,
    };
    ticket.validate()?;
    Ok(ticket)
}

fn ticket_status_to_db(status: TicketStatus) -> &'static str {
    match status {
        TicketStatus::Open => "open",
        TicketStatus::Closed => "closed",
    }
}

fn parse_ticket_status(value: &str) -> Option<TicketStatus> {
    match value {
        "open" => Some(TicketStatus::Open),
        "closed" => Some(TicketStatus::Closed),
        _ => None,
    }
}
