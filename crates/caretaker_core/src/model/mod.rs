//! Domain model for buildings, rooms, tickets and users.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep validation rules next to the records they protect.
//!
//! # Invariants
//! - Every domain object is identified by a stable uuid.
//! - Parent references are explicit foreign-key fields; no record embeds
//!   a list of child ids.

pub mod estate;
pub mod ticket;
pub mod user;
