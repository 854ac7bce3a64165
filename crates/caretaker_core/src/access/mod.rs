//! Access control gate.
//!
//! # Responsibility
//! - Filter estate views by the requesting user's role and assignment.
//! - Decide which ticket/user actions a user may perform.
//!
//! # Invariants
//! - Pure functions of user plus in-memory state; no storage access.
//! - Customers see all rooms of their assigned building, but may act on
//!   tickets only for their assigned room.
//! - An unassigned customer sees nothing and may act on nothing.

use crate::model::estate::Room;
use crate::model::user::{Role, User};
use crate::repo::estate_repo::BuildingOverview;

/// Filters the full estate down to what `user` may see.
///
/// Admins see everything. Customers see only their assigned building,
/// including all of its rooms and tickets.
pub fn scoped_view(user: &User, estate: &[BuildingOverview]) -> Vec<BuildingOverview> {
    match user.role {
        Role::Admin => estate.to_vec(),
        Role::Customer => {
            let Some(building_uuid) = user.building_uuid else {
                return Vec::new();
            };
            estate
                .iter()
                .filter(|overview| overview.building.uuid == building_uuid)
                .cloned()
                .collect()
        }
    }
}

/// Returns whether `user` may create or delete accounts and list
/// customers.
pub fn can_manage_users(user: &User) -> bool {
    user.role == Role::Admin
}

/// Returns whether `user` may raise a ticket against `room`.
pub fn can_open_ticket(user: &User, room: &Room) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Customer => user.room_uuid == Some(room.uuid),
    }
}

/// Returns whether `user` may close tickets raised against `room`.
pub fn can_close_ticket(user: &User, room: &Room) -> bool {
    match user.role {
        Role::Admin => true,
        Role::Customer => user.room_uuid == Some(room.uuid),
    }
}
