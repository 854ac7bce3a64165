//! Building and room domain models.
//!
//! # Responsibility
//! - Define the estate records managed by the reconciliation engine.
//! - Derive room display names from their position.
//!
//! # Invariants
//! - Building names are unique among persisted buildings.
//! - A room's `position` is its zero-based index within the building;
//!   `(building_uuid, position)` is unique.
//! - Buildings and rooms are created and deleted by reconciliation only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a building.
pub type BuildingId = Uuid;

/// Stable identifier for a room.
pub type RoomId = Uuid;

/// Top-level property unit containing rooms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    /// Stable global ID used for linking and auditing.
    pub uuid: BuildingId,
    /// Display name, unique within the persisted set.
    pub name: String,
}

impl Building {
    /// Creates a building with a generated stable ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }
}

/// Unit within a building, holding maintenance tickets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Stable global ID.
    pub uuid: RoomId,
    /// Owning building.
    pub building_uuid: BuildingId,
    /// Zero-based index within the building. Reconciliation identifies
    /// rooms by this value when a building is resized.
    pub position: u32,
    /// Display name derived from `position`.
    pub name: String,
}

impl Room {
    /// Creates a room at the given position with its derived name.
    pub fn new(building_uuid: BuildingId, position: u32) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            building_uuid,
            position,
            name: room_name(position),
        }
    }
}

/// Returns the display name for a room position ("Flat 1" for position 0).
pub fn room_name(position: u32) -> String {
    format!("Flat {}", position + 1)
}
