//! Estate repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide persistence APIs for buildings and rooms.
//! - Assemble nested building/room/ticket read models by query-time
//!   joins.
//!
//! # Invariants
//! - Room listing is deterministic: `position ASC` within a building.
//! - Building listing is deterministic: `name ASC`.
//! - Bulk deletes report affected row counts so reconciliation can log
//!   an accurate summary.

use crate::model::estate::{Building, BuildingId, Room, RoomId};
use crate::model::ticket::Ticket;
use crate::repo::ticket_repo::parse_ticket_row;
use crate::repo::{parse_uuid, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::collections::BTreeMap;

const ROOM_SELECT_SQL: &str = "SELECT uuid, building_uuid, position, name FROM rooms";

/// One room with its tickets, ordered newest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomOverview {
    /// Room record.
    pub room: Room,
    /// Tickets raised against this room.
    pub tickets: Vec<Ticket>,
}

/// One building with its rooms in position order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingOverview {
    /// Building record.
    pub building: Building,
    /// Rooms ordered by position.
    pub rooms: Vec<RoomOverview>,
}

/// Repository interface for building/room persistence.
pub trait EstateRepository {
    /// Lists all buildings with nested rooms and tickets.
    fn list_overviews(&self) -> RepoResult<Vec<BuildingOverview>>;
    /// Returns every building together with its current room count.
    fn building_room_counts(&self) -> RepoResult<Vec<(Building, u32)>>;
    /// Persists one building record.
    fn insert_building(&self, building: &Building) -> RepoResult<()>;
    /// Persists one room record.
    fn insert_room(&self, room: &Room) -> RepoResult<()>;
    /// Deletes rooms of `building_uuid` at `position >= first_position`,
    /// returning how many rows were removed. Tickets follow by cascade.
    fn delete_rooms_from(&self, building_uuid: BuildingId, first_position: u32) -> RepoResult<u32>;
    /// Deletes every building whose name is not in `keep_names`, returning
    /// how many buildings were removed. Rooms and tickets cascade.
    fn delete_buildings_except(&self, keep_names: &[&str]) -> RepoResult<u32>;
    /// Gets one room by id.
    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>>;
}

/// SQLite-backed estate repository.
pub struct SqliteEstateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEstateRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EstateRepository for SqliteEstateRepository<'_> {
    fn list_overviews(&self) -> RepoResult<Vec<BuildingOverview>> {
        let mut overviews: Vec<BuildingOverview> = Vec::new();
        let mut room_slots: BTreeMap<RoomId, (usize, usize)> = BTreeMap::new();

        let mut stmt = self
            .conn
            .prepare("SELECT uuid, name FROM buildings ORDER BY name ASC;")?;
        let mut rows = stmt.query([])?;
        let mut building_index: BTreeMap<BuildingId, usize> = BTreeMap::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let building = Building {
                uuid: parse_uuid(&uuid_text, "buildings.uuid")?,
                name: row.get("name")?,
            };
            building_index.insert(building.uuid, overviews.len());
            overviews.push(BuildingOverview {
                building,
                rooms: Vec::new(),
            });
        }

        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_SELECT_SQL} ORDER BY position ASC;"))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let room = parse_room_row(row)?;
            let Some(&slot) = building_index.get(&room.building_uuid) else {
                continue;
            };
            let rooms = &mut overviews[slot].rooms;
            room_slots.insert(room.uuid, (slot, rooms.len()));
            rooms.push(RoomOverview {
                room,
                tickets: Vec::new(),
            });
        }

        let mut stmt = self.conn.prepare(
            "SELECT uuid, room_uuid, customer_name, phone_number, problem_type, note,
                    status, created_at, closed_at
             FROM tickets
             ORDER BY created_at DESC, uuid ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let ticket = parse_ticket_row(row)?;
            if let Some(&(building_slot, room_slot)) = room_slots.get(&ticket.room_uuid) {
                overviews[building_slot].rooms[room_slot].tickets.push(ticket);
            }
        }

        Ok(overviews)
    }

    fn building_room_counts(&self) -> RepoResult<Vec<(Building, u32)>> {
        let mut stmt = self.conn.prepare(
            "SELECT b.uuid, b.name, COUNT(r.uuid) AS room_count
             FROM buildings b
             LEFT JOIN rooms r ON r.building_uuid = b.uuid
             GROUP BY b.uuid, b.name
             ORDER BY b.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut counts = Vec::new();
        while let Some(row) = rows.next()? {
            let uuid_text: String = row.get("uuid")?;
            let building = Building {
                uuid: parse_uuid(&uuid_text, "buildings.uuid")?,
                name: row.get("name")?,
            };
            let room_count: u32 = row.get("room_count")?;
            counts.push((building, room_count));
        }
        Ok(counts)
    }

    fn insert_building(&self, building: &Building) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO buildings (uuid, name) VALUES (?1, ?2);",
            params![building.uuid.to_string(), building.name.as_str()],
        )?;
        Ok(())
    }

    fn insert_room(&self, room: &Room) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO rooms (uuid, building_uuid, position, name)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                room.uuid.to_string(),
                room.building_uuid.to_string(),
                room.position,
                room.name.as_str(),
            ],
        )?;
        Ok(())
    }

    fn delete_rooms_from(&self, building_uuid: BuildingId, first_position: u32) -> RepoResult<u32> {
        let changed = self.conn.execute(
            "DELETE FROM rooms WHERE building_uuid = ?1 AND position >= ?2;",
            params![building_uuid.to_string(), first_position],
        )?;
        Ok(changed as u32)
    }

    fn delete_buildings_except(&self, keep_names: &[&str]) -> RepoResult<u32> {
        if keep_names.is_empty() {
            let changed = self.conn.execute("DELETE FROM buildings;", [])?;
            return Ok(changed as u32);
        }

        let placeholders = vec!["?"; keep_names.len()].join(", ");
        let sql = format!("DELETE FROM buildings WHERE name NOT IN ({placeholders});");
        let bind_values: Vec<Value> = keep_names
            .iter()
            .map(|name| Value::Text((*name).to_string()))
            .collect();
        let changed = self.conn.execute(&sql, params_from_iter(bind_values))?;
        Ok(changed as u32)
    }

    fn get_room(&self, id: RoomId) -> RepoResult<Option<Room>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{ROOM_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_room_row(row)?));
        }
        Ok(None)
    }
}

fn parse_room_row(row: &Row<'_>) -> RepoResult<Room> {
    let uuid_text: String = row.get("uuid")?;
    let building_text: String = row.get("building_uuid")?;
    Ok(Room {
        uuid: parse_uuid(&uuid_text, "rooms.uuid")?,
        building_uuid: parse_uuid(&building_text, "rooms.building_uuid")?,
        position: row.get("position")?,
        name: row.get("name")?,
    })
}
