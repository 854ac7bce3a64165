//! Reconciliation of persisted buildings/rooms against configuration.
//!
//! # Responsibility
//! - Compute the difference between persisted estate state and the
//!   declarative target.
//! - Apply the difference in one SQLite transaction.
//!
//! # Invariants
//! - Reconciliation is idempotent: an unchanged configuration produces
//!   no writes.
//! - Rooms at positions `0..min(old, new)` are retained on resize, so
//!   their tickets survive; surplus positions are deleted with their
//!   tickets.
//! - A failed run aborts the transaction; previously persisted state
//!   keeps serving.

use crate::config::{BuildingPlan, BuildingsConfig};
use crate::model::estate::{Building, Room};
use crate::repo::estate_repo::{EstateRepository, SqliteEstateRepository};
use crate::repo::RepoResult;
use log::{error, info};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::time::Instant;

mod guard;

pub use guard::{ReconcileGuard, ReconcileSupervisor};

/// Write counts of one reconciliation run, for operator logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Buildings created.
    pub buildings_created: u32,
    /// Buildings removed (with their rooms and tickets).
    pub buildings_removed: u32,
    /// Rooms created.
    pub rooms_created: u32,
    /// Rooms removed (with their tickets).
    pub rooms_removed: u32,
}

impl ReconcileSummary {
    /// Returns whether the run performed no writes.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// One resize decision: a persisted building whose room count differs
/// from the target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResizeStep {
    name: String,
    current_rooms: u32,
    target_rooms: u32,
}

/// Pure difference between persisted state and target configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ReconcilePlan {
    create: Vec<BuildingPlan>,
    resize: Vec<ResizeStep>,
    remove: Vec<String>,
}

impl ReconcilePlan {
    fn is_empty(&self) -> bool {
        self.create.is_empty() && self.resize.is_empty() && self.remove.is_empty()
    }
}

/// Computes the difference between persisted room counts and the target.
///
/// `current` entries are `(building name, room count)`; target order is
/// preserved for creates and resizes.
fn plan(current: &[(String, u32)], target: &BuildingsConfig) -> ReconcilePlan {
    let current_by_name: BTreeMap<&str, u32> = current
        .iter()
        .map(|(name, count)| (name.as_str(), *count))
        .collect();

    let mut result = ReconcilePlan::default();
    for building in &target.buildings {
        match current_by_name.get(building.name.as_str()) {
            None => result.create.push(building.clone()),
            Some(&count) if count != building.room_count => result.resize.push(ResizeStep {
                name: building.name.clone(),
                current_rooms: count,
                target_rooms: building.room_count,
            }),
            Some(_) => {}
        }
    }

    for (name, _) in current {
        if !target
            .buildings
            .iter()
            .any(|building| building.name == *name)
        {
            result.remove.push(name.clone());
        }
    }

    result
}

/// Reconciles persisted buildings/rooms against `config` in one
/// transaction.
///
/// # Side effects
/// - Emits `reconcile` logging events with duration, status and write
///   counts.
///
/// # Errors
/// Returns the first repository error; the transaction is rolled back and
/// no partial writes remain.
pub fn reconcile(conn: &mut Connection, config: &BuildingsConfig) -> RepoResult<ReconcileSummary> {
    let started_at = Instant::now();
    info!(
        "event=reconcile module=reconcile status=start buildings={}",
        config.buildings.len()
    );

    let result = reconcile_in_tx(conn, config);
    match &result {
        Ok(summary) => {
            info!(
                "event=reconcile module=reconcile status=ok duration_ms={} buildings_created={} buildings_removed={} rooms_created={} rooms_removed={}",
                started_at.elapsed().as_millis(),
                summary.buildings_created,
                summary.buildings_removed,
                summary.rooms_created,
                summary.rooms_removed
            );
        }
        Err(err) => {
            error!(
                "event=reconcile module=reconcile status=error duration_ms={} error={err}",
                started_at.elapsed().as_millis()
            );
        }
    }
    result
}

fn reconcile_in_tx(
    conn: &mut Connection,
    config: &BuildingsConfig,
) -> RepoResult<ReconcileSummary> {
    let tx = conn.transaction()?;
    let summary = {
        let repo = SqliteEstateRepository::new(&tx);
        apply(&repo, config)?
    };
    tx.commit()?;
    Ok(summary)
}

/// Applies the configured target through the estate repository.
fn apply<R: EstateRepository>(repo: &R, config: &BuildingsConfig) -> RepoResult<ReconcileSummary> {
    let counts = repo.building_room_counts()?;
    let by_name: BTreeMap<&str, &Building> = counts
        .iter()
        .map(|(building, _)| (building.name.as_str(), building))
        .collect();
    let current: Vec<(String, u32)> = counts
        .iter()
        .map(|(building, count)| (building.name.clone(), *count))
        .collect();

    let plan = plan(&current, config);
    let mut summary = ReconcileSummary::default();
    if plan.is_empty() {
        return Ok(summary);
    }

    for target in &plan.create {
        let building = Building::new(target.name.as_str());
        repo.insert_building(&building)?;
        summary.buildings_created += 1;
        for position in 0..target.room_count {
            repo.insert_room(&Room::new(building.uuid, position))?;
            summary.rooms_created += 1;
        }
    }

    for step in &plan.resize {
        let Some(building) = by_name.get(step.name.as_str()) else {
            // Planned from the same snapshot; the building must exist.
            continue;
        };
        if step.target_rooms > step.current_rooms {
            for position in step.current_rooms..step.target_rooms {
                repo.insert_room(&Room::new(building.uuid, position))?;
                summary.rooms_created += 1;
            }
        } else {
            summary.rooms_removed += repo.delete_rooms_from(building.uuid, step.target_rooms)?;
        }
    }

    if !plan.remove.is_empty() {
        let keep: Vec<&str> = config
            .buildings
            .iter()
            .map(|building| building.name.as_str())
            .collect();
        summary.buildings_removed += repo.delete_buildings_except(&keep)?;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::plan;
    use crate::config::{BuildingPlan, BuildingsConfig};

    fn target(entries: &[(&str, u32)]) -> BuildingsConfig {
        BuildingsConfig {
            buildings: entries
                .iter()
                .map(|(name, room_count)| BuildingPlan {
                    name: (*name).to_string(),
                    room_count: *room_count,
                })
                .collect(),
        }
    }

    fn current(entries: &[(&str, u32)]) -> Vec<(String, u32)> {
        entries
            .iter()
            .map(|(name, count)| ((*name).to_string(), *count))
            .collect()
    }

    #[test]
    fn matching_state_plans_nothing() {
        let result = plan(&current(&[("Oak", 2)]), &target(&[("Oak", 2)]));
        assert!(result.is_empty());
    }

    #[test]
    fn missing_building_is_created() {
        let result = plan(&current(&[]), &target(&[("Oak", 2)]));
        assert_eq!(result.create.len(), 1);
        assert_eq!(result.create[0].name, "Oak");
        assert!(result.resize.is_empty());
        assert!(result.remove.is_empty());
    }

    #[test]
    fn count_mismatch_is_resized() {
        let result = plan(&current(&[("Oak", 2)]), &target(&[("Oak", 5)]));
        assert!(result.create.is_empty());
        assert_eq!(result.resize.len(), 1);
        assert_eq!(result.resize[0].current_rooms, 2);
        assert_eq!(result.resize[0].target_rooms, 5);
    }

    #[test]
    fn unconfigured_building_is_removed() {
        let result = plan(&current(&[("Oak", 2), ("Elm", 1)]), &target(&[("Oak", 2)]));
        assert!(result.create.is_empty());
        assert!(result.resize.is_empty());
        assert_eq!(result.remove, vec!["Elm".to_string()]);
    }

    #[test]
    fn empty_target_removes_everything() {
        let result = plan(&current(&[("Oak", 2), ("Elm", 1)]), &target(&[]));
        assert_eq!(result.remove.len(), 2);
    }
}
