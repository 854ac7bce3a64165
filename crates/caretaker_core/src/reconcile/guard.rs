//! Single-slot run guard for reconciliation.
//!
//! # Responsibility
//! - Guarantee at most one reconciliation run is active at any time.
//! - Drop, not queue, signals that arrive while a run is in flight.
//!
//! # Invariants
//! - `try_acquire` succeeds for exactly one holder until `release`.
//! - A skipped signal is recovered by the watcher's next poll or the next
//!   startup run, never by an internal queue.

use crate::config::BuildingsConfig;
use crate::reconcile::{reconcile, ReconcileSummary};
use crate::repo::RepoResult;
use log::info;
use rusqlite::Connection;
use std::sync::atomic::{AtomicBool, Ordering};

/// Compare-and-swap guard with a single slot.
#[derive(Debug, Default)]
pub struct ReconcileGuard {
    busy: AtomicBool,
}

impl ReconcileGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot. Returns `false` when a run is already in flight.
    pub fn try_acquire(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
    }

    /// Frees the slot for the next run.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    /// Claims the slot as an RAII hold that releases on drop, including
    /// during unwinding.
    fn hold(&self) -> Option<SlotHold<'_>> {
        if self.try_acquire() {
            Some(SlotHold { guard: self })
        } else {
            None
        }
    }
}

/// Held slot; dropping it releases the guard.
struct SlotHold<'a> {
    guard: &'a ReconcileGuard,
}

impl Drop for SlotHold<'_> {
    fn drop(&mut self) {
        self.guard.release();
    }
}

/// Serializes reconciliation runs from startup and watcher triggers.
#[derive(Debug, Default)]
pub struct ReconcileSupervisor {
    guard: ReconcileGuard,
}

impl ReconcileSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one reconciliation if no run is in flight.
    ///
    /// Returns `Ok(None)` when the signal was dropped because another run
    /// holds the slot; the caller relies on the next observed change or
    /// startup to catch up.
    pub fn run(
        &self,
        conn: &mut Connection,
        config: &BuildingsConfig,
    ) -> RepoResult<Option<ReconcileSummary>> {
        let Some(_hold) = self.guard.hold() else {
            info!("event=reconcile module=reconcile status=skipped reason=run_in_flight");
            return Ok(None);
        };

        reconcile(conn, config).map(Some)
    }
}
