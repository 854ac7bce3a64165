//! Core domain logic for Caretaker, a building-maintenance ticketing system.
//! This crate is the single source of truth for business invariants.

pub mod access;
pub mod config;
pub mod credential;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;

pub use config::{load_config, BuildingPlan, BuildingsConfig, ConfigError, ConfigWatcher};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::estate::{Building, BuildingId, Room, RoomId};
pub use model::ticket::{Ticket, TicketId, TicketStatus};
pub use model::user::{Role, User, UserId};
pub use reconcile::{reconcile, ReconcileGuard, ReconcileSummary, ReconcileSupervisor};
pub use repo::estate_repo::{
    BuildingOverview, EstateRepository, RoomOverview, SqliteEstateRepository,
};
pub use repo::ticket_repo::{SqliteTicketRepository, TicketRepository};
pub use repo::user_repo::{CustomerRecord, SqliteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use service::estate_service::EstateService;
pub use service::ticket_service::{OpenTicketRequest, TicketService};
pub use service::user_service::{CreateCustomerRequest, UserService, UserSummary};
pub use service::{ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
