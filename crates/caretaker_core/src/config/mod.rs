//! Buildings configuration: parsing, validation and change watching.
//!
//! # Responsibility
//! - Parse the declarative buildings configuration from JSON.
//! - Reject configurations that cannot be reconciled safely.
//! - Surface configuration changes as parsed values (see [`watcher`]).
//!
//! # Invariants
//! - Building names are non-empty after trimming and unique.
//! - Every configured building has at least one room.
//! - Order of entries is preserved; reconciliation processes them in
//!   input order.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::path::Path;

mod watcher;

pub use watcher::ConfigWatcher;

/// One configured building: display name plus desired room count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingPlan {
    /// Unique display name.
    pub name: String,
    /// Desired number of rooms, at least 1.
    pub room_count: u32,
}

/// Ordered declarative target for the reconciliation engine.
///
/// Serialized as a bare JSON array of plans, matching the operator-facing
/// configuration file format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildingsConfig {
    /// Plans in input order.
    pub buildings: Vec<BuildingPlan>,
}

impl BuildingsConfig {
    /// Checks configuration invariants.
    ///
    /// # Errors
    /// - [`ConfigError::EmptyName`] when a plan's name is blank.
    /// - [`ConfigError::DuplicateName`] when two plans share a name.
    /// - [`ConfigError::ZeroRooms`] when a plan asks for zero rooms.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = std::collections::BTreeSet::new();
        for plan in &self.buildings {
            let name = plan.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyName);
            }
            if plan.room_count == 0 {
                return Err(ConfigError::ZeroRooms(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(ConfigError::DuplicateName(name.to_string()));
            }
        }
        Ok(())
    }
}

/// Configuration loading and validation errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    Io(io::Error),
    /// Configuration file is not valid JSON for the expected shape.
    Parse(serde_json::Error),
    /// A building name is empty after trimming.
    EmptyName,
    /// The same building name appears more than once.
    DuplicateName(String),
    /// A building is configured with zero rooms.
    ZeroRooms(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read configuration: {err}"),
            Self::Parse(err) => write!(f, "failed to parse configuration: {err}"),
            Self::EmptyName => write!(f, "building name must not be empty"),
            Self::DuplicateName(name) => {
                write!(f, "building name `{name}` appears more than once")
            }
            Self::ZeroRooms(name) => {
                write!(f, "building `{name}` must have at least one room")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ConfigError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Parses and validates configuration content.
pub fn parse_config(content: &str) -> Result<BuildingsConfig, ConfigError> {
    let config: BuildingsConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates the configuration file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<BuildingsConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::{parse_config, ConfigError};

    #[test]
    fn parses_operator_format() {
        let config = parse_config(r#"[{"name":"Oak","roomCount":2}]"#).unwrap();
        assert_eq!(config.buildings.len(), 1);
        assert_eq!(config.buildings[0].name, "Oak");
        assert_eq!(config.buildings[0].room_count, 2);
    }

    #[test]
    fn empty_list_is_legal() {
        let config = parse_config("[]").unwrap();
        assert!(config.buildings.is_empty());
    }

    #[test]
    fn rejects_blank_name() {
        let err = parse_config(r#"[{"name":"  ","roomCount":2}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName));
    }

    #[test]
    fn rejects_duplicate_names() {
        let err = parse_config(
            r#"[{"name":"Oak","roomCount":2},{"name":"Oak","roomCount":3}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateName(name) if name == "Oak"));
    }

    #[test]
    fn rejects_zero_rooms() {
        let err = parse_config(r#"[{"name":"Oak","roomCount":0}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::ZeroRooms(name) if name == "Oak"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_config("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
