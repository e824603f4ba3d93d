//! Generation configuration via `sctid.toml`
//!
//! Selects the strategy, bounds the orchestrator's retries, and lists the
//! reservations to register at startup.

use crate::strategy::MAX_ATTEMPT;
use sctid_core::{ComponentCategory, IdError, Namespace, Result};
use sctid_reservations::{Reservation, ReservationRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Bound;
use std::path::Path;

/// Default config file name
pub const CONFIG_FILE_NAME: &str = "sctid.toml";

/// Which item id generation strategy to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Per-key counters walking the legal range
    Sequential,
    /// Uniform random sampling
    Random,
}

/// One reservation entry in `sctid.toml`
///
/// A missing `item_id_min` or `item_id_max` leaves that end unbounded. The
/// entry still registers, but counters for the affected namespace and
/// categories refuse to start.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationConfig {
    /// Namespace, empty for the international space
    #[serde(default)]
    pub namespace: Namespace,
    /// First reserved item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id_min: Option<u64>,
    /// Last reserved item id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id_max: Option<u64>,
    /// Categories covered; empty covers all
    #[serde(default)]
    pub categories: Vec<ComponentCategory>,
}

impl ReservationConfig {
    /// Convert to a registry reservation
    pub fn to_reservation(&self) -> Reservation {
        let lower = self.item_id_min.map_or(Bound::Unbounded, Bound::Included);
        let upper = self.item_id_max.map_or(Bound::Unbounded, Bound::Included);
        Reservation::bounds(lower, upper, self.namespace, self.categories.iter().copied())
    }
}

/// Generation configuration loaded from `sctid.toml`
///
/// # Example
///
/// ```toml
/// strategy = "sequential"
/// max_generation_attempts = 10
///
/// [reservations.test-block]
/// namespace = ""
/// item_id_min = 100
/// item_id_max = 999
/// categories = ["concept"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdGenerationConfig {
    /// Strategy: `"sequential"` or `"random"`
    #[serde(default = "default_strategy_str")]
    pub strategy: String,
    /// How often the orchestrator retries ids that turned out to be reserved
    #[serde(default = "default_max_generation_attempts")]
    pub max_generation_attempts: u32,
    /// Reservations registered at startup, by name
    #[serde(default)]
    pub reservations: BTreeMap<String, ReservationConfig>,
}

fn default_strategy_str() -> String {
    "sequential".to_string()
}

fn default_max_generation_attempts() -> u32 {
    MAX_ATTEMPT
}

impl Default for IdGenerationConfig {
    fn default() -> Self {
        Self {
            strategy: default_strategy_str(),
            max_generation_attempts: default_max_generation_attempts(),
            reservations: BTreeMap::new(),
        }
    }
}

impl IdGenerationConfig {
    /// Parse the strategy string
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"sequential"` or `"random"`.
    pub fn strategy_kind(&self) -> Result<StrategyKind> {
        match self.strategy.as_str() {
            "sequential" => Ok(StrategyKind::Sequential),
            "random" => Ok(StrategyKind::Random),
            other => Err(IdError::Config(format!(
                "Invalid strategy '{}'. Expected \"sequential\" or \"random\".",
                other
            ))),
        }
    }

    /// Check every field that has constraints beyond its type
    pub fn validate(&self) -> Result<()> {
        self.strategy_kind()?;
        if self.max_generation_attempts == 0 {
            return Err(IdError::Config(
                "max_generation_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Identifier generation configuration
#
# Strategy: "sequential" (default) or "random"
#   "sequential" = per namespace/category counters, reserved blocks skipped
#   "random"     = uniform sampling, each candidate checked against reservations
strategy = "sequential"

# How many times generated ids that collide with a reservation are retried,
# each retry spacing the ids further apart (default: 10)
max_generation_attempts = 10

# Reserved item id ranges. An empty namespace is the international space;
# an empty category list covers every category.
# [reservations.example]
# namespace = "1000154"
# item_id_min = 1
# item_id_max = 999
# categories = ["concept", "description", "relationship"]
"#
    }

    /// Parse config from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text does not parse or fails validation.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: IdGenerationConfig = toml::from_str(content)
            .map_err(|e| IdError::Config(format!("{} is not valid: {}", CONFIG_FILE_NAME, e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `sctid.toml` (or any file in its format) from `path`
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed. The message
    /// carries the path.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| io_error("cannot read", path, e))?;
        Self::from_toml_str(&content).map_err(|e| match e {
            IdError::Config(msg) => IdError::Config(format!("{} (at {})", msg, path.display())),
            other => other,
        })
    }

    /// Create `path` with the commented defaults unless it already exists
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if path.exists() {
            return Ok(());
        }
        std::fs::write(path, Self::default_toml())
            .map_err(|e| io_error("cannot create default", path, e))
    }

    /// Overwrite `path` with this config
    ///
    /// Comments in an existing file are not preserved.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            IdError::Config(format!("cannot render {}: {}", CONFIG_FILE_NAME, e))
        })?;
        std::fs::write(path, content).map_err(|e| io_error("cannot write", path, e))
    }

    /// Create a registry holding every configured reservation
    pub fn build_registry(&self) -> Result<ReservationRegistry> {
        let registry = ReservationRegistry::new();
        for (name, reservation) in &self.reservations {
            registry.create(name.clone(), reservation.to_reservation())?;
        }
        Ok(registry)
    }
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> IdError {
    IdError::Config(format!(
        "{} {} at '{}': {}",
        action,
        CONFIG_FILE_NAME,
        path.display(),
        e
    ))
}
