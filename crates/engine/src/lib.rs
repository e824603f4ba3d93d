//! Identifier allocation engine
//!
//! This crate orchestrates the lower layers:
//! - ExclusionSet: reservation intervals captured for one namespace and category
//! - ItemIdCounter: ring cursor over the legal range, one per namespace/category
//! - Strategies: sequential (counters), random (sampling), single (fixed value)
//! - IdentifierService: full identifiers, collision retries, administration
//! - Configuration: `sctid.toml` strategy selection and startup reservations

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod counter;
pub mod exclusion;
pub mod service;
pub mod strategy;

pub use config::{IdGenerationConfig, ReservationConfig, StrategyKind, CONFIG_FILE_NAME};
pub use counter::ItemIdCounter;
pub use exclusion::ExclusionSet;
pub use service::IdentifierService;
pub use strategy::{
    step_size, CounterKey, ItemIdGenerationStrategy, RandomStrategy, SequentialStrategy,
    SingleItemIdStrategy, MAX_ATTEMPT,
};
