//! sctid - identifier allocation for terminology components
//!
//! Generates, validates and reserves SNOMED CT style identifiers: an item id,
//! an optional seven digit namespace, a partition digit pair and a Verhoeff
//! check digit.
//!
//! # Quick Start
//!
//! ```
//! use sctid::{ComponentCategory, IdentifierService, Namespace, Reservation};
//!
//! let service = IdentifierService::sequential();
//!
//! // Keep 100..=999 free for hand-assigned concepts
//! service
//!     .create_reservation(
//!         "manual",
//!         Reservation::range(100, 999, Namespace::International, [ComponentCategory::Concept]),
//!     )
//!     .unwrap();
//!
//! let ids = service.generate("", ComponentCategory::Concept, 2).unwrap();
//! assert_eq!(service.validate(&ids[0]).unwrap().item_id(), 1000);
//! ```
//!
//! # Architecture
//!
//! - `sctid-core`: identifier model, Verhoeff codec, errors
//! - `sctid-reservations`: reservation kinds and the named registry
//! - `sctid-engine`: counters, strategies, configuration and the service

pub use sctid_core::*;
pub use sctid_engine::*;
pub use sctid_reservations::*;
