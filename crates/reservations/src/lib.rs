//! Reservation registry for identifier generation
//!
//! This crate holds the administrative side of generation:
//! - Reservation: single ids, item id ranges, and live store/transaction lookups
//! - ReservationRegistry: named reservations plus the `is_reserved` conflict check
//! - ReservationSource: what counters read when they capture their exclusion set

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;
pub mod reservation;

pub use registry::{first_conflict, ReservationRegistry, ReservationSource};
pub use reservation::{IdentifierLookup, Reservation, ReservationRange};
