//! Core types for terminology component identifiers
//!
//! This crate defines the foundational types used throughout the system:
//! - ComponentCategory: Concept, description or relationship partition
//! - Namespace: International space or a seven digit extension namespace
//! - ItemIdRange: Legal item id interval, with ring normalization
//! - SnomedIdentifier: Decoded identifier (item id, namespace, category, check digit)
//! - codec: Verhoeff check digit, encode and decode
//! - IdError: Error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod error;
pub mod types;

pub use codec::{
    category_of, check_digit, decode, encode, has_valid_check_digit, is_valid, namespace_of,
    SnomedIdentifier, MAX_IDENTIFIER_LENGTH, MIN_IDENTIFIER_LENGTH,
};
pub use error::{IdError, Result};
pub use types::{ComponentCategory, ItemIdRange, Namespace};
