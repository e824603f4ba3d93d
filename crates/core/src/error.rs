//! Error types for identifier generation
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! None of these errors are retried or swallowed inside the engine. Recovery
//! (retrying at a higher attempt, switching strategy, resyncing a counter) is
//! the caller's business.

use crate::types::{ComponentCategory, Namespace};
use thiserror::Error;

/// Result type alias for identifier operations
pub type Result<T> = std::result::Result<T, IdError>;

/// Error types for identifier generation, reservation and validation
#[derive(Debug, Error)]
pub enum IdError {
    /// Caller supplied an unusable argument (quantity of zero, malformed
    /// namespace, counter value outside the legal range, ...)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A counter travelled the whole legal range without producing enough ids
    #[error(
        "Item id range exhausted for namespace '{namespace}', category {category}: \
         produced {produced} of {requested} requested ids"
    )]
    RangeExhausted {
        /// Namespace of the exhausted counter
        namespace: Namespace,
        /// Component category of the exhausted counter
        category: ComponentCategory,
        /// Number of ids requested
        requested: usize,
        /// Number of ids produced before the cursor came full circle
        produced: usize,
    },

    /// A reservation cannot be turned into a closed, bounded exclusion interval
    #[error("Reservation '{name}' is misconfigured: {reason}")]
    ReservationConfiguration {
        /// Registered name of the offending reservation
        name: String,
        /// What is wrong with it
        reason: String,
    },

    /// Identifier string failed to decode
    #[error("Malformed identifier '{id}': {reason}")]
    MalformedIdentifier {
        /// The rejected input
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {0}")]
    Config(String),

    /// The orchestrator ran out of attempts while generated ids kept colliding
    #[error("Gave up after {attempts} generation attempts, {missing} ids still missing")]
    GenerationAttemptsExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Number of ids that could not be generated
        missing: usize,
    },
}

impl IdError {
    /// Create an `InvalidArgument` error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        IdError::InvalidArgument(message.into())
    }

    /// Create a `MalformedIdentifier` error
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        IdError::MalformedIdentifier {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create a `ReservationConfiguration` error
    pub fn reservation_configuration(name: impl Into<String>, reason: impl Into<String>) -> Self {
        IdError::ReservationConfiguration {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Whether a caller may reasonably retry the failed operation
    ///
    /// Only range exhaustion qualifies, and only when the caller knows the
    /// exhaustion came from transient contention elsewhere. The engine itself
    /// cannot tell that apart from a genuinely full range.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IdError::RangeExhausted { .. })
    }
}
