//! Item id generation strategies
//!
//! Every strategy answers the same request: give me `quantity` item ids for
//! this namespace and category, on this attempt.
//!
//! - [`SequentialStrategy`]: per-key counters walking the legal range (production)
//! - [`RandomStrategy`]: uniform sampling, checked against reservations per candidate
//! - [`SingleItemIdStrategy`]: always the same id (deterministic tests)
//!
//! ## Attempts
//!
//! `attempt` counts how often a downstream consumer found a generated id
//! already taken. The sequential strategy widens the gap between ids to
//! `2^min(attempt - 1, MAX_ATTEMPT) - 1`, so repeated collisions get
//! exponentially less likely. The spacing never affects correctness.

mod random;
mod sequential;
mod single;

pub use random::RandomStrategy;
pub use sequential::{CounterKey, SequentialStrategy};
pub use single::SingleItemIdStrategy;

use sctid_core::{ComponentCategory, IdError, Namespace, Result};

/// Attempt number at which the step size stops growing
pub const MAX_ATTEMPT: u32 = 10;

/// Gap left between consecutive ids on the given attempt
///
/// # Errors
/// Returns `InvalidArgument` for attempt 0; attempts are numbered from 1.
pub fn step_size(attempt: u32) -> Result<u64> {
    if attempt == 0 {
        return Err(IdError::invalid_argument("attempt must be at least 1"));
    }
    let exponent = (attempt - 1).min(MAX_ATTEMPT);
    Ok((1u64 << exponent) - 1)
}

pub(crate) fn check_quantity(quantity: usize) -> Result<()> {
    if quantity == 0 {
        return Err(IdError::invalid_argument(
            "number of requested ids must be positive",
        ));
    }
    Ok(())
}

/// Policy producing item ids for a namespace and category
pub trait ItemIdGenerationStrategy: Send + Sync {
    /// Generate `quantity` distinct item ids, in generation order
    ///
    /// # Errors
    /// - `InvalidArgument` if `quantity` is zero or `attempt` is zero
    /// - `RangeExhausted` if the legal range cannot satisfy the request
    /// - `ReservationConfiguration` if an applicable reservation is misconfigured
    fn generate_item_ids(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
        quantity: usize,
        attempt: u32,
    ) -> Result<Vec<String>>;

    /// Force the allocation cursor for a namespace and category
    ///
    /// Only strategies that keep counters support this.
    fn set_counter(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
        value: u64,
    ) -> Result<()> {
        let _ = (namespace, category, value);
        Err(IdError::invalid_argument(format!(
            "{} does not keep counters",
            self.name()
        )))
    }

    /// Short name for logs and error messages
    fn name(&self) -> &'static str;
}
