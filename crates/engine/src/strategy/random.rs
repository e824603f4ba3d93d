//! Uniform random sampling within the legal range

use super::{check_quantity, ItemIdGenerationStrategy};
use rand::Rng;
use rustc_hash::FxHashSet;
use sctid_core::{ComponentCategory, IdError, Namespace, Result, SnomedIdentifier};
use sctid_reservations::{first_conflict, ReservationSource};
use std::sync::Arc;

/// Default number of draws allowed per requested id before giving up
pub const DEFAULT_MAX_DRAWS_PER_ID: usize = 1_000;

/// Samples item ids uniformly from the legal range
///
/// Keeps no cursor. Each candidate is checked against the reservations on the
/// spot and redrawn on conflict or repeat. `attempt` does not change sampling.
pub struct RandomStrategy {
    source: Arc<dyn ReservationSource>,
    max_draws_per_id: usize,
}

impl RandomStrategy {
    /// Create a strategy reading reservations from `source`
    pub fn new(source: Arc<dyn ReservationSource>) -> Self {
        Self {
            source,
            max_draws_per_id: DEFAULT_MAX_DRAWS_PER_ID,
        }
    }

    /// Limit the number of draws per requested id
    pub fn with_max_draws_per_id(mut self, max_draws_per_id: usize) -> Self {
        self.max_draws_per_id = max_draws_per_id.max(1);
        self
    }
}

impl ItemIdGenerationStrategy for RandomStrategy {
    fn generate_item_ids(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
        quantity: usize,
        attempt: u32,
    ) -> Result<Vec<String>> {
        check_quantity(quantity)?;
        if attempt == 0 {
            return Err(IdError::invalid_argument("attempt must be at least 1"));
        }

        let range = namespace.item_id_range();
        // Dynamic reservations in the snapshot still answer live
        let reservations = self.source.reservations();
        let mut rng = rand::thread_rng();
        let mut produced: FxHashSet<u64> = FxHashSet::default();
        let mut ids = Vec::with_capacity(quantity);
        let max_draws = quantity.saturating_mul(self.max_draws_per_id);
        let mut draws = 0usize;

        while ids.len() < quantity {
            if draws == max_draws {
                tracing::warn!(
                    namespace = %namespace,
                    category = %category,
                    requested = quantity,
                    produced = ids.len(),
                    draws,
                    "Random sampling gave up"
                );
                return Err(IdError::RangeExhausted {
                    namespace: *namespace,
                    category,
                    requested: quantity,
                    produced: ids.len(),
                });
            }
            draws += 1;

            let candidate = rng.gen_range(range.lower_inclusive()..range.upper_exclusive());
            if produced.contains(&candidate) {
                continue;
            }
            let id = SnomedIdentifier::new(candidate, *namespace, category)?;
            if first_conflict(&reservations, &id).is_some() {
                continue;
            }
            produced.insert(candidate);
            ids.push(candidate.to_string());
        }

        tracing::debug!(
            namespace = %namespace,
            category = %category,
            quantity,
            draws,
            "Sampled item ids"
        );
        Ok(ids)
    }

    fn name(&self) -> &'static str {
        "random"
    }
}
