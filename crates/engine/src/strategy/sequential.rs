//! Counter-backed sequential generation

use super::{check_quantity, step_size, ItemIdGenerationStrategy};
use crate::counter::ItemIdCounter;
use crate::exclusion::ExclusionSet;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use sctid_core::{ComponentCategory, IdError, Namespace, Result};
use sctid_reservations::ReservationSource;
use std::sync::Arc;

/// Cache key for counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterKey {
    /// Parsed namespace, so "154" and "0000154" share a counter
    pub namespace: Namespace,
    /// Component category
    pub category: ComponentCategory,
}

/// Sequential allocation with one lazily created counter per key
///
/// Counters are built on first use from a snapshot of the reservation source
/// and cached for the lifetime of the strategy. Reservations added later do
/// not reach existing counters; callers catch such collisions downstream and
/// retry with a higher attempt.
pub struct SequentialStrategy {
    source: Arc<dyn ReservationSource>,
    counters: DashMap<CounterKey, Arc<OnceCell<Arc<ItemIdCounter>>>>,
}

impl SequentialStrategy {
    /// Create a strategy reading reservations from `source`
    pub fn new(source: Arc<dyn ReservationSource>) -> Self {
        Self {
            source,
            counters: DashMap::new(),
        }
    }

    /// Get or create the counter for `namespace` and `category`
    ///
    /// # Thread Safety
    ///
    /// The map only hands out a per-key cell; the shard lock is released
    /// before the cell is initialized. Racing first callers of one key block
    /// on that cell and all receive the same instance, while first callers of
    /// other keys in the same shard are not held up by the exclusion capture.
    ///
    /// # Errors
    /// Returns `ReservationConfiguration` if an applicable reservation cannot
    /// be turned into a closed interval. The cell stays empty in that case and
    /// the next request tries again.
    pub fn counter(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
    ) -> Result<Arc<ItemIdCounter>> {
        let key = CounterKey {
            namespace: *namespace,
            category,
        };
        let existing = self.counters.get(&key).map(|entry| Arc::clone(entry.value()));
        let cell = match existing {
            Some(cell) => cell,
            None => Arc::clone(self.counters.entry(key).or_default().value()),
        };

        let counter = cell.get_or_try_init(|| {
            let range = namespace.item_id_range();
            let exclusions =
                ExclusionSet::capture(self.source.as_ref(), namespace, category, &range)?;
            tracing::debug!(
                namespace = %namespace,
                category = %category,
                range = %range,
                exclusion_intervals = exclusions.len(),
                "Creating item id counter"
            );
            Ok::<_, IdError>(Arc::new(ItemIdCounter::new(*namespace, category, exclusions)))
        })?;
        Ok(Arc::clone(counter))
    }

    /// Number of counters created so far
    pub fn counter_count(&self) -> usize {
        self.counters
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }
}

impl ItemIdGenerationStrategy for SequentialStrategy {
    fn generate_item_ids(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
        quantity: usize,
        attempt: u32,
    ) -> Result<Vec<String>> {
        check_quantity(quantity)?;
        let step = step_size(attempt)?;
        // No map guard is held here; only the counter's own lock is taken below
        let counter = self.counter(namespace, category)?;
        counter.next_item_ids(quantity, step)
    }

    fn set_counter(
        &self,
        namespace: &Namespace,
        category: ComponentCategory,
        value: u64,
    ) -> Result<()> {
        self.counter(namespace, category)?.set(value)
    }

    fn name(&self) -> &'static str {
        "sequential"
    }
}
