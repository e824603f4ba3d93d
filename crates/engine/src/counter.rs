//! Item id counter
//!
//! One counter exists per (namespace, category) pair. It walks the legal item
//! id range as a ring, skipping excluded blocks and leaving `step_size` ids
//! between consecutive outputs.
//!
//! ## Allocation
//!
//! ```text
//! initial = current = cursor
//! while ids still needed:
//!     current excluded?  -> current = normalize(block.max + 1)
//!     otherwise          -> emit current, current = normalize(current + step_size + 1)
//!     current == initial with ids still needed -> RangeExhausted
//! cursor = current
//! ```
//!
//! The whole call runs under the counter's own mutex, so callers of the same
//! key are serialized while callers of different keys never contend.
//!
//! Exhaustion is also reported when the walk revisits an id it already
//! produced in this call, or when it keeps landing on excluded ids without
//! ever reaching a free one. Either means no further progress is possible
//! without a duplicate. A failed call leaves the cursor where it was.

use crate::exclusion::ExclusionSet;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use sctid_core::{ComponentCategory, IdError, ItemIdRange, Namespace, Result};

/// Allocation cursor for one namespace and category
#[derive(Debug)]
pub struct ItemIdCounter {
    namespace: Namespace,
    category: ComponentCategory,
    range: ItemIdRange,
    exclusions: ExclusionSet,
    /// Next candidate item id; always inside `range`
    cursor: Mutex<u64>,
}

impl ItemIdCounter {
    /// Create a counter over the namespace's legal range
    ///
    /// The cursor starts at the lower bound.
    pub fn new(namespace: Namespace, category: ComponentCategory, exclusions: ExclusionSet) -> Self {
        Self::with_range(namespace, category, namespace.item_id_range(), exclusions)
    }

    /// Create a counter over an explicit range
    pub fn with_range(
        namespace: Namespace,
        category: ComponentCategory,
        range: ItemIdRange,
        exclusions: ExclusionSet,
    ) -> Self {
        Self {
            namespace,
            category,
            range,
            cursor: Mutex::new(range.lower_inclusive()),
            exclusions,
        }
    }

    /// Namespace this counter allocates for
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Category this counter allocates for
    pub fn category(&self) -> ComponentCategory {
        self.category
    }

    /// Legal range walked by this counter
    pub fn range(&self) -> ItemIdRange {
        self.range
    }

    /// Exclusions captured when the counter was created
    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Current cursor value
    pub fn current(&self) -> u64 {
        *self.cursor.lock()
    }

    /// Force the cursor to `value`
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `value` is outside the legal range.
    pub fn set(&self, value: u64) -> Result<()> {
        if !self.range.contains(value) {
            return Err(IdError::invalid_argument(format!(
                "counter value {} is outside {}",
                value, self.range
            )));
        }
        let mut cursor = self.cursor.lock();
        tracing::info!(
            namespace = %self.namespace,
            category = %self.category,
            from = *cursor,
            to = value,
            "Forcing counter value"
        );
        *cursor = value;
        Ok(())
    }

    /// Produce the next `quantity` item ids, `step_size` ids apart
    ///
    /// Ids are returned in generation order and are pairwise distinct.
    ///
    /// # Errors
    /// - `InvalidArgument` if `quantity` is zero
    /// - `RangeExhausted` if the ring was traversed without producing enough ids
    pub fn next_item_ids(&self, quantity: usize, step_size: u64) -> Result<Vec<String>> {
        if quantity == 0 {
            return Err(IdError::invalid_argument("quantity must be at least 1"));
        }

        let mut cursor = self.cursor.lock();
        let initial = *cursor;
        let mut current = initial;
        let mut ids = Vec::with_capacity(quantity);
        let mut produced: FxHashSet<u64> = FxHashSet::default();
        let mut consecutive_jumps = 0usize;

        while ids.len() < quantity {
            if let Some((_, max)) = self.exclusions.find(current) {
                consecutive_jumps += 1;
                if consecutive_jumps > self.exclusions.len() {
                    // Every landing spot is excluded: the whole ring is covered
                    return Err(self.exhausted(quantity, ids.len()));
                }
                current = self.range.normalize(i128::from(max) + 1);
            } else {
                if !produced.insert(current) {
                    return Err(self.exhausted(quantity, ids.len()));
                }
                consecutive_jumps = 0;
                ids.push(current.to_string());
                current = self
                    .range
                    .normalize(i128::from(current) + i128::from(step_size) + 1);
            }

            if ids.len() < quantity && current == initial {
                return Err(self.exhausted(quantity, ids.len()));
            }
        }

        *cursor = current;
        tracing::debug!(
            namespace = %self.namespace,
            category = %self.category,
            quantity,
            step_size,
            cursor = current,
            "Allocated item ids"
        );
        Ok(ids)
    }

    fn exhausted(&self, requested: usize, produced: usize) -> IdError {
        tracing::warn!(
            namespace = %self.namespace,
            category = %self.category,
            requested,
            produced,
            range = %self.range,
            excluded = self.exclusions.excluded_count(),
            "Item id range exhausted"
        );
        IdError::RangeExhausted {
            namespace: self.namespace,
            category: self.category,
            requested,
            produced,
        }
    }
}
