//! Exclusion sets
//!
//! An exclusion set is the union of every reservation interval that applies
//! to one namespace and category, captured once when a counter is created.
//! Intervals are clipped to the legal range, sorted, and merged when they
//! overlap or touch, so a lookup is a binary search and jumping past the
//! returned interval always lands on an id that interval does not cover.

use sctid_core::{ComponentCategory, IdError, ItemIdRange, Namespace, Result};
use sctid_reservations::ReservationSource;

/// Sorted, disjoint, closed item id intervals that must not be handed out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    intervals: Vec<(u64, u64)>,
}

impl ExclusionSet {
    /// Empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the reservations of `source` that apply to `namespace` and `category`
    ///
    /// Dynamic reservations have no interval and are skipped.
    ///
    /// # Errors
    /// Returns `ReservationConfiguration` for the first applicable range
    /// reservation whose interval is open, unbounded, or inverted.
    pub fn capture(
        source: &dyn ReservationSource,
        namespace: &Namespace,
        category: ComponentCategory,
        range: &ItemIdRange,
    ) -> Result<Self> {
        let mut intervals = Vec::new();
        for (name, reservation) in source.reservations() {
            let Some(reserved) = reservation.as_range() else {
                continue;
            };
            if !reserved.applies_to(namespace, category) {
                continue;
            }
            let bounds = reserved.closed_bounds().map_err(|reason| {
                tracing::warn!(
                    reservation = %name,
                    namespace = %namespace,
                    category = %category,
                    reason = %reason,
                    "Rejecting reservation while building exclusion set"
                );
                IdError::reservation_configuration(name.clone(), reason)
            })?;
            intervals.push(bounds);
        }
        Ok(Self::from_intervals(range, intervals))
    }

    /// Build from closed `(min, max)` intervals, clipping them to `range`
    ///
    /// Inverted intervals and intervals entirely outside `range` are dropped.
    pub fn from_intervals(
        range: &ItemIdRange,
        intervals: impl IntoIterator<Item = (u64, u64)>,
    ) -> Self {
        let last = range.upper_exclusive() - 1;
        let mut clipped: Vec<(u64, u64)> = intervals
            .into_iter()
            .filter_map(|(min, max)| {
                let min = min.max(range.lower_inclusive());
                let max = max.min(last);
                (min <= max).then_some((min, max))
            })
            .collect();
        clipped.sort_unstable();

        let mut merged: Vec<(u64, u64)> = Vec::with_capacity(clipped.len());
        for (min, max) in clipped {
            match merged.last_mut() {
                Some((_, prev_max)) if min <= prev_max.saturating_add(1) => {
                    *prev_max = (*prev_max).max(max);
                }
                _ => merged.push((min, max)),
            }
        }
        Self { intervals: merged }
    }

    /// The interval containing `item_id`, if any
    pub fn find(&self, item_id: u64) -> Option<(u64, u64)> {
        let idx = self.intervals.partition_point(|&(_, max)| max < item_id);
        self.intervals
            .get(idx)
            .copied()
            .filter(|&(min, _)| min <= item_id)
    }

    /// Whether `item_id` is excluded
    pub fn contains(&self, item_id: u64) -> bool {
        self.find(item_id).is_some()
    }

    /// Merged intervals in ascending order
    pub fn intervals(&self) -> &[(u64, u64)] {
        &self.intervals
    }

    /// Number of merged intervals
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether nothing is excluded
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Total number of excluded item ids
    pub fn excluded_count(&self) -> u64 {
        self.intervals.iter().map(|&(min, max)| max - min + 1).sum()
    }
}
