//! Reservation shapes
//!
//! A reservation sets item ids aside so they are never handed out. Two shapes
//! cover a fixed interval of item ids inside one namespace:
//! - single: exactly one identifier
//! - range: `[min, max]`, optionally restricted to some component categories
//!
//! Two dynamic shapes consult live state through an [`IdentifierLookup`]
//! instead of a fixed interval: identifiers already used by the store, and
//! identifiers used by the transaction in flight. They apply everywhere but
//! never contribute intervals to a counter's exclusion set.

use sctid_core::{ComponentCategory, Namespace, SnomedIdentifier};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

/// Live conflict check backed by something outside the registry
pub trait IdentifierLookup: Send + Sync {
    /// Whether `id` is already taken
    fn contains(&self, id: &SnomedIdentifier) -> bool;
}

impl<F> IdentifierLookup for F
where
    F: Fn(&SnomedIdentifier) -> bool + Send + Sync,
{
    fn contains(&self, id: &SnomedIdentifier) -> bool {
        self(id)
    }
}

/// Interval of item ids within one namespace
///
/// Bounds are kept as given so that an open or unbounded interval can be
/// registered and reported later, when something needs it closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRange {
    lower: Bound<u64>,
    upper: Bound<u64>,
    namespace: Namespace,
    /// Empty means every category
    categories: BTreeSet<ComponentCategory>,
}

impl ReservationRange {
    /// Lower bound of the item id interval
    pub fn lower(&self) -> Bound<u64> {
        self.lower
    }

    /// Upper bound of the item id interval
    pub fn upper(&self) -> Bound<u64> {
        self.upper
    }

    /// Namespace the interval applies to
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Categories the interval applies to; empty means all
    pub fn categories(&self) -> &BTreeSet<ComponentCategory> {
        &self.categories
    }

    /// Whether this interval covers ids of `namespace` and `category`
    pub fn applies_to(&self, namespace: &Namespace, category: ComponentCategory) -> bool {
        self.namespace == *namespace
            && (self.categories.is_empty() || self.categories.contains(&category))
    }

    /// Whether `item_id` lies within the interval
    pub fn contains_item_id(&self, item_id: u64) -> bool {
        let above = match self.lower {
            Bound::Included(min) => item_id >= min,
            Bound::Excluded(min) => item_id > min,
            Bound::Unbounded => true,
        };
        let below = match self.upper {
            Bound::Included(max) => item_id <= max,
            Bound::Excluded(max) => item_id < max,
            Bound::Unbounded => true,
        };
        above && below
    }

    /// The interval as closed `(min, max)` item ids
    ///
    /// # Errors
    /// Returns a description of the problem if either end is open or
    /// unbounded, or if `min > max`.
    pub fn closed_bounds(&self) -> std::result::Result<(u64, u64), String> {
        let min = match self.lower {
            Bound::Included(min) => min,
            Bound::Excluded(min) => return Err(format!("lower bound {} is open", min)),
            Bound::Unbounded => return Err("lower bound is unbounded".to_string()),
        };
        let max = match self.upper {
            Bound::Included(max) => max,
            Bound::Excluded(max) => return Err(format!("upper bound {} is open", max)),
            Bound::Unbounded => return Err("upper bound is unbounded".to_string()),
        };
        if min > max {
            return Err(format!("lower bound {} exceeds upper bound {}", min, max));
        }
        Ok((min, max))
    }
}

/// Something that marks identifiers as unavailable for generation
#[derive(Clone)]
pub enum Reservation {
    /// A fixed interval of item ids (single ids are intervals with `min == max`)
    Range(ReservationRange),
    /// Identifiers already present in the persisted store
    UniqueInStore(Arc<dyn IdentifierLookup>),
    /// Identifiers already used by the transaction in flight
    UniqueInTransaction(Arc<dyn IdentifierLookup>),
}

impl Reservation {
    /// Reserve exactly one identifier
    pub fn single(id: SnomedIdentifier) -> Self {
        Reservation::Range(ReservationRange {
            lower: Bound::Included(id.item_id()),
            upper: Bound::Included(id.item_id()),
            namespace: id.namespace(),
            categories: BTreeSet::from([id.category()]),
        })
    }

    /// Reserve the closed interval `[min, max]` of item ids
    ///
    /// An empty `categories` iterator reserves the interval for every category.
    pub fn range(
        min: u64,
        max: u64,
        namespace: Namespace,
        categories: impl IntoIterator<Item = ComponentCategory>,
    ) -> Self {
        Self::bounds(Bound::Included(min), Bound::Included(max), namespace, categories)
    }

    /// Reserve an arbitrary interval of item ids
    ///
    /// Open or unbounded ends are accepted here; they become a configuration
    /// error when a counter for an affected namespace and category is built.
    pub fn bounds(
        lower: Bound<u64>,
        upper: Bound<u64>,
        namespace: Namespace,
        categories: impl IntoIterator<Item = ComponentCategory>,
    ) -> Self {
        Reservation::Range(ReservationRange {
            lower,
            upper,
            namespace,
            categories: categories.into_iter().collect(),
        })
    }

    /// Reserve every identifier the store already knows about
    pub fn unique_in_store(lookup: Arc<dyn IdentifierLookup>) -> Self {
        Reservation::UniqueInStore(lookup)
    }

    /// Reserve every identifier the current transaction already uses
    pub fn unique_in_transaction(lookup: Arc<dyn IdentifierLookup>) -> Self {
        Reservation::UniqueInTransaction(lookup)
    }

    /// The fixed interval, if this reservation has one
    pub fn as_range(&self) -> Option<&ReservationRange> {
        match self {
            Reservation::Range(range) => Some(range),
            Reservation::UniqueInStore(_) | Reservation::UniqueInTransaction(_) => None,
        }
    }

    /// Whether this reservation restricts ids of `namespace` and `category`
    pub fn applies_to(&self, namespace: &Namespace, category: ComponentCategory) -> bool {
        match self {
            Reservation::Range(range) => range.applies_to(namespace, category),
            Reservation::UniqueInStore(_) | Reservation::UniqueInTransaction(_) => true,
        }
    }

    /// Whether `id` may not be handed out because of this reservation
    pub fn conflicts(&self, id: &SnomedIdentifier) -> bool {
        match self {
            Reservation::Range(range) => {
                range.applies_to(&id.namespace(), id.category())
                    && range.contains_item_id(id.item_id())
            }
            Reservation::UniqueInStore(lookup) | Reservation::UniqueInTransaction(lookup) => {
                lookup.contains(id)
            }
        }
    }
}

impl fmt::Debug for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reservation::Range(range) => f.debug_tuple("Range").field(range).finish(),
            Reservation::UniqueInStore(_) => f.write_str("UniqueInStore(..)"),
            Reservation::UniqueInTransaction(_) => f.write_str("UniqueInTransaction(..)"),
        }
    }
}
