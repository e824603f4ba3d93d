//! Named reservation registry
//!
//! The registry owns every reservation under a unique name and answers
//! conflict queries. Counters read it once, through [`ReservationSource`],
//! when they are created; later changes are not pushed to existing counters.
//!
//! Uses parking_lot::RwLock so a panicking administrative caller cannot
//! poison the registry for every allocation that follows.

use crate::reservation::Reservation;
use parking_lot::RwLock;
use sctid_core::{decode, IdError, Result, SnomedIdentifier};
use std::collections::{BTreeMap, BTreeSet};

/// Provider of reservations for exclusion set construction
pub trait ReservationSource: Send + Sync {
    /// Consistent snapshot of all reservations, paired with their names
    fn reservations(&self) -> Vec<(String, Reservation)>;
}

/// Name of the first reservation in `reservations` that blocks `id`
///
/// Works on a snapshot taken with [`ReservationSource::reservations`], so a
/// caller checking many candidates reads the source once.
pub fn first_conflict<'a>(
    reservations: &'a [(String, Reservation)],
    id: &SnomedIdentifier,
) -> Option<&'a str> {
    reservations
        .iter()
        .find(|(_, reservation)| reservation.conflicts(id))
        .map(|(name, _)| name.as_str())
}

/// Thread-safe registry of named reservations
#[derive(Default)]
pub struct ReservationRegistry {
    reservations: RwLock<BTreeMap<String, Reservation>>,
}

impl ReservationRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `reservation` under `name`
    ///
    /// An existing reservation with the same name is replaced and returned.
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `name` is blank.
    pub fn create(
        &self,
        name: impl Into<String>,
        reservation: Reservation,
    ) -> Result<Option<Reservation>> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdError::invalid_argument("reservation name must not be blank"));
        }
        tracing::info!(reservation = %name, kind = ?reservation, "Creating reservation");
        Ok(self.reservations.write().insert(name, reservation))
    }

    /// Look up a reservation by name
    pub fn get(&self, name: &str) -> Option<Reservation> {
        self.reservations.read().get(name).cloned()
    }

    /// Remove a reservation; removing an unknown name does nothing
    pub fn delete(&self, name: &str) -> Option<Reservation> {
        let removed = self.reservations.write().remove(name);
        if removed.is_some() {
            tracing::info!(reservation = %name, "Deleted reservation");
        }
        removed
    }

    /// All reservations, ordered by name
    pub fn all(&self) -> Vec<(String, Reservation)> {
        self.reservations
            .read()
            .iter()
            .map(|(name, reservation)| (name.clone(), reservation.clone()))
            .collect()
    }

    /// Number of registered reservations
    pub fn len(&self) -> usize {
        self.reservations.read().len()
    }

    /// Whether no reservation is registered
    pub fn is_empty(&self) -> bool {
        self.reservations.read().is_empty()
    }

    /// Return the identifiers among `ids` that conflict with any reservation
    ///
    /// Every registered reservation is consulted, dynamic ones included. The
    /// dynamic lookups run after the registry lock has been released.
    ///
    /// # Errors
    /// Returns `MalformedIdentifier` if any input does not decode.
    pub fn is_reserved<I, S>(&self, ids: I) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let decoded = ids
            .into_iter()
            .map(|raw| decode(raw.as_ref()).map(|id| (raw.as_ref().to_string(), id)))
            .collect::<Result<Vec<_>>>()?;

        let snapshot = self.all();
        Ok(decoded
            .into_iter()
            .filter(|(_, id)| first_conflict(&snapshot, id).is_some())
            .map(|(raw, _)| raw)
            .collect())
    }
}

impl ReservationSource for ReservationRegistry {
    fn reservations(&self) -> Vec<(String, Reservation)> {
        self.all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sctid_core::{encode, ComponentCategory, Namespace};
    use std::sync::Arc;

    fn intl(item_id: u64) -> String {
        encode(item_id, &Namespace::International, ComponentCategory::Concept).unwrap()
    }

    #[test]
    fn test_create_get_delete() {
        let registry = ReservationRegistry::new();
        assert!(registry.is_empty());

        let r = Reservation::range(100, 199, Namespace::International, []);
        assert!(registry.create("block", r).unwrap().is_none());
        assert_eq!(registry.len(), 1);
        assert!(registry.get("block").is_some());
        assert!(registry.get("missing").is_none());

        assert!(registry.delete("block").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_create_overwrites_by_name() {
        let registry = ReservationRegistry::new();
        registry
            .create("block", Reservation::range(100, 199, Namespace::International, []))
            .unwrap();
        let previous = registry
            .create("block", Reservation::range(300, 399, Namespace::International, []))
            .unwrap();

        assert!(previous.is_some());
        assert_eq!(registry.len(), 1);
        let current = registry.get("block").unwrap();
        assert_eq!(current.as_range().unwrap().closed_bounds(), Ok((300, 399)));
    }

    #[test]
    fn test_blank_name_rejected() {
        let registry = ReservationRegistry::new();
        let err = registry
            .create("  ", Reservation::range(1, 2, Namespace::International, []))
            .unwrap_err();
        assert!(matches!(err, IdError::InvalidArgument(_)));
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let registry = ReservationRegistry::new();
        assert!(registry.delete("nothing").is_none());
    }

    #[test]
    fn test_all_is_ordered_by_name() {
        let registry = ReservationRegistry::new();
        for name in ["zeta", "alpha", "mid"] {
            registry
                .create(name, Reservation::range(1, 2, Namespace::Extension(1), []))
                .unwrap();
        }
        let names: Vec<_> = registry.all().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_is_reserved_returns_conflicting_subset() {
        let registry = ReservationRegistry::new();
        registry
            .create("block", Reservation::range(100, 199, Namespace::International, []))
            .unwrap();

        let ids = [intl(150), intl(250), intl(199)];
        let reserved = registry.is_reserved(&ids).unwrap();
        assert_eq!(reserved.len(), 2);
        assert!(reserved.contains(&intl(150)));
        assert!(reserved.contains(&intl(199)));
        assert!(!reserved.contains(&intl(250)));
    }

    #[test]
    fn test_is_reserved_consults_dynamic_reservations() {
        let registry = ReservationRegistry::new();
        let taken = intl(4242);
        let taken_id = decode(&taken).unwrap();
        registry
            .create(
                "store",
                Reservation::unique_in_store(Arc::new(move |id: &SnomedIdentifier| *id == taken_id)),
            )
            .unwrap();

        let reserved = registry.is_reserved([taken.clone(), intl(4243)]).unwrap();
        assert_eq!(reserved.into_iter().collect::<Vec<_>>(), vec![taken]);
    }

    #[test]
    fn test_is_reserved_rejects_malformed_input() {
        let registry = ReservationRegistry::new();
        let err = registry.is_reserved(["not-an-id"]).unwrap_err();
        assert!(matches!(err, IdError::MalformedIdentifier { .. }));
    }

    #[test]
    fn test_first_conflict_names_blocking_reservation() {
        let registry = ReservationRegistry::new();
        let id = decode(&intl(120)).unwrap();
        assert_eq!(first_conflict(&registry.reservations(), &id), None);

        registry
            .create("other", Reservation::range(300, 399, Namespace::International, []))
            .unwrap();
        registry
            .create("block", Reservation::range(100, 199, Namespace::International, []))
            .unwrap();
        let snapshot = registry.reservations();
        assert_eq!(first_conflict(&snapshot, &id), Some("block"));
        assert_eq!(first_conflict(&snapshot, &decode(&intl(250)).unwrap()), None);
    }
}
