//! Identifier service
//!
//! Turns item ids into full identifiers and deals with the collisions the
//! strategy cannot see:
//!
//! ```text
//! attempt = 1
//! loop:
//!     item ids   = strategy.generate_item_ids(namespace, category, missing, attempt)
//!     candidates = encode(item id) for each
//!     keep candidates not reported by registry.is_reserved
//!     done when quantity reached, fail after max_generation_attempts
//!     attempt += 1
//! ```
//!
//! Counters snapshot reservations when they are created, so a reservation
//! added afterwards is only caught here, and the retry spaces ids further
//! apart to step around it.

use crate::config::{IdGenerationConfig, StrategyKind};
use crate::strategy::{
    ItemIdGenerationStrategy, RandomStrategy, SequentialStrategy, MAX_ATTEMPT,
};
use rustc_hash::FxHashSet;
use sctid_core::{decode, encode, ComponentCategory, IdError, Namespace, Result, SnomedIdentifier};
use sctid_reservations::{Reservation, ReservationRegistry};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Generation, validation and reservation administration in one place
pub struct IdentifierService {
    registry: Arc<ReservationRegistry>,
    strategy: Arc<dyn ItemIdGenerationStrategy>,
    max_generation_attempts: u32,
}

impl IdentifierService {
    /// Create a service over an existing registry and strategy
    pub fn new(registry: Arc<ReservationRegistry>, strategy: Arc<dyn ItemIdGenerationStrategy>) -> Self {
        Self {
            registry,
            strategy,
            max_generation_attempts: MAX_ATTEMPT,
        }
    }

    /// Sequential strategy over a fresh registry
    pub fn sequential() -> Self {
        let registry = Arc::new(ReservationRegistry::new());
        let strategy = Arc::new(SequentialStrategy::new(registry.clone()));
        Self::new(registry, strategy)
    }

    /// Build registry and strategy from configuration
    pub fn from_config(config: &IdGenerationConfig) -> Result<Self> {
        config.validate()?;
        let registry = Arc::new(config.build_registry()?);
        let strategy: Arc<dyn ItemIdGenerationStrategy> = match config.strategy_kind()? {
            StrategyKind::Sequential => Arc::new(SequentialStrategy::new(registry.clone())),
            StrategyKind::Random => Arc::new(RandomStrategy::new(registry.clone())),
        };
        tracing::debug!(
            strategy = strategy.name(),
            reservations = registry.len(),
            max_generation_attempts = config.max_generation_attempts,
            "Identifier service configured"
        );
        Ok(Self::new(registry, strategy).with_max_generation_attempts(config.max_generation_attempts))
    }

    /// Bound the number of generation rounds per request
    pub fn with_max_generation_attempts(mut self, attempts: u32) -> Self {
        self.max_generation_attempts = attempts.max(1);
        self
    }

    /// Reservation registry shared with the strategy
    pub fn registry(&self) -> &Arc<ReservationRegistry> {
        &self.registry
    }

    /// Active strategy
    pub fn strategy(&self) -> &Arc<dyn ItemIdGenerationStrategy> {
        &self.strategy
    }

    /// Generate `quantity` unreserved identifiers
    ///
    /// # Errors
    /// - `InvalidArgument` for a zero quantity or malformed namespace
    /// - any strategy error (`RangeExhausted`, `ReservationConfiguration`)
    /// - `GenerationAttemptsExhausted` if collisions persist past the retry budget
    pub fn generate(
        &self,
        namespace: &str,
        category: ComponentCategory,
        quantity: usize,
    ) -> Result<Vec<String>> {
        let namespace = Namespace::parse(namespace)?;
        if quantity == 0 {
            return Err(IdError::invalid_argument(
                "number of requested ids must be positive",
            ));
        }

        let mut accepted = Vec::with_capacity(quantity);
        let mut seen: FxHashSet<String> = FxHashSet::default();
        let mut attempt = 1;

        loop {
            let missing = quantity - accepted.len();
            let candidates = self
                .strategy
                .generate_item_ids(&namespace, category, missing, attempt)?
                .iter()
                .map(|item_id| to_identifier(item_id, &namespace, category))
                .collect::<Result<Vec<_>>>()?;

            let reserved = self.registry.is_reserved(&candidates)?;
            for candidate in candidates {
                if !reserved.contains(&candidate) && seen.insert(candidate.clone()) {
                    accepted.push(candidate);
                }
            }

            if accepted.len() == quantity {
                return Ok(accepted);
            }

            let missing = quantity - accepted.len();
            if attempt >= self.max_generation_attempts {
                tracing::warn!(
                    namespace = %namespace,
                    category = %category,
                    attempts = attempt,
                    missing,
                    "Giving up on identifier generation"
                );
                return Err(IdError::GenerationAttemptsExhausted {
                    attempts: attempt,
                    missing,
                });
            }

            tracing::warn!(
                namespace = %namespace,
                category = %category,
                attempt,
                collisions = reserved.len(),
                missing,
                "Generated identifiers collided, retrying"
            );
            attempt += 1;
        }
    }

    /// Decode and check an identifier
    pub fn validate(&self, id: &str) -> Result<SnomedIdentifier> {
        decode(id)
    }

    /// Identifiers among `ids` that conflict with a reservation
    pub fn is_reserved<I, S>(&self, ids: I) -> Result<BTreeSet<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.registry.is_reserved(ids)
    }

    /// Register a reservation, replacing any with the same name
    pub fn create_reservation(&self, name: &str, reservation: Reservation) -> Result<()> {
        self.registry.create(name, reservation).map(|_| ())
    }

    /// Remove a reservation; unknown names are ignored
    pub fn delete_reservation(&self, name: &str) {
        self.registry.delete(name);
    }

    /// Force the counter of a namespace and category to `value`
    pub fn set_counter(&self, namespace: &str, category: ComponentCategory, value: u64) -> Result<()> {
        let namespace = Namespace::parse(namespace)?;
        self.strategy.set_counter(&namespace, category, value)
    }
}

fn to_identifier(item_id: &str, namespace: &Namespace, category: ComponentCategory) -> Result<String> {
    let item_id = item_id.parse::<u64>().map_err(|e| {
        IdError::invalid_argument(format!("strategy produced non-numeric item id '{}': {}", item_id, e))
    })?;
    encode(item_id, namespace, category)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::SingleItemIdStrategy;
    use sctid_core::{has_valid_check_digit, ComponentCategory::*};

    #[test]
    fn test_generate_short_form() {
        let service = IdentifierService::sequential();
        let ids = service.generate("", Concept, 3).unwrap();
        assert_eq!(
            ids,
            vec![
                encode(100, &Namespace::International, Concept).unwrap(),
                encode(101, &Namespace::International, Concept).unwrap(),
                encode(102, &Namespace::International, Concept).unwrap(),
            ]
        );
        assert!(ids.iter().all(|id| has_valid_check_digit(id)));
    }

    #[test]
    fn test_generate_long_form() {
        let service = IdentifierService::sequential();
        let ids = service.generate("1000154", Description, 2).unwrap();
        for id in &ids {
            let decoded = service.validate(id).unwrap();
            assert_eq!(decoded.namespace(), Namespace::Extension(1000154));
            assert_eq!(decoded.category(), Description);
        }
    }

    #[test]
    fn test_generate_retries_around_late_reservation() {
        let service = IdentifierService::sequential();
        // Counter created with no reservations
        service.generate("", Concept, 1).unwrap();
        // 101..=120 reserved afterwards; the counter does not know
        service
            .create_reservation("late", Reservation::range(101, 120, Namespace::International, []))
            .unwrap();

        let ids = service.generate("", Concept, 2).unwrap();
        assert_eq!(ids.len(), 2);
        assert!(service.is_reserved(&ids).unwrap().is_empty());
        for id in &ids {
            let item = service.validate(id).unwrap().item_id();
            assert!(!(101..=120).contains(&item));
        }
    }

    #[test]
    fn test_generate_gives_up_after_max_attempts() {
        let registry = Arc::new(ReservationRegistry::new());
        let strategy = Arc::new(SingleItemIdStrategy::new("555"));
        let service = IdentifierService::new(registry, strategy).with_max_generation_attempts(3);
        service
            .create_reservation("blocked", Reservation::range(555, 555, Namespace::International, []))
            .unwrap();

        let err = service.generate("", Concept, 1).unwrap_err();
        assert!(matches!(
            err,
            IdError::GenerationAttemptsExhausted {
                attempts: 3,
                missing: 1
            }
        ));
    }

    #[test]
    fn test_generate_with_single_strategy() {
        let registry = Arc::new(ReservationRegistry::new());
        let service = IdentifierService::new(registry, Arc::new(SingleItemIdStrategy::new("138875")));
        assert_eq!(service.generate("", Concept, 1).unwrap(), vec!["138875005"]);
    }

    #[test]
    fn test_generate_rejects_bad_input() {
        let service = IdentifierService::sequential();
        assert!(matches!(
            service.generate("", Concept, 0),
            Err(IdError::InvalidArgument(_))
        ));
        assert!(matches!(
            service.generate("abc", Concept, 1),
            Err(IdError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_set_counter_through_service() {
        let service = IdentifierService::sequential();
        service.set_counter("", Relationship, 9000).unwrap();
        let ids = service.generate("", Relationship, 1).unwrap();
        assert_eq!(service.validate(&ids[0]).unwrap().item_id(), 9000);
    }

    #[test]
    fn test_delete_reservation_is_idempotent() {
        let service = IdentifierService::sequential();
        service
            .create_reservation("x", Reservation::range(1, 2, Namespace::Extension(1), []))
            .unwrap();
        service.delete_reservation("x");
        service.delete_reservation("x");
        assert!(service.registry().is_empty());
    }

    #[test]
    fn test_from_config() {
        let config = IdGenerationConfig::from_toml_str(
            r#"
[reservations.low]
item_id_min = 100
item_id_max = 499
categories = ["concept"]
"#,
        )
        .unwrap();
        let service = IdentifierService::from_config(&config).unwrap();
        assert_eq!(service.strategy().name(), "sequential");

        let ids = service.generate("", Concept, 1).unwrap();
        assert_eq!(service.validate(&ids[0]).unwrap().item_id(), 500);
    }

    #[test]
    fn test_from_config_random() {
        let config = IdGenerationConfig::from_toml_str(r#"strategy = "random""#).unwrap();
        let service = IdentifierService::from_config(&config).unwrap();
        assert_eq!(service.strategy().name(), "random");
        assert_eq!(service.generate("1000154", Concept, 5).unwrap().len(), 5);
        assert!(service.set_counter("", Concept, 200).is_err());
    }
}
