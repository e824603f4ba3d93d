//! Core types for identifier generation
//!
//! This module defines the foundational types:
//! - ComponentCategory: Kind of terminology component, encoded as the partition digit
//! - Namespace: International space or a seven digit extension namespace
//! - ItemIdRange: Half-open legal interval of item ids for a namespace

use crate::error::{IdError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest item id handed out in the international space
pub const INTERNATIONAL_ITEM_ID_MIN: u64 = 100;
/// Exclusive upper bound of international item ids (15 digits)
pub const INTERNATIONAL_ITEM_ID_MAX_EXCLUSIVE: u64 = 1_000_000_000_000_000;
/// Smallest item id handed out in an extension namespace
pub const EXTENSION_ITEM_ID_MIN: u64 = 1;
/// Exclusive upper bound of extension item ids (8 digits)
pub const EXTENSION_ITEM_ID_MAX_EXCLUSIVE: u64 = 100_000_000;
/// Number of digits an extension namespace occupies in the long form
pub const NAMESPACE_DIGITS: usize = 7;

const MAX_NAMESPACE_CODE: u32 = 9_999_999;

/// Kind of terminology component
///
/// The discriminant is the partition digit written into every identifier,
/// so these values MUST NOT change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ComponentCategory {
    /// Concept (partition digit 0)
    Concept = 0,
    /// Description (partition digit 1)
    Description = 1,
    /// Relationship (partition digit 2)
    Relationship = 2,
}

impl ComponentCategory {
    /// All categories in partition digit order
    pub const ALL: [ComponentCategory; 3] = [
        ComponentCategory::Concept,
        ComponentCategory::Description,
        ComponentCategory::Relationship,
    ];

    /// Partition digit for this category
    pub fn digit(self) -> u8 {
        self as u8
    }

    /// Look up a category by its partition digit
    pub fn from_digit(digit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.digit() == digit)
    }

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            ComponentCategory::Concept => "Concept",
            ComponentCategory::Description => "Description",
            ComponentCategory::Relationship => "Relationship",
        }
    }
}

impl fmt::Display for ComponentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Identifier space a component belongs to
///
/// An empty namespace string denotes the international space. Anything else
/// must be a numeric namespace code of at most seven digits, which is written
/// zero-padded into long form identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[derive(Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Namespace {
    /// The international space (no namespace)
    #[default]
    International,
    /// An extension namespace
    Extension(u32),
}

impl Namespace {
    /// Parse a namespace string
    ///
    /// Surrounding whitespace is ignored. Empty input is the international
    /// space.
    ///
    /// # Errors
    /// Returns `InvalidArgument` unless the input is empty or 1 to 7 ASCII digits.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Namespace::International);
        }
        if trimmed.len() > NAMESPACE_DIGITS || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(IdError::invalid_argument(format!(
                "malformed namespace '{}': expected up to {} digits",
                raw, NAMESPACE_DIGITS
            )));
        }
        let code = trimmed
            .parse::<u32>()
            .map_err(|e| IdError::invalid_argument(format!("malformed namespace '{}': {}", raw, e)))?;
        Self::extension(code)
    }

    /// Create an extension namespace from its numeric code
    pub fn extension(code: u32) -> Result<Self> {
        if code > MAX_NAMESPACE_CODE {
            return Err(IdError::invalid_argument(format!(
                "namespace code {} does not fit in {} digits",
                code, NAMESPACE_DIGITS
            )));
        }
        Ok(Namespace::Extension(code))
    }

    /// Whether this is the international space
    pub fn is_international(&self) -> bool {
        matches!(self, Namespace::International)
    }

    /// Legal item id interval for this namespace
    pub fn item_id_range(&self) -> ItemIdRange {
        ItemIdRange::for_namespace(self)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::International => Ok(()),
            Namespace::Extension(code) => write!(f, "{:07}", code),
        }
    }
}

impl FromStr for Namespace {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self> {
        Namespace::parse(s)
    }
}

impl TryFrom<String> for Namespace {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self> {
        Namespace::parse(&value)
    }
}

impl From<Namespace> for String {
    fn from(value: Namespace) -> Self {
        value.to_string()
    }
}

/// Half-open interval `[lower_inclusive, upper_exclusive)` of item ids
///
/// Treated as a ring by [`ItemIdRange::normalize`]: stepping past either end
/// re-enters from the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemIdRange {
    lower_inclusive: u64,
    upper_exclusive: u64,
}

impl ItemIdRange {
    /// Create a range
    ///
    /// # Errors
    /// Returns `InvalidArgument` if the range is empty.
    pub fn new(lower_inclusive: u64, upper_exclusive: u64) -> Result<Self> {
        if lower_inclusive >= upper_exclusive {
            return Err(IdError::invalid_argument(format!(
                "empty item id range [{}, {})",
                lower_inclusive, upper_exclusive
            )));
        }
        Ok(Self {
            lower_inclusive,
            upper_exclusive,
        })
    }

    /// Legal range for a namespace
    pub fn for_namespace(namespace: &Namespace) -> Self {
        match namespace {
            Namespace::International => Self {
                lower_inclusive: INTERNATIONAL_ITEM_ID_MIN,
                upper_exclusive: INTERNATIONAL_ITEM_ID_MAX_EXCLUSIVE,
            },
            Namespace::Extension(_) => Self {
                lower_inclusive: EXTENSION_ITEM_ID_MIN,
                upper_exclusive: EXTENSION_ITEM_ID_MAX_EXCLUSIVE,
            },
        }
    }

    /// Inclusive lower bound
    pub fn lower_inclusive(&self) -> u64 {
        self.lower_inclusive
    }

    /// Exclusive upper bound
    pub fn upper_exclusive(&self) -> u64 {
        self.upper_exclusive
    }

    /// Number of item ids in the range
    pub fn len(&self) -> u64 {
        self.upper_exclusive - self.lower_inclusive
    }

    /// Always false; empty ranges cannot be constructed
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `item_id` lies inside the range
    pub fn contains(&self, item_id: u64) -> bool {
        item_id >= self.lower_inclusive && item_id < self.upper_exclusive
    }

    /// Wrap an arbitrary value back into the range
    ///
    /// Values below the range re-enter from the top, values at or above the
    /// upper bound re-enter from the bottom. The offset past the boundary is
    /// reduced modulo the range width, so any input lands inside the range and
    /// values already inside are returned unchanged.
    pub fn normalize(&self, value: i128) -> u64 {
        let lower = i128::from(self.lower_inclusive);
        let upper = i128::from(self.upper_exclusive);
        let width = upper - lower;

        let wrapped = if value < lower {
            let back = (lower - value) % width;
            if back == 0 {
                lower
            } else {
                upper - back
            }
        } else if value >= upper {
            lower + (value - upper) % width
        } else {
            value
        };

        // In [lower, upper) by construction, both of which fit in u64
        wrapped as u64
    }
}

impl fmt::Display for ItemIdRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.lower_inclusive, self.upper_exclusive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ========================================
    // ComponentCategory
    // ========================================

    #[test]
    fn test_category_digits_are_stable() {
        assert_eq!(ComponentCategory::Concept.digit(), 0);
        assert_eq!(ComponentCategory::Description.digit(), 1);
        assert_eq!(ComponentCategory::Relationship.digit(), 2);
    }

    #[test]
    fn test_category_from_digit() {
        for category in ComponentCategory::ALL {
            assert_eq!(ComponentCategory::from_digit(category.digit()), Some(category));
        }
        assert_eq!(ComponentCategory::from_digit(3), None);
        assert_eq!(ComponentCategory::from_digit(9), None);
    }

    // ========================================
    // Namespace
    // ========================================

    #[test]
    fn test_empty_namespace_is_international() {
        assert_eq!(Namespace::parse("").unwrap(), Namespace::International);
        assert_eq!(Namespace::parse("   ").unwrap(), Namespace::International);
        assert!(Namespace::parse("").unwrap().is_international());
    }

    #[test]
    fn test_extension_namespace_is_zero_padded() {
        let ns = Namespace::parse("154").unwrap();
        assert_eq!(ns, Namespace::Extension(154));
        assert_eq!(ns.to_string(), "0000154");
        assert_eq!(Namespace::parse("1000154").unwrap().to_string(), "1000154");
    }

    #[test]
    fn test_malformed_namespace_rejected() {
        for raw in ["abc", "12345678", "-1", "10 00"] {
            let err = Namespace::parse(raw).unwrap_err();
            assert!(matches!(err, IdError::InvalidArgument(_)), "accepted {:?}", raw);
        }
        assert!(Namespace::extension(10_000_000).is_err());
    }

    #[test]
    fn test_namespace_display_parse_round_trip() {
        for ns in [Namespace::International, Namespace::Extension(1000154), Namespace::Extension(7)] {
            assert_eq!(Namespace::parse(&ns.to_string()).unwrap(), ns);
        }
    }

    // ========================================
    // ItemIdRange
    // ========================================

    #[test]
    fn test_legal_ranges_per_namespace() {
        let intl = Namespace::International.item_id_range();
        assert_eq!(intl.lower_inclusive(), 100);
        assert_eq!(intl.upper_exclusive(), 1_000_000_000_000_000);

        let ext = Namespace::Extension(1000154).item_id_range();
        assert_eq!(ext.lower_inclusive(), 1);
        assert_eq!(ext.upper_exclusive(), 100_000_000);
    }

    #[test]
    fn test_empty_range_rejected() {
        assert!(ItemIdRange::new(5, 5).is_err());
        assert!(ItemIdRange::new(6, 5).is_err());
        assert_eq!(ItemIdRange::new(5, 6).unwrap().len(), 1);
    }

    #[test]
    fn test_normalize_inside_is_identity() {
        let range = ItemIdRange::new(100, 104).unwrap();
        for v in 100..104 {
            assert_eq!(range.normalize(v), v as u64);
        }
    }

    #[test]
    fn test_normalize_wraps_above() {
        let range = ItemIdRange::new(100, 104).unwrap();
        assert_eq!(range.normalize(104), 100);
        assert_eq!(range.normalize(105), 101);
        assert_eq!(range.normalize(107), 103);
        assert_eq!(range.normalize(108), 100);
    }

    #[test]
    fn test_normalize_wraps_below() {
        let range = ItemIdRange::new(100, 104).unwrap();
        assert_eq!(range.normalize(99), 103);
        assert_eq!(range.normalize(96), 100);
        assert_eq!(range.normalize(95), 103);
    }

    #[test]
    fn test_normalize_handles_jumps_larger_than_range() {
        let range = ItemIdRange::new(100, 104).unwrap();
        // 100 + 1024 = 1124, offset 1020 from the top, 1020 % 4 == 0
        assert_eq!(range.normalize(1124), 100);
        assert_eq!(range.normalize(1125), 101);
    }

    proptest! {
        #[test]
        fn prop_normalize_lands_in_range(
            lower in 0u64..1_000_000,
            width in 1u64..10_000,
            value in -10_000_000i128..10_000_000i128,
        ) {
            let range = ItemIdRange::new(lower, lower + width).unwrap();
            let n = range.normalize(value);
            prop_assert!(range.contains(n));
        }

        #[test]
        fn prop_normalize_is_idempotent(
            lower in 0u64..1_000_000,
            width in 1u64..10_000,
            value in -10_000_000i128..10_000_000i128,
        ) {
            let range = ItemIdRange::new(lower, lower + width).unwrap();
            let once = range.normalize(value);
            prop_assert_eq!(range.normalize(i128::from(once)), once);
        }

        #[test]
        fn prop_normalize_preserves_ring_position(
            lower in 0u64..1_000_000,
            width in 1u64..10_000,
            value in -10_000_000i128..10_000_000i128,
        ) {
            let range = ItemIdRange::new(lower, lower + width).unwrap();
            let n = range.normalize(value);
            let w = i128::from(width);
            prop_assert_eq!((i128::from(n) - value).rem_euclid(w), 0);
        }
    }
}
