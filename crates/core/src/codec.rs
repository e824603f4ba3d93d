//! Identifier string format and check digit
//!
//! An identifier is the item id followed by the namespace (long form only),
//! two partition digits and a Verhoeff check digit:
//!
//! ```text
//! short form:  <item id> 0 <category> <check>
//! long form:   <item id> <7 digit namespace> 1 <category> <check>
//! ```
//!
//! The first partition digit is the format flag: `0` for the international
//! space, `1` when a namespace is present. The second is the component
//! category. Identifiers are 6 to 18 digits long and never start with `0`.

use crate::error::{IdError, Result};
use crate::types::{ComponentCategory, Namespace, NAMESPACE_DIGITS};
use std::fmt;
use std::str::FromStr;

/// Shortest valid identifier
pub const MIN_IDENTIFIER_LENGTH: usize = 6;
/// Longest valid identifier
pub const MAX_IDENTIFIER_LENGTH: usize = 18;

const SHORT_FORMAT: u8 = 0;
const LONG_FORMAT: u8 = 1;

// ============================================================================
// Verhoeff tables
// ============================================================================

/// Multiplication table of the dihedral group D5
const MULTIPLICATION: [[u8; 10]; 10] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 2, 3, 4, 0, 6, 7, 8, 9, 5],
    [2, 3, 4, 0, 1, 7, 8, 9, 5, 6],
    [3, 4, 0, 1, 2, 8, 9, 5, 6, 7],
    [4, 0, 1, 2, 3, 9, 5, 6, 7, 8],
    [5, 9, 8, 7, 6, 0, 4, 3, 2, 1],
    [6, 5, 9, 8, 7, 1, 0, 4, 3, 2],
    [7, 6, 5, 9, 8, 2, 1, 0, 4, 3],
    [8, 7, 6, 5, 9, 3, 2, 1, 0, 4],
    [9, 8, 7, 6, 5, 4, 3, 2, 1, 0],
];

/// Position-dependent permutation, cycles with period 8
const PERMUTATION: [[u8; 10]; 8] = [
    [0, 1, 2, 3, 4, 5, 6, 7, 8, 9],
    [1, 5, 7, 6, 2, 8, 3, 0, 9, 4],
    [5, 8, 0, 3, 7, 9, 6, 1, 4, 2],
    [8, 9, 1, 6, 0, 4, 3, 5, 2, 7],
    [9, 4, 5, 3, 1, 2, 6, 8, 7, 0],
    [4, 2, 8, 6, 5, 7, 3, 9, 0, 1],
    [2, 7, 9, 3, 8, 0, 6, 4, 1, 5],
    [7, 0, 4, 6, 9, 1, 3, 2, 5, 8],
];

/// Group inverse of each element
const INVERSE: [u8; 10] = [0, 4, 3, 2, 1, 5, 6, 7, 8, 9];

fn digits_of(input: &str) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Err(IdError::malformed(input, "empty input"));
    }
    input
        .bytes()
        .map(|b| {
            if b.is_ascii_digit() {
                Ok(b - b'0')
            } else {
                Err(IdError::malformed(input, "contains non-digit characters"))
            }
        })
        .collect()
}

/// Fold digits (most significant first) through the Verhoeff group,
/// starting the permutation index at `offset`
fn verhoeff_fold(digits: &[u8], offset: usize) -> u8 {
    digits
        .iter()
        .rev()
        .enumerate()
        .fold(0u8, |check, (i, &digit)| {
            let permuted = PERMUTATION[(i + offset) % 8][usize::from(digit)];
            MULTIPLICATION[usize::from(check)][usize::from(permuted)]
        })
}

/// Compute the Verhoeff check digit for `digits`
///
/// `digits` is the identifier without its check digit, most significant digit
/// first.
///
/// # Errors
/// Returns `MalformedIdentifier` if the input is empty or contains anything
/// other than ASCII digits.
pub fn check_digit(digits: &str) -> Result<u8> {
    let digits = digits_of(digits)?;
    Ok(INVERSE[usize::from(verhoeff_fold(&digits, 1))])
}

/// Whether the trailing digit of `identifier` is a correct Verhoeff check digit
pub fn has_valid_check_digit(identifier: &str) -> bool {
    match digits_of(identifier) {
        Ok(digits) => digits.len() > 1 && verhoeff_fold(&digits, 0) == 0,
        Err(_) => false,
    }
}

/// Build the identifier string for an item id
///
/// # Errors
/// Returns `InvalidArgument` if `item_id` is outside the legal range of the
/// namespace.
pub fn encode(item_id: u64, namespace: &Namespace, category: ComponentCategory) -> Result<String> {
    let range = namespace.item_id_range();
    if !range.contains(item_id) {
        return Err(IdError::invalid_argument(format!(
            "item id {} is outside {} for namespace '{}'",
            item_id, range, namespace
        )));
    }

    let body = match namespace {
        Namespace::International => format!("{}{}{}", item_id, SHORT_FORMAT, category.digit()),
        Namespace::Extension(code) => {
            format!("{}{:07}{}{}", item_id, code, LONG_FORMAT, category.digit())
        }
    };
    let check = check_digit(&body)?;
    Ok(format!("{}{}", body, check))
}

/// Parse an identifier string
///
/// # Errors
/// Returns `MalformedIdentifier` if the string has the wrong length, contains
/// non-digits, starts with zero, has an unknown format or category digit, or
/// carries a wrong check digit.
pub fn decode(identifier: &str) -> Result<SnomedIdentifier> {
    let digits = digits_of(identifier)?;
    let len = digits.len();

    if !(MIN_IDENTIFIER_LENGTH..=MAX_IDENTIFIER_LENGTH).contains(&len) {
        return Err(IdError::malformed(
            identifier,
            format!(
                "length {} is outside {}..={}",
                len, MIN_IDENTIFIER_LENGTH, MAX_IDENTIFIER_LENGTH
            ),
        ));
    }
    if digits[0] == 0 {
        return Err(IdError::malformed(identifier, "leading zero"));
    }
    if verhoeff_fold(&digits, 0) != 0 {
        return Err(IdError::malformed(identifier, "check digit mismatch"));
    }

    let check = digits[len - 1];
    let category = ComponentCategory::from_digit(digits[len - 2]).ok_or_else(|| {
        IdError::malformed(
            identifier,
            format!("unknown component category digit {}", digits[len - 2]),
        )
    })?;

    let (item_digits, namespace) = match digits[len - 3] {
        SHORT_FORMAT => (&identifier[..len - 3], Namespace::International),
        LONG_FORMAT => {
            if len < NAMESPACE_DIGITS + 4 {
                return Err(IdError::malformed(identifier, "too short for a long form identifier"));
            }
            let ns_start = len - 3 - NAMESPACE_DIGITS;
            let namespace = Namespace::parse(&identifier[ns_start..len - 3])
                .map_err(|e| IdError::malformed(identifier, e.to_string()))?;
            (&identifier[..ns_start], namespace)
        }
        other => {
            return Err(IdError::malformed(
                identifier,
                format!("format digit {} is neither 0 nor 1", other),
            ))
        }
    };

    let item_id = item_digits
        .parse::<u64>()
        .map_err(|e| IdError::malformed(identifier, format!("bad item id: {}", e)))?;

    Ok(SnomedIdentifier {
        item_id,
        namespace,
        category,
        check_digit: check,
    })
}

/// A decoded identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SnomedIdentifier {
    item_id: u64,
    namespace: Namespace,
    category: ComponentCategory,
    check_digit: u8,
}

impl SnomedIdentifier {
    /// Build an identifier from its parts, computing the check digit
    ///
    /// # Errors
    /// Returns `InvalidArgument` if `item_id` is outside the namespace's legal range.
    pub fn new(item_id: u64, namespace: Namespace, category: ComponentCategory) -> Result<Self> {
        let encoded = encode(item_id, &namespace, category)?;
        let check_digit = encoded.as_bytes()[encoded.len() - 1] - b'0';
        Ok(Self {
            item_id,
            namespace,
            category,
            check_digit,
        })
    }

    /// Numeric item id
    pub fn item_id(&self) -> u64 {
        self.item_id
    }

    /// Namespace the identifier belongs to
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Component category
    pub fn category(&self) -> ComponentCategory {
        self.category
    }

    /// Trailing Verhoeff check digit
    pub fn check_digit(&self) -> u8 {
        self.check_digit
    }

    /// Format flag (`0` short form, `1` long form)
    pub fn format_digit(&self) -> u8 {
        if self.namespace.is_international() {
            SHORT_FORMAT
        } else {
            LONG_FORMAT
        }
    }
}

impl fmt::Display for SnomedIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Namespace::International => write!(
                f,
                "{}{}{}{}",
                self.item_id,
                SHORT_FORMAT,
                self.category.digit(),
                self.check_digit
            ),
            Namespace::Extension(code) => write!(
                f,
                "{}{:07}{}{}{}",
                self.item_id,
                code,
                LONG_FORMAT,
                self.category.digit(),
                self.check_digit
            ),
        }
    }
}

impl FromStr for SnomedIdentifier {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self> {
        decode(s)
    }
}

/// Whether `identifier` decodes successfully
pub fn is_valid(identifier: &str) -> bool {
    decode(identifier).is_ok()
}

/// Component category of an identifier string
pub fn category_of(identifier: &str) -> Result<ComponentCategory> {
    decode(identifier).map(|id| id.category())
}

/// Namespace of an identifier string
pub fn namespace_of(identifier: &str) -> Result<Namespace> {
    decode(identifier).map(|id| id.namespace())
}
