//! Quantity and unit-of-measure value objects.
//!
//! Every quantity that moves through receiving, manufacturing and packaging
//! is a [`Quantity`]: a non-negative decimal paired with a [`Unit`]. Decimal
//! arithmetic keeps tolerance comparisons such as `0.01` exact.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building quantities from raw input.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum QuantityError {
    /// The value was negative.
    #[error("{field} cannot be negative (got {value})")]
    Negative {
        /// Name of the offending field.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// The value was NaN, infinite, or outside the decimal range.
    #[error("{field} is not a valid number")]
    NotANumber {
        /// Name of the offending field.
        field: &'static str,
    },
    /// The unit code was not recognised.
    #[error("unknown unit: {0}")]
    UnknownUnit(String),
}

impl QuantityError {
    /// The offending field, when the error concerns one.
    #[must_use]
    pub const fn field(&self) -> Option<&'static str> {
        match self {
            Self::Negative { field, .. } | Self::NotANumber { field } => Some(*field),
            Self::UnknownUnit(_) => None,
        }
    }
}

/// Unit of measure for stock quantities.
///
/// Serialized as its wire code. Deserialization goes through [`FromStr`], so
/// `"kg"`, `"Kg"` and aliases such as `"pcs"` are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    /// Kilograms.
    #[default]
    Kg,
    /// Numbers (piece count).
    Nos,
    /// Litres.
    Litres,
}

impl Unit {
    /// Wire code as sent to and received from the API.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Kg => "KG",
            Self::Nos => "NOS",
            Self::Litres => "LITRES",
        }
    }

    /// Human-readable label used on screens and printed labels.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Kg => "Kg",
            Self::Nos => "Nos",
            Self::Litres => "Litres",
        }
    }

    /// Whether a packaging (tare) weight can be deducted for this unit.
    ///
    /// Only weight-based quantities carry a spool or container weight.
    #[must_use]
    pub const fn supports_tare(self) -> bool {
        matches!(self, Self::Kg)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl TryFrom<String> for Unit {
    type Error = QuantityError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        code.parse()
    }
}

impl From<Unit> for String {
    fn from(unit: Unit) -> Self {
        unit.code().to_string()
    }
}

impl FromStr for Unit {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kg" | "kgs" => Ok(Self::Kg),
            "nos" | "pcs" | "pieces" => Ok(Self::Nos),
            "litres" | "liters" | "ltr" | "l" => Ok(Self::Litres),
            _ => Err(QuantityError::UnknownUnit(s.to_string())),
        }
    }
}

/// A non-negative amount in a given unit.
///
/// ## Examples
///
/// ```
/// use packline_core::{Quantity, Unit};
/// use rust_decimal::Decimal;
///
/// let q = Quantity::new(Decimal::new(225, 1), Unit::Kg).unwrap();
/// assert_eq!(q.to_string(), "22.5 Kg");
///
/// assert!(Quantity::new(Decimal::new(-1, 0), Unit::Kg).is_err());
/// assert_eq!(Quantity::lenient(Decimal::new(-1, 0), Unit::Kg).value(), Decimal::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr")]
pub struct Quantity {
    value: Decimal,
    unit: Unit,
}

#[derive(Deserialize)]
struct QuantityRepr {
    value: Decimal,
    unit: Unit,
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = QuantityError;

    fn try_from(repr: QuantityRepr) -> Result<Self, Self::Error> {
        Self::new(repr.value, repr.unit)
    }
}

impl Quantity {
    /// Create a quantity, rejecting negative values.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::Negative`] if `value` is below zero.
    pub fn new(value: Decimal, unit: Unit) -> Result<Self, QuantityError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(QuantityError::Negative {
                field: "quantity",
                value: value.to_string(),
            });
        }
        Ok(Self { value, unit })
    }

    /// Create a quantity, clamping negative values to zero.
    #[must_use]
    pub fn lenient(value: Decimal, unit: Unit) -> Self {
        Self {
            value: value.max(Decimal::ZERO),
            unit,
        }
    }

    /// The numeric amount.
    #[must_use]
    pub const fn value(&self) -> Decimal {
        self.value
    }

    /// The unit of measure.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.unit
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value.normalize(), self.unit.label())
    }
}
