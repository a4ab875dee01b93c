//! Package reconciliation.
//!
//! A receiving form collects package rows. Each row is one physical package
//! weight, optionally repeated for identical packages. Before anything is
//! sent to the server, the sum of net quantities over every physical
//! package must match the quantity being received to within a tolerance.

use core::fmt;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::net_weight::{lenient_amount, net_of, try_compute_net};
use crate::types::{Quantity, QuantityError, Unit};

/// Maximum absolute difference accepted between package total and target.
pub const DEFAULT_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// One package row as entered by the operator.
///
/// Deserialization is lenient: blank or garbage fields fall back to
/// defaults so a half-filled form still reconciles. The raw readings are
/// kept so [`PackageEntry::malformed`] can report what was coerced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawPackageEntry")]
pub struct PackageEntry {
    /// Gross reading including packaging.
    pub gross_quantity: Decimal,
    /// Spool or container weight. Only deducted for weight-based units.
    pub packaging_weight: Option<Decimal>,
    /// Number of identical physical packages this row stands for.
    pub replication_count: u32,
    #[serde(skip)]
    readings: Option<Readings>,
}

/// Numeric readings of a deserialized row before coercion.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Readings {
    gross: f64,
    packaging_weight: Option<f64>,
}

const fn default_replication() -> u32 {
    1
}

impl PackageEntry {
    /// A single package without packaging weight.
    #[must_use]
    pub const fn new(gross_quantity: Decimal) -> Self {
        Self {
            gross_quantity,
            packaging_weight: None,
            replication_count: 1,
            readings: None,
        }
    }

    /// Set the packaging weight.
    #[must_use]
    pub const fn with_packaging(mut self, packaging_weight: Decimal) -> Self {
        self.packaging_weight = Some(packaging_weight);
        self
    }

    /// Set how many identical packages this row represents.
    #[must_use]
    pub const fn replicated(mut self, replication_count: u32) -> Self {
        self.replication_count = replication_count;
        self
    }

    /// Whether the packaging weight is deducted for the given unit.
    #[must_use]
    pub const fn has_packaging(&self, unit: Unit) -> bool {
        unit.supports_tare() && self.packaging_weight.is_some()
    }

    /// The malformed field of a deserialized row, if any.
    ///
    /// Readings are checked with [`try_compute_net`], so packaging weight
    /// only counts when it applies to `unit`. Rows built in code are never
    /// malformed.
    #[must_use]
    pub fn malformed(&self, unit: Unit) -> Option<QuantityError> {
        let readings = self.readings?;
        try_compute_net(
            readings.gross,
            readings.packaging_weight,
            unit.supports_tare(),
        )
        .err()
    }

    /// Derive the net quantity of this row for the given unit.
    #[must_use]
    pub fn reconciled(&self, unit: Unit) -> ReconciledPackage {
        ReconciledPackage {
            net_quantity: net_of(
                self.gross_quantity,
                self.packaging_weight,
                self.has_packaging(unit),
            ),
            replication_count: self.replication_count,
        }
    }
}

/// A package row after packaging weight has been deducted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciledPackage {
    /// Net quantity of one physical package.
    pub net_quantity: Decimal,
    /// Number of identical physical packages.
    pub replication_count: u32,
}

impl ReconciledPackage {
    /// Net quantity summed over every physical package of the row.
    #[must_use]
    pub fn expanded_total(&self) -> Decimal {
        self.net_quantity
            .saturating_mul(Decimal::from(self.replication_count))
    }
}

/// Outcome of comparing package totals against a target quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationResult {
    /// Sum of net quantities over every physical package.
    pub total_net: Decimal,
    /// Quantity the packages must add up to.
    pub target: Decimal,
    /// `|total_net - target|`.
    pub difference: Decimal,
    /// Whether `difference` is within the tolerance.
    pub within_tolerance: bool,
    /// Unit shared by total and target.
    pub unit: Unit,
    /// Number of physical packages after expansion.
    pub package_count: u64,
}

impl ReconciliationResult {
    /// The summed net quantity as a [`Quantity`].
    #[must_use]
    pub fn total(&self) -> Quantity {
        Quantity::lenient(self.total_net, self.unit)
    }

    /// The target as a [`Quantity`].
    #[must_use]
    pub fn target_quantity(&self) -> Quantity {
        Quantity::lenient(self.target, self.unit)
    }

    /// Fail with a [`ReconcileError::Mismatch`] when out of tolerance.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::Mismatch`] carrying both quantities and the
    /// difference so the caller can show them.
    pub fn ensure_within_tolerance(&self) -> Result<(), ReconcileError> {
        if self.within_tolerance {
            Ok(())
        } else {
            Err(ReconcileError::Mismatch {
                total: self.total(),
                target: self.target_quantity(),
                difference: self.difference,
            })
        }
    }
}

impl fmt::Display for ReconciliationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packages, total {} against {} (difference {})",
            self.package_count,
            self.total(),
            self.target_quantity(),
            self.difference.normalize()
        )
    }
}

/// Errors raised when package totals cannot be accepted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// Package total differs from the target by more than the tolerance.
    #[error(
        "package total {total} does not match {target} (difference {})",
        .difference.normalize()
    )]
    Mismatch {
        /// Summed net quantity.
        total: Quantity,
        /// Expected quantity.
        target: Quantity,
        /// Absolute difference.
        difference: Decimal,
    },
}

/// Reconcile package rows against a target quantity.
///
/// Every row's net quantity is multiplied by its replication count and
/// summed. An empty row list sums to zero and is not special-cased.
///
/// ```
/// use packline_core::{PackageEntry, Quantity, Unit, reconcile, DEFAULT_TOLERANCE};
/// use rust_decimal::Decimal;
///
/// let row = PackageEntry::new(Decimal::new(25, 0)).with_packaging(Decimal::new(25, 1));
/// let entries = [row.clone(), row.replicated(3)];
/// let target = Quantity::new(Decimal::new(90, 0), Unit::Kg).unwrap();
///
/// let result = reconcile(&entries, target, DEFAULT_TOLERANCE);
/// assert!(result.within_tolerance);
/// assert_eq!(result.package_count, 4);
/// ```
#[must_use]
pub fn reconcile(
    entries: &[PackageEntry],
    target: Quantity,
    tolerance: Decimal,
) -> ReconciliationResult {
    let unit = target.unit();
    let (total_net, package_count) =
        entries
            .iter()
            .fold((Decimal::ZERO, 0_u64), |(total, count), entry| {
                let package = entry.reconciled(unit);
                (
                    total.saturating_add(package.expanded_total()),
                    count + u64::from(package.replication_count),
                )
            });

    let difference = (total_net - target.value()).abs();

    ReconciliationResult {
        total_net,
        target: target.value(),
        difference,
        within_tolerance: difference <= tolerance,
        unit,
        package_count,
    }
}

// =============================================================================
// Lenient form-field deserialization
// =============================================================================

/// A form field that may arrive as a number or as text.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawField {
    Number(f64),
    Text(String),
}

impl RawField {
    /// Parse into a decimal. `None` when the field is blank or not numeric.
    fn to_decimal(&self) -> Option<Decimal> {
        match self {
            Self::Number(n) if n.is_nan() => None,
            Self::Number(n) => Some(lenient_amount(*n)),
            Self::Text(text) => text
                .trim()
                .parse::<Decimal>()
                .ok()
                .map(|value| value.max(Decimal::ZERO)),
        }
    }

    /// The field as a float reading. `None` when blank, NaN when not numeric.
    fn reading(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(text) if text.trim().is_empty() => None,
            Self::Text(text) => Some(text.trim().parse().unwrap_or(f64::NAN)),
        }
    }
}

/// A package row exactly as it arrives from a form or file.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPackageEntry {
    #[serde(default, alias = "quantity")]
    gross_quantity: Option<RawField>,
    #[serde(default)]
    packaging_weight: Option<RawField>,
    #[serde(default)]
    replication_count: Option<RawField>,
}

impl From<RawPackageEntry> for PackageEntry {
    fn from(raw: RawPackageEntry) -> Self {
        let readings = Readings {
            gross: raw
                .gross_quantity
                .as_ref()
                .and_then(RawField::reading)
                .unwrap_or(0.0),
            packaging_weight: raw.packaging_weight.as_ref().and_then(RawField::reading),
        };

        Self {
            gross_quantity: raw
                .gross_quantity
                .as_ref()
                .and_then(RawField::to_decimal)
                .unwrap_or(Decimal::ZERO),
            packaging_weight: raw.packaging_weight.as_ref().and_then(RawField::to_decimal),
            replication_count: raw
                .replication_count
                .as_ref()
                .and_then(RawField::to_decimal)
                .map_or_else(default_replication, |value| {
                    value.trunc().to_u32().unwrap_or(u32::MAX)
                }),
            readings: Some(readings),
        }
    }
}
