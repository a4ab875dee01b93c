//! Receipt drafts.
//!
//! A draft is the package form an operator fills in while receiving a
//! purchase order, booking manufacturing output, or repacking stock. It
//! lives only until it is submitted or abandoned.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::net_weight::GROSS_FIELD;
use crate::reconcile::{DEFAULT_TOLERANCE, PackageEntry, ReconciliationResult, reconcile};
use crate::types::{ItemId, Quantity, QuantityError, Unit};

/// Which stock flow a draft belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    /// Goods received against a purchase order.
    PurchaseReceipt,
    /// Output booked against a manufacturing order.
    Manufacturing,
    /// Existing stock split or merged into new packages.
    Repackaging,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PurchaseReceipt => write!(f, "purchase_receipt"),
            Self::Manufacturing => write!(f, "manufacturing"),
            Self::Repackaging => write!(f, "repackaging"),
        }
    }
}

/// The item being received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    /// Server-side item ID, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ItemId>,
    /// Item name.
    pub name: String,
    /// Grade, e.g. `"A"`.
    #[serde(default)]
    pub grade: Option<String>,
    /// Size, e.g. `"10mm"`.
    #[serde(default)]
    pub size: Option<String>,
}

/// One package row in the shape the receiving endpoints expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionLine {
    /// Gross quantity as entered.
    #[serde(with = "rust_decimal::serde::float")]
    pub quantity: Decimal,
    /// Packaging weight, only present when it was deducted.
    #[serde(
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub packaging_weight: Option<Decimal>,
    /// Net quantity of one package.
    #[serde(with = "rust_decimal::serde::float")]
    pub net_quantity: Decimal,
    /// Number of identical packages.
    pub replication_count: u32,
}

/// A problem that blocks submission of a draft.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftIssue {
    /// No order or package reference was given.
    #[error("reference is required")]
    MissingReference,
    /// The draft has no package rows.
    #[error("at least one package row is required")]
    NoEntries,
    /// A row stands for zero packages.
    #[error("row {row}: replication count must be at least 1")]
    ZeroReplication {
        /// 1-based row number.
        row: usize,
    },
    /// A row carries packaging weight for a unit that has no tare.
    #[error("row {row}: packaging weight does not apply to {unit}")]
    PackagingNotApplicable {
        /// 1-based row number.
        row: usize,
        /// The draft's unit.
        unit: Unit,
    },
    /// A row's packaging weight is above its gross quantity.
    #[error("row {row}: packaging weight must not exceed the gross quantity")]
    PackagingExceedsGross {
        /// 1-based row number.
        row: usize,
    },
    /// A row has no gross quantity.
    #[error("row {row}: quantity is required")]
    MissingQuantity {
        /// 1-based row number.
        row: usize,
    },
    /// A row field held something other than a non-negative number.
    #[error("row {row}: {reason}")]
    Malformed {
        /// 1-based row number.
        row: usize,
        /// Which field was rejected and why.
        reason: QuantityError,
    },
}

/// Package form for a single receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptDraft {
    /// Stock flow.
    pub flow: Flow,
    /// Purchase order number, manufacturing order number, or package barcode.
    pub reference: String,
    /// Item being received.
    pub item: ItemRef,
    /// Quantity the packages must add up to.
    pub target: Quantity,
    /// Package rows.
    #[serde(default)]
    pub entries: Vec<PackageEntry>,
}

impl ReceiptDraft {
    /// Create an empty draft.
    #[must_use]
    pub fn new(flow: Flow, reference: impl Into<String>, item: ItemRef, target: Quantity) -> Self {
        Self {
            flow,
            reference: reference.into(),
            item,
            target,
            entries: Vec::new(),
        }
    }

    /// Append a package row.
    pub fn push(&mut self, entry: PackageEntry) {
        self.entries.push(entry);
    }

    /// Unit shared by the target and every row.
    #[must_use]
    pub const fn unit(&self) -> Unit {
        self.target.unit()
    }

    /// Collect every issue that blocks submission.
    ///
    /// Quantity mismatches are not reported here; see [`Self::reconcile`].
    #[must_use]
    pub fn validate(&self) -> Vec<DraftIssue> {
        let mut issues = Vec::new();
        let unit = self.unit();

        if self.reference.trim().is_empty() {
            issues.push(DraftIssue::MissingReference);
        }

        if self.entries.is_empty() {
            issues.push(DraftIssue::NoEntries);
        }

        for (index, entry) in self.entries.iter().enumerate() {
            let row = index + 1;
            let malformed = entry.malformed(unit);
            let gross_malformed = malformed
                .as_ref()
                .is_some_and(|reason| reason.field() == Some(GROSS_FIELD));

            if let Some(reason) = malformed {
                issues.push(DraftIssue::Malformed { row, reason });
            }

            if entry.gross_quantity.is_zero() && !gross_malformed {
                issues.push(DraftIssue::MissingQuantity { row });
            }

            if entry.replication_count == 0 {
                issues.push(DraftIssue::ZeroReplication { row });
            }

            match entry.packaging_weight {
                Some(tare) if !tare.is_zero() && !unit.supports_tare() => {
                    issues.push(DraftIssue::PackagingNotApplicable { row, unit });
                }
                Some(tare)
                    if unit.supports_tare()
                        && !entry.gross_quantity.is_zero()
                        && tare > entry.gross_quantity =>
                {
                    issues.push(DraftIssue::PackagingExceedsGross { row });
                }
                _ => {}
            }
        }

        issues
    }

    /// Reconcile rows against the target with the default tolerance.
    #[must_use]
    pub fn reconcile(&self) -> ReconciliationResult {
        self.reconcile_with(DEFAULT_TOLERANCE)
    }

    /// Reconcile rows against the target with a custom tolerance.
    #[must_use]
    pub fn reconcile_with(&self, tolerance: Decimal) -> ReconciliationResult {
        reconcile(&self.entries, self.target, tolerance)
    }

    /// Build the payload rows for the receiving endpoint.
    #[must_use]
    pub fn submission_lines(&self) -> Vec<SubmissionLine> {
        let unit = self.unit();
        self.entries
            .iter()
            .map(|entry| {
                let reconciled = entry.reconciled(unit);
                SubmissionLine {
                    quantity: entry.gross_quantity,
                    packaging_weight: entry
                        .packaging_weight
                        .filter(|_| entry.has_packaging(unit)),
                    net_quantity: reconciled.net_quantity,
                    replication_count: reconciled.replication_count,
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn rod() -> ItemRef {
        ItemRef {
            id: Some(ItemId::new(7)),
            name: "Rod".to_string(),
            grade: Some("A".to_string()),
            size: Some("10mm".to_string()),
        }
    }

    fn draft(unit: Unit, target: &str) -> ReceiptDraft {
        ReceiptDraft::new(
            Flow::PurchaseReceipt,
            "PO-1001",
            rod(),
            Quantity::new(dec(target), unit).unwrap(),
        )
    }

    #[test]
    fn test_valid_draft_has_no_issues() {
        let mut d = draft(Unit::Kg, "90");
        d.push(PackageEntry::new(dec("25")).with_packaging(dec("2.5")).replicated(4));
        assert!(d.validate().is_empty());
        assert!(d.reconcile().within_tolerance);
    }

    #[test]
    fn test_collects_all_issues() {
        let mut d = draft(Unit::Nos, "10");
        d.reference = "  ".to_string();
        d.push(PackageEntry::new(dec("5")).replicated(0));
        d.push(PackageEntry::new(dec("5")).with_packaging(dec("1")));
        d.push(PackageEntry::new(Decimal::ZERO));

        assert_eq!(
            d.validate(),
            vec![
                DraftIssue::MissingReference,
                DraftIssue::ZeroReplication { row: 1 },
                DraftIssue::PackagingNotApplicable {
                    row: 2,
                    unit: Unit::Nos
                },
                DraftIssue::MissingQuantity { row: 3 },
            ]
        );
    }

    #[test]
    fn test_empty_draft_reports_no_entries() {
        let d = draft(Unit::Kg, "1");
        assert_eq!(d.validate(), vec![DraftIssue::NoEntries]);
    }

    #[test]
    fn test_packaging_heavier_than_gross() {
        let mut d = draft(Unit::Kg, "0");
        d.push(PackageEntry::new(dec("2")).with_packaging(dec("2.5")));
        assert_eq!(
            d.validate(),
            vec![DraftIssue::PackagingExceedsGross { row: 1 }]
        );
    }

    #[test]
    fn test_packaging_equal_to_gross_is_accepted() {
        let mut d = draft(Unit::Kg, "0");
        d.push(PackageEntry::new(dec("2.5")).with_packaging(dec("2.5")));
        assert!(d.validate().is_empty());
        assert_eq!(d.submission_lines()[0].net_quantity, Decimal::ZERO);
        assert!(d.reconcile().within_tolerance);
    }

    #[test]
    fn test_malformed_fields_are_reported() {
        let d: ReceiptDraft = serde_json::from_value(serde_json::json!({
            "flow": "purchase_receipt",
            "reference": "PO-1001",
            "item": { "name": "Rod" },
            "target": { "value": 25, "unit": "KG" },
            "entries": [
                { "grossQuantity": "25kg", "packagingWeight": 2.5 },
                { "grossQuantity": 25, "packagingWeight": "spool" },
                { "grossQuantity": -3 }
            ]
        }))
        .unwrap();

        assert_eq!(
            d.validate(),
            vec![
                DraftIssue::Malformed {
                    row: 1,
                    reason: QuantityError::NotANumber {
                        field: "gross quantity"
                    }
                },
                DraftIssue::Malformed {
                    row: 2,
                    reason: QuantityError::NotANumber {
                        field: "packaging weight"
                    }
                },
                DraftIssue::Malformed {
                    row: 3,
                    reason: QuantityError::Negative {
                        field: "gross quantity",
                        value: "-3".to_string()
                    }
                },
            ]
        );
        assert_eq!(
            d.validate()[1].to_string(),
            "row 2: packaging weight is not a valid number"
        );
    }

    #[test]
    fn test_draft_accepts_lowercase_unit() {
        let d: ReceiptDraft = serde_json::from_value(serde_json::json!({
            "flow": "manufacturing",
            "reference": "MO-7",
            "item": { "name": "Wire" },
            "target": { "value": 20, "unit": "kg" },
            "entries": [{ "grossQuantity": 21, "packagingWeight": 1 }]
        }))
        .unwrap();

        assert_eq!(d.unit(), Unit::Kg);
        assert!(d.validate().is_empty());
        assert_eq!(serde_json::to_value(&d).unwrap()["target"]["unit"], "KG");
    }

    #[test]
    fn test_issue_messages() {
        assert_eq!(
            DraftIssue::PackagingNotApplicable {
                row: 2,
                unit: Unit::Litres
            }
            .to_string(),
            "row 2: packaging weight does not apply to LITRES"
        );
    }

    #[test]
    fn test_submission_lines_carry_net_quantity() {
        let mut d = draft(Unit::Kg, "90");
        d.push(PackageEntry::new(dec("25")).with_packaging(dec("2.5")).replicated(4));

        let lines = d.submission_lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].net_quantity, dec("22.5"));

        let json = serde_json::to_value(&lines[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "quantity": 25.0,
                "packagingWeight": 2.5,
                "netQuantity": 22.5,
                "replicationCount": 4
            })
        );
    }

    #[test]
    fn test_submission_lines_drop_packaging_for_count_units() {
        let mut d = draft(Unit::Litres, "5");
        d.push(PackageEntry::new(dec("5")).with_packaging(dec("1")));

        let json = serde_json::to_value(d.submission_lines()).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "quantity": 5.0, "netQuantity": 5.0, "replicationCount": 1 }])
        );
    }

    #[test]
    fn test_draft_from_yaml_shape() {
        let d: ReceiptDraft = serde_json::from_value(serde_json::json!({
            "flow": "manufacturing",
            "reference": "MO-7",
            "item": { "name": "Wire", "grade": "B" },
            "target": { "value": 40, "unit": "KG" },
            "entries": [
                { "grossQuantity": 21, "packagingWeight": 1 },
                { "quantity": "21", "packagingWeight": "1" }
            ]
        }))
        .unwrap();

        assert_eq!(d.flow, Flow::Manufacturing);
        assert_eq!(d.item.size, None);
        assert!(d.reconcile().within_tolerance);
    }
}
