//! Label record assembly.
//!
//! Produces the flat records a label printer renders: barcode, display name,
//! net quantity and unit. Fields missing on a package are filled from
//! caller-supplied defaults, usually the item of the receipt that produced
//! the packages.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::draft::ItemRef;
use crate::grouping::{PackageGroup, ProducedPackage};
use crate::types::Unit;

/// One printable label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelRecord {
    /// Barcode to encode.
    pub barcode: String,
    /// `"<name> Grade: <grade> Size: <size>"`.
    pub display_name: String,
    /// Net quantity printed on the label.
    pub net_quantity: Decimal,
    /// Unit printed on the label.
    pub unit: Unit,
}

/// Fallbacks used when a package omits a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelDefaults {
    /// Barcode when the package has none (typically the order reference).
    pub barcode: String,
    /// Item name when the package has none.
    pub item_name: String,
    /// Grade when the package has none.
    pub item_grade: Option<String>,
    /// Size when the package has none.
    pub item_size: Option<String>,
    /// Unit when the package has none.
    pub unit: Unit,
}

impl LabelDefaults {
    /// Defaults taken from the item and unit of a receipt.
    #[must_use]
    pub fn for_item(reference: &str, item: &ItemRef, unit: Unit) -> Self {
        Self {
            barcode: reference.to_string(),
            item_name: item.name.clone(),
            item_grade: item.grade.clone(),
            item_size: item.size.clone(),
            unit,
        }
    }
}

/// Format the display name printed under the barcode.
#[must_use]
pub fn display_name(name: &str, grade: &str, size: &str) -> String {
    format!("{name} Grade: {grade} Size: {size}")
}

/// Anything that can be turned into label records.
pub trait LabelSource {
    /// Build the label records for this source.
    fn label_records(&self, defaults: &LabelDefaults) -> Vec<LabelRecord>;
}

impl ProducedPackage {
    /// Build the label for this package.
    #[must_use]
    pub fn label_record(&self, defaults: &LabelDefaults) -> LabelRecord {
        let name = self.item_name.as_deref().unwrap_or(&defaults.item_name);
        let grade = self
            .item_grade
            .as_deref()
            .or(defaults.item_grade.as_deref())
            .unwrap_or_default();
        let size = self
            .item_size
            .as_deref()
            .or(defaults.item_size.as_deref())
            .unwrap_or_default();

        LabelRecord {
            barcode: self
                .barcode
                .clone()
                .filter(|barcode| !barcode.trim().is_empty())
                .unwrap_or_else(|| defaults.barcode.clone()),
            display_name: display_name(name, grade, size),
            net_quantity: self.net_quantity,
            unit: self.unit.unwrap_or(defaults.unit),
        }
    }
}

impl LabelSource for ProducedPackage {
    fn label_records(&self, defaults: &LabelDefaults) -> Vec<LabelRecord> {
        vec![self.label_record(defaults)]
    }
}

impl LabelSource for PackageGroup {
    fn label_records(&self, defaults: &LabelDefaults) -> Vec<LabelRecord> {
        self.packages
            .iter()
            .map(|package| package.label_record(defaults))
            .collect()
    }
}

/// Build label records for packages or package groups.
#[must_use]
pub fn to_label_records<S: LabelSource>(sources: &[S], defaults: &LabelDefaults) -> Vec<LabelRecord> {
    sources
        .iter()
        .flat_map(|source| source.label_records(defaults))
        .collect()
}

/// A batch of labels handed to a printer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    /// Records to render.
    pub records: Vec<LabelRecord>,
    /// Number of labels requested.
    pub label_count: usize,
}

impl PrintJob {
    /// One label per record.
    #[must_use]
    pub fn new(records: Vec<LabelRecord>) -> Self {
        let label_count = records.len();
        Self {
            records,
            label_count,
        }
    }

    /// One print job per package group.
    #[must_use]
    pub fn per_group(groups: &[PackageGroup], defaults: &LabelDefaults) -> Vec<Self> {
        groups
            .iter()
            .map(|group| Self::new(group.label_records(defaults)))
            .collect()
    }

    /// Whether there is nothing to print.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
