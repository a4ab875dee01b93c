//! Grouping of produced packages for batch label printing.
//!
//! When a receipt produces many packages of the same item and weight, the
//! labels are printed one batch per group instead of one print dialog per
//! package.
//!
//! Net quantities are compared exactly. Decimal equality is by value, so
//! `22.5` and `22.50` share a group, but two readings that differ only in a
//! far decimal place (`22.50000001` vs `22.49999999`) do not.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Quantity, Unit};

/// A package confirmed by the server, one per physical label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducedPackage {
    /// Server-assigned barcode.
    #[serde(default)]
    pub barcode: Option<String>,
    /// Item name.
    #[serde(default)]
    pub item_name: Option<String>,
    /// Item grade.
    #[serde(default)]
    pub item_grade: Option<String>,
    /// Item size.
    #[serde(default)]
    pub item_size: Option<String>,
    /// Net quantity of this package.
    pub net_quantity: Decimal,
    /// Unit of the net quantity.
    #[serde(default)]
    pub unit: Option<Unit>,
}

impl ProducedPackage {
    /// The grouping key of this package.
    #[must_use]
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            item_name: self.item_name.clone(),
            item_grade: self.item_grade.clone(),
            item_size: self.item_size.clone(),
            net_quantity: self.net_quantity,
            unit: self.unit,
        }
    }
}

/// Identity shared by every package in a [`PackageGroup`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupKey {
    /// Item name.
    pub item_name: Option<String>,
    /// Item grade.
    pub item_grade: Option<String>,
    /// Item size.
    pub item_size: Option<String>,
    /// Net quantity of each package.
    pub net_quantity: Decimal,
    /// Unit of the net quantity.
    pub unit: Option<Unit>,
}

/// Packages that share item identity and net quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageGroup {
    /// Shared identity.
    pub key: GroupKey,
    /// Members in input order.
    pub packages: Vec<ProducedPackage>,
}

impl PackageGroup {
    /// Number of labels to print for this group.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.packages.len()
    }

    /// Sum of member net quantities.
    #[must_use]
    pub fn group_total(&self) -> Decimal {
        self.packages
            .iter()
            .fold(Decimal::ZERO, |total, package| {
                total.saturating_add(package.net_quantity)
            })
    }

    /// The group total as a [`Quantity`], when the unit is known.
    #[must_use]
    pub fn total_quantity(&self) -> Option<Quantity> {
        self.key
            .unit
            .map(|unit| Quantity::lenient(self.group_total(), unit))
    }
}

/// Group packages by `(name, grade, size, net quantity, unit)`.
///
/// Groups appear in the order their first member appears in the input.
#[must_use]
pub fn group_packages(packages: &[ProducedPackage]) -> Vec<PackageGroup> {
    let mut groups: Vec<PackageGroup> = Vec::new();
    let mut index: HashMap<GroupKey, usize> = HashMap::new();

    for package in packages {
        let key = package.group_key();
        if let Some(group) = index.get(&key).and_then(|&i| groups.get_mut(i)) {
            group.packages.push(package.clone());
        } else {
            index.insert(key.clone(), groups.len());
            groups.push(PackageGroup {
                key,
                packages: vec![package.clone()],
            });
        }
    }

    groups
}
