//! Label batches for existing packages.
//!
//! Reads a list of packages (as returned by the receiving API), groups them,
//! and writes one print job per group.
//!
//! # Usage
//!
//! ```bash
//! packline labels packages.yaml
//! packline labels packages.json --format text --default-name "Rod" --default-unit kg
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use packline_core::{
    LabelDefaults, LabelPrinter, PackageGroup, PrintJob, ProducedPackage, group_packages,
};

use crate::input;
use crate::output::{Format, LabelWriter};

/// A package list file: either a bare list or `{ packages: [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PackageList {
    Wrapped { packages: Vec<ProducedPackage> },
    Bare(Vec<ProducedPackage>),
}

impl PackageList {
    fn into_packages(self) -> Vec<ProducedPackage> {
        match self {
            Self::Wrapped { packages } | Self::Bare(packages) => packages,
        }
    }
}

/// Group the packages in a file and write their labels.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or a print job cannot be
/// written.
pub async fn run(
    path: &Path,
    output: Option<PathBuf>,
    format: Format,
    defaults: &LabelDefaults,
) -> Result<(), Box<dyn std::error::Error>> {
    let packages = input::load::<PackageList>(path).await?.into_packages();
    info!(packages = packages.len(), "Loaded packages");

    let printer = LabelWriter::new(format, output);
    printer.reset()?;

    let groups = print_groups(&packages, defaults, &printer)?;

    info!(groups = groups.len(), "Labels complete");
    Ok(())
}

/// Group packages and send one print job per group to `printer`.
///
/// # Errors
///
/// Returns the first print error; earlier jobs stay printed.
pub fn print_groups<P: LabelPrinter>(
    packages: &[ProducedPackage],
    defaults: &LabelDefaults,
    printer: &P,
) -> Result<Vec<PackageGroup>, packline_core::PrintError> {
    let groups = group_packages(packages);

    for (group, job) in groups.iter().zip(PrintJob::per_group(&groups, defaults)) {
        info!(
            name = group.key.item_name.as_deref().unwrap_or(defaults.item_name.as_str()),
            net_quantity = %group.key.net_quantity.normalize(),
            labels = job.label_count,
            "Printing group"
        );
        printer.print(&job)?;
    }

    Ok(groups)
}
