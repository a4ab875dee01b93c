//! Packline Core - package quantity reconciliation and label assembly.
//!
//! This crate holds the calculation used when stock arrives in packages:
//! purchase receipts, manufacturing output, and repacking. It is consumed by:
//! - `client` - HTTP client and submission workflow for the receiving API
//! - `cli` - Command-line tools for operators
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits. No I/O, no
//! HTTP clients, no async. Data flows through it in one direction:
//!
//! ```text
//! package rows -> net weight -> reconciliation -> (submit) -> grouping -> labels
//! ```
//!
//! # Modules
//!
//! - [`types`] - Quantities, units and type-safe IDs
//! - [`net_weight`] - Gross to net conversion with packaging deduction
//! - [`reconcile`] - Package totals against a target quantity
//! - [`draft`] - The package form of a single receipt
//! - [`grouping`] - Grouping produced packages for batch printing
//! - [`labels`] - Label record assembly
//! - [`collab`] - Notifier and printer seams

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod collab;
pub mod draft;
pub mod grouping;
pub mod labels;
pub mod net_weight;
pub mod reconcile;
pub mod types;

pub use collab::{LabelPrinter, Notifier, PrintError, Severity};
pub use draft::{DraftIssue, Flow, ItemRef, ReceiptDraft, SubmissionLine};
pub use grouping::{GroupKey, PackageGroup, ProducedPackage, group_packages};
pub use labels::{LabelDefaults, LabelRecord, LabelSource, PrintJob, to_label_records};
pub use net_weight::{compute_net, lenient_amount, net_of, strict_amount, try_compute_net};
pub use reconcile::{
    DEFAULT_TOLERANCE, PackageEntry, ReconcileError, ReconciledPackage, ReconciliationResult,
    reconcile,
};
pub use types::*;
