//! Subcommand implementations.

use rust_decimal::Decimal;
use thiserror::Error;

use packline_core::ReconcileError;

pub mod labels;
pub mod reconcile;
pub mod submit;

/// Reasons a command stops without an I/O or API failure.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("draft has {0} issue(s)")]
    InvalidDraft(usize),
    #[error(transparent)]
    OutOfTolerance(#[from] ReconcileError),
    #[error("tolerance must not be negative (got {0})")]
    NegativeTolerance(Decimal),
}
