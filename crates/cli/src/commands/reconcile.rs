//! Offline reconciliation of a draft.
//!
//! # Usage
//!
//! ```bash
//! packline reconcile drafts/po-1001.yaml
//! packline reconcile drafts/mo-17.json --tolerance 0.05
//! ```

use std::path::Path;

use rust_decimal::Decimal;
use tracing::{info, warn};

use packline_core::{DEFAULT_TOLERANCE, ReceiptDraft, ReconciliationResult};

use super::CommandError;
use crate::input;

/// Validate and reconcile a draft file.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded, the draft has issues, or
/// the package total is out of tolerance.
pub async fn run(path: &Path, tolerance: Option<Decimal>) -> Result<(), Box<dyn std::error::Error>> {
    let draft: ReceiptDraft = input::load(path).await?;

    info!(
        flow = %draft.flow,
        reference = %draft.reference,
        rows = draft.entries.len(),
        "Loaded draft"
    );

    let result = check(&draft, tolerance.unwrap_or(DEFAULT_TOLERANCE))?;
    info!("Draft reconciles: {result}");
    Ok(())
}

/// Validate a draft and reconcile it against its target.
///
/// # Errors
///
/// Returns `CommandError` for a negative tolerance, validation issues, or a
/// total outside the tolerance.
pub fn check(draft: &ReceiptDraft, tolerance: Decimal) -> Result<ReconciliationResult, CommandError> {
    if tolerance.is_sign_negative() {
        return Err(CommandError::NegativeTolerance(tolerance));
    }

    let issues = draft.validate();
    if !issues.is_empty() {
        for issue in &issues {
            warn!("  - {issue}");
        }
        return Err(CommandError::InvalidDraft(issues.len()));
    }

    let result = draft.reconcile_with(tolerance);
    result.ensure_within_tolerance()?;
    Ok(result)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use packline_core::{Flow, ItemRef, PackageEntry, Quantity, Unit};

    use super::*;

    fn draft(target: &str, entries: Vec<PackageEntry>) -> ReceiptDraft {
        let mut draft = ReceiptDraft::new(
            Flow::Manufacturing,
            "MO-17",
            ItemRef {
                id: None,
                name: "Bolt".to_string(),
                grade: None,
                size: Some("M8".to_string()),
            },
            Quantity::new(target.parse().unwrap(), Unit::Nos).unwrap(),
        );
        for entry in entries {
            draft.push(entry);
        }
        draft
    }

    #[test]
    fn test_matching_draft() {
        let draft = draft(
            "150",
            vec![
                PackageEntry::new(Decimal::new(50, 0)).replicated(2),
                PackageEntry::new(Decimal::new(50, 0)),
            ],
        );
        let result = check(&draft, DEFAULT_TOLERANCE).unwrap();
        assert_eq!(result.package_count, 3);
    }

    #[test]
    fn test_out_of_tolerance() {
        let draft = draft("151", vec![PackageEntry::new(Decimal::new(150, 0))]);
        let err = check(&draft, DEFAULT_TOLERANCE).unwrap_err();
        assert_eq!(
            err.to_string(),
            "package total 150 Nos does not match 151 Nos (difference 1)"
        );
    }

    #[test]
    fn test_issues_reported_before_totals() {
        let draft = draft("10", Vec::new());
        assert!(matches!(
            check(&draft, DEFAULT_TOLERANCE),
            Err(CommandError::InvalidDraft(1))
        ));
    }

    #[test]
    fn test_negative_tolerance_rejected() {
        let draft = draft("10", vec![PackageEntry::new(Decimal::TEN)]);
        assert!(matches!(
            check(&draft, Decimal::NEGATIVE_ONE),
            Err(CommandError::NegativeTolerance(_))
        ));
    }
}
