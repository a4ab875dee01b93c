//! Submit a draft to the receiving API.
//!
//! # Usage
//!
//! ```bash
//! packline submit drafts/po-1001.yaml
//! packline submit drafts/po-1001.yaml --labels labels.txt --format text
//! ```
//!
//! # Environment Variables
//!
//! - `PACKLINE_API_URL` - Base URL of the receiving API
//! - `PACKLINE_API_TOKEN` - Bearer token
//! - `PACKLINE_TIMEOUT_SECS` - Request timeout (optional)
//! - `PACKLINE_TOLERANCE` - Reconciliation tolerance (optional)

use std::path::{Path, PathBuf};

use tracing::info;

use packline_client::{ClientConfig, Outcome, PacklineClient, SubmissionWorkflow};
use packline_core::ReceiptDraft;

use super::CommandError;
use crate::input;
use crate::output::{Format, LabelWriter, TracingNotifier};

/// Run the full submission workflow for a draft file.
///
/// # Errors
///
/// Returns an error if configuration is missing, the draft is invalid or out
/// of tolerance, or the API rejects the submission.
pub async fn run(
    path: &Path,
    labels: Option<PathBuf>,
    format: Format,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    info!(api_url = %config.api_url, "Loaded configuration");

    let draft: ReceiptDraft = input::load(path).await?;

    let printer = LabelWriter::new(format, labels);
    printer.reset()?;

    let client = PacklineClient::new(&config)?;
    let workflow = SubmissionWorkflow::new(client, TracingNotifier, &printer)
        .with_tolerance(config.tolerance)
        .on_commit(|receipt| {
            for group in &receipt.groups {
                info!(
                    labels = group.label_count(),
                    net_quantity = %group.key.net_quantity.normalize(),
                    total = %group.group_total().normalize(),
                    "Package group"
                );
            }
        });

    match workflow.run(&draft).await? {
        Outcome::Committed(receipt) => {
            info!(
                packages = receipt.packages.len(),
                groups = receipt.groups.len(),
                print_jobs = receipt.print_jobs,
                "Receipt committed"
            );
            if let Some(target) = printer.target() {
                info!(path = %target.display(), "Labels written");
            }
            Ok(())
        }
        Outcome::Invalid(issues) => Err(CommandError::InvalidDraft(issues.len()).into()),
        Outcome::Blocked(result) => Err(format!("Submission blocked: {result}").into()),
    }
}
