//! Submission workflow for a receipt draft.
//!
//! Drives one user action end to end: validate the draft, reconcile its
//! packages, submit once, then group the returned packages and hand the
//! labels to the printer. Every outcome is reported through the notifier.
//!
//! Nothing is retried. A failed submission leaves the draft untouched so the
//! operator can submit again.

use rust_decimal::Decimal;
use tracing::instrument;

use packline_core::{
    DEFAULT_TOLERANCE, DraftIssue, LabelDefaults, LabelPrinter, LabelRecord, Notifier,
    PackageGroup, PrintJob, ProducedPackage, ReceiptDraft, ReconciliationResult, Severity,
    group_packages, to_label_records,
};

use crate::error::ApiError;
use crate::receiving::ReceiptSubmitter;

/// Callback run after a receipt has been committed.
pub type CommitHook = Box<dyn Fn(&Receipt) + Send + Sync>;

/// A committed receipt.
#[derive(Debug, Clone)]
pub struct Receipt {
    /// Reconciliation that allowed the submission.
    pub reconciliation: ReconciliationResult,
    /// Packages created by the server.
    pub packages: Vec<ProducedPackage>,
    /// Packages grouped for batch printing.
    pub groups: Vec<PackageGroup>,
    /// One label per package.
    pub labels: Vec<LabelRecord>,
    /// Number of print jobs the printer accepted.
    pub print_jobs: usize,
}

/// Result of running the workflow on a draft.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The draft has problems; nothing was sent.
    Invalid(Vec<DraftIssue>),
    /// Package total is out of tolerance; nothing was sent.
    Blocked(ReconciliationResult),
    /// The server accepted the packages.
    Committed(Receipt),
}

impl Outcome {
    /// Whether the receipt reached the server.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

/// Validate, reconcile, submit and print a receipt draft.
pub struct SubmissionWorkflow<S, N, P> {
    submitter: S,
    notifier: N,
    printer: P,
    tolerance: Decimal,
    on_commit: Option<CommitHook>,
}

impl<S, N, P> SubmissionWorkflow<S, N, P>
where
    S: ReceiptSubmitter,
    N: Notifier,
    P: LabelPrinter,
{
    /// Create a workflow with the default tolerance.
    pub const fn new(submitter: S, notifier: N, printer: P) -> Self {
        Self {
            submitter,
            notifier,
            printer,
            tolerance: DEFAULT_TOLERANCE,
            on_commit: None,
        }
    }

    /// Override the reconciliation tolerance.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Decimal) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Run `hook` after every committed receipt.
    #[must_use]
    pub fn on_commit(mut self, hook: impl Fn(&Receipt) + Send + Sync + 'static) -> Self {
        self.on_commit = Some(Box::new(hook));
        self
    }

    /// Run the workflow for one draft.
    ///
    /// Validation problems and tolerance mismatches are not errors: they are
    /// notified and returned as [`Outcome::Invalid`] / [`Outcome::Blocked`].
    ///
    /// # Errors
    ///
    /// Returns the [`ApiError`] of a failed submission after notifying it.
    #[instrument(skip_all, fields(flow = %draft.flow, reference = %draft.reference))]
    pub async fn run(&self, draft: &ReceiptDraft) -> Result<Outcome, ApiError> {
        let issues = draft.validate();
        if !issues.is_empty() {
            let listed = issues
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ");
            tracing::info!(issues = issues.len(), "Draft not submitted: {listed}");
            self.notifier
                .notify(Severity::Warning, &format!("Cannot submit: {listed}"));
            return Ok(Outcome::Invalid(issues));
        }

        let reconciliation = draft.reconcile_with(self.tolerance);
        if let Err(mismatch) = reconciliation.ensure_within_tolerance() {
            tracing::info!(
                total = %reconciliation.total_net,
                target = %reconciliation.target,
                difference = %reconciliation.difference,
                "Draft out of tolerance"
            );
            self.notifier.notify(Severity::Warning, &mismatch.to_string());
            return Ok(Outcome::Blocked(reconciliation));
        }

        let packages = match self.submitter.submit(draft).await {
            Ok(packages) => packages,
            Err(err) => {
                tracing::error!(error = %err, "Submission failed");
                self.notifier.notify(Severity::Error, &err.user_message());
                return Err(err);
            }
        };

        self.notifier.notify(
            Severity::Success,
            &format!(
                "{} received: {} packages, {}",
                draft.reference,
                packages.len(),
                reconciliation.total()
            ),
        );

        let receipt = self.print(draft, reconciliation, packages);

        if let Some(hook) = &self.on_commit {
            hook(&receipt);
        }

        Ok(Outcome::Committed(receipt))
    }

    /// Group packages, assemble labels and send one print job per group.
    ///
    /// Print failures are notified and do not undo the receipt.
    fn print(
        &self,
        draft: &ReceiptDraft,
        reconciliation: ReconciliationResult,
        packages: Vec<ProducedPackage>,
    ) -> Receipt {
        let defaults = LabelDefaults::for_item(&draft.reference, &draft.item, draft.unit());
        let groups = group_packages(&packages);
        let labels = to_label_records(&groups, &defaults);

        let mut print_jobs = 0;
        for job in PrintJob::per_group(&groups, &defaults) {
            match self.printer.print(&job) {
                Ok(()) => print_jobs += 1,
                Err(err) => {
                    tracing::warn!(error = %err, labels = job.label_count, "Label printing failed");
                    self.notifier
                        .notify(Severity::Warning, &format!("Labels not printed: {err}"));
                }
            }
        }

        Receipt {
            reconciliation,
            packages,
            groups,
            labels,
            print_jobs,
        }
    }
}
