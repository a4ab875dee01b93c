//! Receiving endpoints.
//!
//! One endpoint per stock flow. Each takes the package rows of a draft and
//! answers with the packages the server created, barcodes included.

use std::future::Future;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use packline_core::{Flow, ItemRef, ProducedPackage, ReceiptDraft, SubmissionLine, Unit};

use crate::client::PacklineClient;
use crate::error::ApiError;

/// Path segments of the endpoint that accepts a flow's packages.
#[must_use]
pub fn flow_endpoint(flow: Flow, reference: &str) -> [&str; 3] {
    match flow {
        Flow::PurchaseReceipt => ["purchase-orders", reference, "receive"],
        Flow::Manufacturing => ["manufacturing-orders", reference, "output"],
        Flow::Repackaging => ["packages", reference, "repack"],
    }
}

/// Request body shared by all receiving endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveRequest<'a> {
    /// Item being received.
    pub item: &'a ItemRef,
    /// Unit of every quantity in the request.
    pub unit: Unit,
    /// Quantity the packages add up to.
    #[serde(with = "rust_decimal::serde::float")]
    pub total_quantity: Decimal,
    /// Package rows.
    pub packages: Vec<SubmissionLine>,
}

impl<'a> ReceiveRequest<'a> {
    /// Build the request for a draft.
    #[must_use]
    pub fn from_draft(draft: &'a ReceiptDraft) -> Self {
        Self {
            item: &draft.item,
            unit: draft.unit(),
            total_quantity: draft.target.value(),
            packages: draft.submission_lines(),
        }
    }
}

/// Response body of the receiving endpoints and the package listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PackagesResponse {
    /// Packages created or found.
    pub packages: Vec<ProducedPackage>,
}

/// Something that can submit a draft and return the created packages.
pub trait ReceiptSubmitter {
    /// Submit the draft's package rows.
    fn submit(
        &self,
        draft: &ReceiptDraft,
    ) -> impl Future<Output = Result<Vec<ProducedPackage>, ApiError>>;
}

impl<S: ReceiptSubmitter + ?Sized> ReceiptSubmitter for &S {
    fn submit(
        &self,
        draft: &ReceiptDraft,
    ) -> impl Future<Output = Result<Vec<ProducedPackage>, ApiError>> {
        (**self).submit(draft)
    }
}

impl PacklineClient {
    /// Submit a draft to the endpoint of its flow.
    ///
    /// The draft is sent as-is; reconciliation is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, a rejected request, or a
    /// response that does not list packages.
    #[instrument(skip(self, draft), fields(flow = %draft.flow, reference = %draft.reference))]
    pub async fn submit_draft(
        &self,
        draft: &ReceiptDraft,
    ) -> Result<Vec<ProducedPackage>, ApiError> {
        let url = self.endpoint(&flow_endpoint(draft.flow, &draft.reference))?;
        let request = ReceiveRequest::from_draft(draft);

        let response: PackagesResponse = self.post_json(url, &request).await?;

        tracing::info!(
            packages = response.packages.len(),
            "Receipt accepted"
        );
        Ok(response.packages)
    }

    /// List packages already created for an order or package reference.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on network failure, a rejected request, or an
    /// unexpected response shape.
    #[instrument(skip(self))]
    pub async fn packages_for(&self, reference: &str) -> Result<Vec<ProducedPackage>, ApiError> {
        let url = self.endpoint(&["packages"])?;
        let response: PackagesResponse = self.get_json(url, &[("reference", reference)]).await?;
        Ok(response.packages)
    }
}

impl ReceiptSubmitter for PacklineClient {
    async fn submit(&self, draft: &ReceiptDraft) -> Result<Vec<ProducedPackage>, ApiError> {
        self.submit_draft(draft).await
    }
}
