//! Receiving flows against the mock API.
//!
//! Run with: cargo test -p packline-integration-tests

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use serde_json::json;
use uuid::Uuid;

use packline_client::{ApiError, Outcome, REQUEST_ID_HEADER, SubmissionWorkflow};
use packline_core::{Flow, ItemRef, PackageEntry, Quantity, ReceiptDraft, Severity, Unit};
use packline_integration_tests::{
    MockApi, RecordingNotifier, RecordingPrinter, Reply, TEST_TOKEN,
};

fn rod() -> ItemRef {
    ItemRef {
        id: None,
        name: "Rod".to_string(),
        grade: Some("A".to_string()),
        size: Some("10mm".to_string()),
    }
}

/// Four 25 kg packages with 2.5 kg spools against a target of `target` kg.
fn purchase_draft(target: i64) -> ReceiptDraft {
    let mut draft = ReceiptDraft::new(
        Flow::PurchaseReceipt,
        "PO-1001",
        rod(),
        Quantity::new(Decimal::new(target, 0), Unit::Kg).unwrap(),
    );
    let row = PackageEntry::new(Decimal::new(25, 0)).with_packaging(Decimal::new(25, 1));
    draft.push(row.clone());
    draft.push(row.replicated(3));
    draft
}

// ============================================================================
// Submission workflow
// ============================================================================

#[tokio::test]
async fn test_purchase_receipt_end_to_end() {
    let api = MockApi::start(Reply::Echo).await;
    let notifier = RecordingNotifier::default();
    let printer = RecordingPrinter::default();
    let workflow = SubmissionWorkflow::new(api.client(), &notifier, &printer);

    let outcome = workflow.run(&purchase_draft(90)).await.unwrap();

    let Outcome::Committed(receipt) = outcome else {
        panic!("expected committed outcome");
    };
    assert_eq!(receipt.packages.len(), 4);
    assert_eq!(receipt.groups.len(), 1);
    assert_eq!(receipt.labels[3].barcode, "PK-4");
    assert_eq!(receipt.labels[0].display_name, "Rod Grade: A Size: 10mm");
    assert_eq!(receipt.labels[0].net_quantity, Decimal::new(225, 1));

    let jobs = printer.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].label_count, 4);

    assert_eq!(
        notifier.messages(),
        vec![(
            Severity::Success,
            "PO-1001 received: 4 packages, 90 Kg".to_string()
        )]
    );

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.path, "/api/purchase-orders/PO-1001/receive");
    assert_eq!(
        request.body.as_ref().unwrap()["packages"],
        json!([
            { "quantity": 25.0, "packagingWeight": 2.5, "netQuantity": 22.5, "replicationCount": 1 },
            { "quantity": 25.0, "packagingWeight": 2.5, "netQuantity": 22.5, "replicationCount": 3 }
        ])
    );
}

#[tokio::test]
async fn test_request_headers() {
    let api = MockApi::start(Reply::Echo).await;

    api.client().submit_draft(&purchase_draft(90)).await.unwrap();
    api.client().submit_draft(&purchase_draft(90)).await.unwrap();

    let requests = api.requests();
    let expected_auth = format!("Bearer {TEST_TOKEN}");
    assert_eq!(requests[0].header("authorization"), Some(expected_auth.as_str()));

    let first = Uuid::parse_str(requests[0].header(REQUEST_ID_HEADER).unwrap()).unwrap();
    let second = Uuid::parse_str(requests[1].header(REQUEST_ID_HEADER).unwrap()).unwrap();
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_mismatch_sends_nothing() {
    let api = MockApi::start(Reply::Echo).await;
    let notifier = RecordingNotifier::default();
    let printer = RecordingPrinter::default();
    let workflow = SubmissionWorkflow::new(api.client(), &notifier, &printer);

    let outcome = workflow.run(&purchase_draft(91)).await.unwrap();

    assert!(matches!(outcome, Outcome::Blocked(ref result) if result.difference == Decimal::ONE));
    assert!(api.requests().is_empty());
    assert!(printer.jobs().is_empty());
    assert_eq!(notifier.messages()[0].0, Severity::Warning);
}

#[tokio::test]
async fn test_remote_rejection_is_reported() {
    let api = MockApi::start(Reply::Json(
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "message": "Purchase order is closed" }),
    ))
    .await;
    let notifier = RecordingNotifier::default();
    let printer = RecordingPrinter::default();
    let workflow = SubmissionWorkflow::new(api.client(), &notifier, &printer);

    let err = workflow.run(&purchase_draft(90)).await.unwrap_err();

    assert!(matches!(err, ApiError::Remote { status: 422, ref message } if message == "Purchase order is closed"));
    assert_eq!(
        notifier.messages(),
        vec![(Severity::Error, "Purchase order is closed".to_string())]
    );
    assert!(printer.jobs().is_empty());
}

#[tokio::test]
async fn test_resubmit_after_failure() {
    let api = MockApi::start(Reply::Text(
        StatusCode::SERVICE_UNAVAILABLE,
        String::new(),
    ))
    .await;
    let workflow = SubmissionWorkflow::new(
        api.client(),
        RecordingNotifier::default(),
        RecordingPrinter::default(),
    );
    let draft = purchase_draft(90);

    let err = workflow.run(&draft).await.unwrap_err();
    assert_eq!(err.user_message(), "HTTP 503 Service Unavailable");

    api.set_reply(Reply::Echo);
    assert!(workflow.run(&draft).await.unwrap().is_committed());
    assert_eq!(api.requests().len(), 2);
}

// ============================================================================
// Client errors
// ============================================================================

#[tokio::test]
async fn test_rejected_token() {
    let api = MockApi::start(Reply::Echo).await;
    let config = packline_client::ClientConfig::new(
        &api.base_url(),
        secrecy::SecretString::from("tk_wrong"),
    )
    .unwrap();
    let client = packline_client::PacklineClient::new(&config).unwrap();

    let err = client.submit_draft(&purchase_draft(90)).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthorized(ref message) if message == "invalid token"));
}

#[tokio::test]
async fn test_not_found() {
    let api = MockApi::start(Reply::Json(
        StatusCode::NOT_FOUND,
        json!({ "errors": [{ "message": "PO-1001 does not exist" }] }),
    ))
    .await;

    let err = api.client().submit_draft(&purchase_draft(90)).await.unwrap_err();

    assert!(matches!(err, ApiError::NotFound(ref message) if message == "PO-1001 does not exist"));
}

#[tokio::test]
async fn test_success_without_packages_is_a_parse_error() {
    let api = MockApi::start(Reply::Json(StatusCode::OK, json!({ "ok": true }))).await;

    let err = api.client().submit_draft(&purchase_draft(90)).await.unwrap_err();

    assert!(matches!(err, ApiError::Parse(_)));
}

// ============================================================================
// Other flows
// ============================================================================

#[tokio::test]
async fn test_manufacturing_output_endpoint() {
    let api = MockApi::start(Reply::Echo).await;
    let mut draft = ReceiptDraft::new(
        Flow::Manufacturing,
        "MO-17",
        ItemRef {
            id: None,
            name: "Bolt".to_string(),
            grade: None,
            size: Some("M8".to_string()),
        },
        Quantity::new(Decimal::new(150, 0), Unit::Nos).unwrap(),
    );
    draft.push(PackageEntry::new(Decimal::new(50, 0)).replicated(3));

    let packages = api.client().submit_draft(&draft).await.unwrap();

    assert_eq!(packages.len(), 3);
    assert_eq!(packages[0].unit, Some(Unit::Nos));
    let request = &api.requests()[0];
    assert_eq!(request.path, "/api/manufacturing-orders/MO-17/output");
    let body = request.body.as_ref().unwrap();
    assert_eq!(body["unit"], "NOS");
    assert!(body["packages"][0].get("packagingWeight").is_none());
}

#[tokio::test]
async fn test_repack_groups_by_weight() {
    let api = MockApi::start(Reply::Echo).await;
    let notifier = RecordingNotifier::default();
    let printer = RecordingPrinter::default();
    let workflow = SubmissionWorkflow::new(api.client(), &notifier, &printer);

    let mut draft = ReceiptDraft::new(
        Flow::Repackaging,
        "PK-88",
        rod(),
        Quantity::new(Decimal::new(65, 0), Unit::Kg).unwrap(),
    );
    draft.push(
        PackageEntry::new(Decimal::new(25, 0))
            .with_packaging(Decimal::new(25, 1))
            .replicated(2),
    );
    draft.push(PackageEntry::new(Decimal::new(225, 1)).with_packaging(Decimal::new(25, 1)));

    let Outcome::Committed(receipt) = workflow.run(&draft).await.unwrap() else {
        panic!("expected committed outcome");
    };

    assert_eq!(api.requests()[0].path, "/api/packages/PK-88/repack");
    assert_eq!(receipt.groups.len(), 2);
    assert_eq!(receipt.groups[0].label_count(), 2);
    assert_eq!(receipt.groups[1].key.net_quantity, Decimal::new(20, 0));
    assert_eq!(printer.jobs().len(), 2);
}

#[tokio::test]
async fn test_packages_for_reference() {
    let api = MockApi::start(Reply::Json(
        StatusCode::OK,
        json!({ "packages": [
            { "barcode": "PK-1", "itemName": "Rod", "netQuantity": 22.5, "unit": "KG" },
            { "barcode": "PK-2", "itemName": "Rod", "netQuantity": "22.50", "unit": "KG" }
        ]}),
    ))
    .await;

    let packages = api.client().packages_for("PO 1001").await.unwrap();

    assert_eq!(packages.len(), 2);
    assert_eq!(packages[0].group_key(), packages[1].group_key());
    let request = &api.requests()[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/api/packages");
    assert_eq!(request.query.as_deref(), Some("reference=PO+1001"));
}

#[tokio::test]
async fn test_packages_with_unit_labels() {
    let api = MockApi::start(Reply::Json(
        StatusCode::OK,
        json!({ "packages": [
            { "barcode": "PK-1", "itemName": "Bolt", "netQuantity": 50, "unit": "Nos" },
            { "barcode": "PK-2", "itemName": "Oil", "netQuantity": 5, "unit": "litres" }
        ]}),
    ))
    .await;

    let packages = api.client().packages_for("MO-17").await.unwrap();

    assert_eq!(packages[0].unit, Some(Unit::Nos));
    assert_eq!(packages[1].unit, Some(Unit::Litres));
}
