//! Integration tests for Packline.
//!
//! The tests run the real client against an in-process mock of the receiving
//! API. No external services are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p packline-integration-tests
//! ```
//!
//! # Mock API
//!
//! [`MockApi`] binds to `127.0.0.1:0`, records every request, and answers
//! with a configurable [`Reply`]. The default reply echoes the submitted
//! package rows back as created packages, one per replicated package, with
//! barcodes `PK-1`, `PK-2`, ...

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use secrecy::SecretString;
use serde_json::{Value, json};

use packline_client::{ClientConfig, PacklineClient};
use packline_core::{LabelPrinter, Notifier, PrintError, PrintJob, Severity};

/// Token the mock expects in the `Authorization` header.
pub const TEST_TOKEN: &str = "tk_integration_5f1c";

/// How the mock answers requests.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Turn submitted rows into created packages.
    Echo,
    /// Fixed JSON body.
    Json(StatusCode, Value),
    /// Fixed plain-text body.
    Text(StatusCode, String),
}

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RecordedRequest {
    /// Value of a header as text.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

#[derive(Debug)]
struct MockState {
    reply: Mutex<Reply>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process receiving API.
#[derive(Debug)]
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockApi {
    /// Start a mock that answers with `reply`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(reply: Reply) -> Self {
        let state = Arc::new(MockState {
            reply: Mutex::new(reply),
            requests: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock API");
        let addr = listener.local_addr().expect("Mock API has no address");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    /// Base URL of the mock, including the `/api` prefix.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// A client pointed at the mock.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self) -> PacklineClient {
        let config = ClientConfig::new(&self.base_url(), SecretString::from(TEST_TOKEN))
            .expect("Invalid mock config");
        PacklineClient::new(&config).expect("Failed to build client")
    }

    /// Change the reply for subsequent requests.
    pub fn set_reply(&self, reply: Reply) {
        *lock(&self.state.reply) = reply;
    }

    /// Requests received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state.requests).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let body = serde_json::from_str::<Value>(&body).ok();
    let authorized = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TEST_TOKEN}").as_str());

    lock(&state.requests).push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: body.clone(),
    });

    if !authorized {
        return (StatusCode::UNAUTHORIZED, "invalid token").into_response();
    }

    let reply = lock(&state.reply).clone();
    match reply {
        Reply::Echo => (StatusCode::OK, axum::Json(echo_packages(body.as_ref()))).into_response(),
        Reply::Json(status, value) => (status, axum::Json(value)).into_response(),
        Reply::Text(status, text) => (status, text).into_response(),
    }
}

/// Expand submitted rows into one created package per physical package.
fn echo_packages(body: Option<&Value>) -> Value {
    let Some(body) = body else {
        return json!({ "packages": [] });
    };
    let item = &body["item"];
    let mut packages = Vec::new();

    for row in body["packages"].as_array().into_iter().flatten() {
        let count = row["replicationCount"].as_u64().unwrap_or(1);
        for _ in 0..count {
            packages.push(json!({
                "barcode": format!("PK-{}", packages.len() + 1),
                "itemName": item["name"],
                "itemGrade": item["grade"],
                "itemSize": item["size"],
                "netQuantity": row["netQuantity"],
                "unit": body["unit"],
            }));
        }
    }

    json!({ "packages": packages })
}

/// Notifier that keeps every message.
#[derive(Debug, Default)]
pub struct RecordingNotifier(Mutex<Vec<(Severity, String)>>);

impl RecordingNotifier {
    /// Messages received so far.
    #[must_use]
    pub fn messages(&self) -> Vec<(Severity, String)> {
        lock(&self.0).clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        lock(&self.0).push((severity, message.to_string()));
    }
}

/// Printer that keeps every job.
#[derive(Debug, Default)]
pub struct RecordingPrinter(Mutex<Vec<PrintJob>>);

impl RecordingPrinter {
    /// Jobs printed so far.
    #[must_use]
    pub fn jobs(&self) -> Vec<PrintJob> {
        lock(&self.0).clone()
    }
}

impl LabelPrinter for RecordingPrinter {
    fn print(&self, job: &PrintJob) -> Result<(), PrintError> {
        lock(&self.0).push(job.clone());
        Ok(())
    }
}
