//! Receiving API HTTP client.
//!
//! Thin JSON-over-HTTP wrapper that attaches the bearer token and turns
//! non-success responses into [`ApiError`]s with a readable message.

use std::sync::Arc;

use reqwest::{Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::ApiError;

/// Header carrying a per-request correlation ID.
pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Receiving API client.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Clone)]
pub struct PacklineClient {
    inner: Arc<PacklineClientInner>,
}

struct PacklineClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: SecretString,
}

impl PacklineClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("packline/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(PacklineClientInner {
                client,
                base_url: config.api_url.clone(),
                token: config.api_token.clone(),
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Build an endpoint URL from path segments.
    ///
    /// Each segment is percent-encoded, so references containing `/` or
    /// spaces stay a single segment.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if the base URL cannot take path segments.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.inner.token.expose_secret())
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
    }

    /// Send a GET request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on network failures, `ApiError::Parse` when
    /// the body does not match `T`, and the status-specific variants for
    /// non-success responses.
    #[instrument(skip(self, query), fields(url = %url))]
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, url).query(query).send().await?;
        Self::decode(response).await
    }

    /// Send a POST request with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Http` on network failures, `ApiError::Parse` when
    /// the body does not match `T`, and the status-specific variants for
    /// non-success responses.
    #[instrument(skip(self, body), fields(url = %url))]
    pub async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(Method::POST, url).json(body).send().await?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let err = ApiError::from_status(status, &body);
            tracing::warn!(status = status.as_u16(), error = %err, "Request rejected");
            return Err(err);
        }

        Ok(serde_json::from_str(&body)?)
    }
}

impl std::fmt::Debug for PacklineClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacklineClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}
