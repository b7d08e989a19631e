//! REST client for the Gemini `generateContent` endpoint.
//!
//! Wraps a single HTTP call per attempt using [`reqwest`]. Timeouts and
//! retries are not handled here; see [`crate::attempt`] and
//! [`crate::retry`].

use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Default base URL of the public Gemini API.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com";

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
pub struct GenAiApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the Gemini REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum GenAiApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The API returned a non-2xx status code.
    #[error("Gemini API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

impl GenAiApi {
    /// Create a new API client.
    ///
    /// * `api_url` - Base HTTP URL, e.g. [`DEFAULT_API_URL`].
    /// * `api_key` - Key sent in the `x-goog-api-key` header.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Base HTTP URL this client targets.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Full URL of the `generateContent` method for `model`.
    pub fn generate_url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_url, model)
    }

    /// Run one `generateContent` call.
    ///
    /// Dropping the returned future aborts the underlying HTTP request.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, GenAiApiError> {
        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`GenAiApiError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, GenAiApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(GenAiApiError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, GenAiApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
