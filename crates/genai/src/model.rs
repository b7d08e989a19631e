//! The remote-call capability the dispatcher depends on.
//!
//! [`ImageModel`] is the only seam between the dispatcher and the network.
//! [`GenAiApi`] implements it for production; tests substitute scripted
//! doubles.

use async_trait::async_trait;

use crate::api::{GenAiApi, GenAiApiError};
use crate::messages::{GenerateContentRequest, GenerateContentResponse};

/// Failure of one remote call, before response validation.
///
/// The retry loop treats every variant as transient.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Network, DNS, TLS, or body decoding failure.
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The endpoint answered with a non-2xx status.
    #[error("Endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The request could not be built at all (bad URL, bad header value).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<GenAiApiError> for ModelError {
    fn from(err: GenAiApiError) -> Self {
        match err {
            GenAiApiError::Request(e) if e.is_builder() => {
                ModelError::InvalidRequest(e.to_string())
            }
            GenAiApiError::Request(e) => ModelError::Transport(e.to_string()),
            GenAiApiError::ApiError { status, body } => ModelError::Status { status, body },
        }
    }
}

/// A remote model that turns a `generateContent` request into a reply.
///
/// Implementations must be cancel-safe: the dispatcher drops the returned
/// future when the attempt times out or the job is cancelled.
#[async_trait]
pub trait ImageModel: Send + Sync {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError>;
}

#[async_trait]
impl ImageModel for GenAiApi {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError> {
        Ok(GenAiApi::generate_content(self, model, request).await?)
    }
}
