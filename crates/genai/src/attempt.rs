//! One timeout-bounded attempt at a remote generation call.
//!
//! The remote call, the attempt deadline, and the job's cancellation token
//! race inside a single `select!`. Whichever settles first decides the
//! attempt; the others are dropped, which for [`GenAiApi`](crate::api::GenAiApi)
//! also aborts the HTTP request.

use std::time::Duration;

use booth_core::image::ImageArtifact;
use tokio::time::Instant;

use crate::job::ImageJob;
use crate::messages::{extract_image, GenerateContentRequest, ResponseError};
use crate::model::{ImageModel, ModelError};

/// Why an attempt did not produce an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttemptError {
    #[error("timeout after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Response(#[from] ResponseError),
}

/// Result of a single attempt, matched on by the retry loop.
///
/// Any failure other than cancellation is retryable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(ImageArtifact),
    Retryable(AttemptError),
    Cancelled,
}

/// Run attempt number `attempt` (0-based) of `job` against `model`.
///
/// Returns [`AttemptOutcome::Cancelled`] without calling the model if the
/// job is already cancelled.
pub async fn run_attempt(
    model: &dyn ImageModel,
    job: &ImageJob,
    request: &GenerateContentRequest,
    timeout: Duration,
    attempt: u32,
) -> AttemptOutcome {
    if job.is_cancelled() {
        return AttemptOutcome::Cancelled;
    }

    let started = Instant::now();
    tracing::debug!(job_id = %job.id(), attempt = attempt + 1, "Starting generation attempt");

    let reply = tokio::select! {
        biased;
        _ = job.cancelled() => return AttemptOutcome::Cancelled,
        result = model.generate_content(&job.request().model, request) => {
            result.map_err(AttemptError::from)
        }
        _ = tokio::time::sleep(timeout) => Err(AttemptError::Timeout(timeout)),
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;

    let response = match reply {
        Ok(response) => response,
        Err(e) => return AttemptOutcome::Retryable(e),
    };

    match extract_image(&response) {
        Ok(artifact) => {
            tracing::debug!(
                job_id = %job.id(),
                attempt = attempt + 1,
                elapsed_ms,
                mime_type = %artifact.mime_type,
                "Generation attempt produced an image",
            );
            AttemptOutcome::Success(artifact)
        }
        Err(e) => {
            if matches!(e, ResponseError::NoContent { .. }) {
                let raw = serde_json::to_string(&response)
                    .unwrap_or_else(|_| "<unserializable response>".to_string());
                tracing::error!(
                    job_id = %job.id(),
                    attempt = attempt + 1,
                    response = %raw,
                    "Response blocked or malformed",
                );
            }
            AttemptOutcome::Retryable(e.into())
        }
    }
}
