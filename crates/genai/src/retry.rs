//! Retry loop with exponential backoff for a single job.
//!
//! Drives `Attempting -> RetryWait -> Attempting ...` until the job ends in
//! one of the terminal states of [`JobResolution`]. Attempts are strictly
//! sequential, and the job's cancellation token is honoured before each
//! attempt, during it, and during the backoff sleep.

use booth_core::dispatch::DispatchConfig;
use booth_core::image::ImageArtifact;
use tokio::sync::broadcast;

use crate::attempt::{run_attempt, AttemptError, AttemptOutcome};
use crate::events::{DispatchEvent, DispatchEventKind};
use crate::job::ImageJob;
use crate::messages::GenerateContentRequest;
use crate::model::ImageModel;

/// Terminal state of a job. `attempts` counts attempts that reached the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobResolution {
    Succeeded {
        artifact: ImageArtifact,
        attempts: u32,
    },
    Cancelled {
        attempts: u32,
    },
    /// The final permitted attempt failed; `error` is that attempt's error.
    Exhausted {
        attempts: u32,
        error: AttemptError,
    },
}

impl JobResolution {
    fn event_kind(&self) -> DispatchEventKind {
        match self {
            JobResolution::Succeeded { attempts, .. } => DispatchEventKind::Succeeded {
                attempts: *attempts,
            },
            JobResolution::Cancelled { attempts } => DispatchEventKind::Cancelled {
                attempts: *attempts,
            },
            JobResolution::Exhausted { attempts, error } => DispatchEventKind::Exhausted {
                attempts: *attempts,
                error: error.to_string(),
            },
        }
    }
}

/// Run `job` against `model` until it succeeds, is cancelled, or runs out
/// of attempts.
///
/// Emits an [`DispatchEventKind::AttemptFailed`] event and a warning before
/// every backoff wait, and one terminal event on return.
pub async fn run_with_retry(
    model: &dyn ImageModel,
    job: &ImageJob,
    config: &DispatchConfig,
    events: &broadcast::Sender<DispatchEvent>,
) -> JobResolution {
    let resolution = retry_loop(model, job, config, events).await;
    let _ = events.send(DispatchEvent::now(job.id(), resolution.event_kind()));
    resolution
}

async fn retry_loop(
    model: &dyn ImageModel,
    job: &ImageJob,
    config: &DispatchConfig,
    events: &broadcast::Sender<DispatchEvent>,
) -> JobResolution {
    let request = GenerateContentRequest::image_only(
        &job.request().instruction,
        job.request().input_image.as_ref(),
    );
    let mut attempt = 0u32;

    loop {
        if job.is_cancelled() {
            tracing::info!(job_id = %job.id(), attempts = attempt, "Job cancelled");
            return JobResolution::Cancelled { attempts: attempt };
        }

        let outcome = run_attempt(model, job, &request, config.attempt_timeout, attempt).await;
        let attempts = attempt + 1;

        let error = match outcome {
            AttemptOutcome::Success(artifact) => {
                tracing::info!(job_id = %job.id(), attempts, "Job succeeded");
                return JobResolution::Succeeded { artifact, attempts };
            }
            AttemptOutcome::Cancelled => {
                tracing::info!(job_id = %job.id(), attempts, "Job cancelled during attempt");
                return JobResolution::Cancelled { attempts };
            }
            AttemptOutcome::Retryable(error) => error,
        };

        if job.is_cancelled() {
            tracing::info!(job_id = %job.id(), attempts, "Job cancelled after failed attempt");
            return JobResolution::Cancelled { attempts };
        }

        if config.is_final_attempt(attempt) {
            tracing::error!(
                job_id = %job.id(),
                attempts,
                error = %error,
                "Job failed after all retries",
            );
            return JobResolution::Exhausted { attempts, error };
        }

        let delay = config.backoff_delay(attempt);
        let delay_ms = delay.as_millis() as u64;
        tracing::warn!(
            job_id = %job.id(),
            error = %error,
            delay_ms,
            "Attempt {attempts} failed, retrying after {delay_ms}ms",
        );
        let _ = events.send(DispatchEvent::now(
            job.id(),
            DispatchEventKind::AttemptFailed {
                attempt: attempts,
                delay_ms,
                error: error.to_string(),
            },
        ));

        // Wait before the next attempt, respecting cancellation.
        tokio::select! {
            _ = job.cancelled() => {
                tracing::info!(job_id = %job.id(), attempts, "Job cancelled during backoff");
                return JobResolution::Cancelled { attempts };
            }
            _ = tokio::time::sleep(delay) => {}
        }

        attempt += 1;
    }
}
