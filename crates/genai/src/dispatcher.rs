//! Bounded retry dispatcher for image-generation jobs.
//!
//! [`Dispatcher`] owns the concurrency limiter, the remote model handle,
//! and the event channel. Callers construct one, clone the handle where
//! needed, and [`submit`](Dispatcher::submit) jobs. At most
//! `max_concurrent` jobs execute at once; the rest wait in arrival order.
//!
//! A job resolves to:
//! - `Ok(Some(artifact))` when an attempt produced an image,
//! - `Ok(None)` when it was cancelled, whatever stage it had reached,
//! - `Err(DispatchError)` when every permitted attempt failed.

use std::sync::Arc;

use booth_core::dispatch::DispatchConfig;
use booth_core::error::CoreError;
use booth_core::image::ImageArtifact;
use tokio::sync::broadcast;

use crate::attempt::AttemptError;
use crate::events::{DispatchEvent, DispatchEventKind};
use crate::job::ImageJob;
use crate::limiter::{ConcurrencyLimiter, LimiterClosed};
use crate::model::ImageModel;
use crate::retry::{run_with_retry, JobResolution};

/// Broadcast channel capacity for dispatch events.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors surfaced to the submitter of a job.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The job was rejected before it was queued.
    #[error("Invalid job: {0}")]
    InvalidJob(#[from] CoreError),

    /// Every permitted attempt failed; carries the final attempt's error.
    #[error("Generation failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: AttemptError,
    },

    /// The dispatcher was closed before the job got a slot.
    #[error(transparent)]
    Closed(#[from] LimiterClosed),
}

/// Shared handle to a bounded retry dispatcher. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    model: Arc<dyn ImageModel>,
    config: DispatchConfig,
    limiter: ConcurrencyLimiter,
    event_tx: broadcast::Sender<DispatchEvent>,
}

impl Dispatcher {
    /// Create a dispatcher with the default limits.
    pub fn new(model: Arc<dyn ImageModel>) -> Self {
        Self::with_config(model, DispatchConfig::default())
    }

    pub fn with_config(model: Arc<dyn ImageModel>, config: DispatchConfig) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let limiter = ConcurrencyLimiter::new(config.max_concurrent);
        Self {
            inner: Arc::new(Inner {
                model,
                config,
                limiter,
                event_tx,
            }),
        }
    }

    pub fn config(&self) -> &DispatchConfig {
        &self.inner.config
    }

    /// Subscribe to job lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<DispatchEvent> {
        self.inner.event_tx.subscribe()
    }

    /// Number of jobs currently executing.
    pub fn in_flight(&self) -> usize {
        self.inner.limiter.in_flight()
    }

    /// Number of jobs waiting for a slot.
    pub fn waiting(&self) -> usize {
        self.inner.limiter.waiting()
    }

    /// Stop admitting jobs. Waiting and future submissions fail with
    /// [`DispatchError::Closed`]; running jobs finish normally.
    pub fn close(&self) {
        tracing::info!("Dispatcher closed");
        self.inner.limiter.close();
    }

    /// Submit a job and wait for its resolution.
    ///
    /// Arrival order for FIFO purposes is the order in which the returned
    /// futures are first polled.
    pub async fn submit(&self, job: ImageJob) -> Result<Option<ImageArtifact>, DispatchError> {
        if job.is_cancelled() {
            self.emit(&job, DispatchEventKind::Cancelled { attempts: 0 });
            return Ok(None);
        }

        job.request().validate()?;

        if self.inner.limiter.is_saturated() {
            tracing::debug!(
                job_id = %job.id(),
                waiting = self.waiting(),
                "Concurrency budget exhausted, job queued",
            );
            self.emit(&job, DispatchEventKind::Queued);
        }

        let slot = tokio::select! {
            biased;
            _ = job.cancelled() => {
                tracing::info!(job_id = %job.id(), "Job cancelled while queued");
                self.emit(&job, DispatchEventKind::Cancelled { attempts: 0 });
                return Ok(None);
            }
            slot = self.inner.limiter.acquire() => slot?,
        };

        tracing::info!(
            job_id = %job.id(),
            model = %job.request().model,
            in_flight = self.in_flight(),
            "Job started",
        );
        self.emit(&job, DispatchEventKind::Started);

        let resolution = run_with_retry(
            self.inner.model.as_ref(),
            &job,
            &self.inner.config,
            &self.inner.event_tx,
        )
        .await;
        drop(slot);

        match resolution {
            JobResolution::Succeeded { artifact, .. } => Ok(Some(artifact)),
            JobResolution::Cancelled { .. } => Ok(None),
            JobResolution::Exhausted { attempts, error } => Err(DispatchError::Exhausted {
                attempts,
                source: error,
            }),
        }
    }

    /// Submit a job on a new Tokio task.
    ///
    /// The job joins the queue when the task is first polled, so jobs
    /// spawned back to back keep their relative order only if each task
    /// starts before the next is spawned.
    pub fn spawn(
        &self,
        job: ImageJob,
    ) -> tokio::task::JoinHandle<Result<Option<ImageArtifact>, DispatchError>> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.submit(job).await })
    }

    fn emit(&self, job: &ImageJob, kind: DispatchEventKind) {
        let _ = self.inner.event_tx.send(DispatchEvent::now(job.id(), kind));
    }
}
