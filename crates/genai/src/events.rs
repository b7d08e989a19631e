//! Lifecycle events emitted by the dispatcher.
//!
//! Delivered over a [`tokio::sync::broadcast`] channel; call
//! [`Dispatcher::subscribe`](crate::dispatcher::Dispatcher::subscribe) to
//! receive them. Purely observational: a slow or missing subscriber never
//! affects job execution.

use booth_core::types::{JobId, Timestamp};
use serde::Serialize;

/// What happened to a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DispatchEventKind {
    /// The job is waiting for a concurrency slot.
    Queued,

    /// The job was granted a slot and its first attempt is starting.
    Started,

    /// An attempt failed and another will follow after `delay_ms`.
    AttemptFailed {
        /// 1-based ordinal of the failed attempt.
        attempt: u32,
        delay_ms: u64,
        error: String,
    },

    /// The job produced an image.
    Succeeded { attempts: u32 },

    /// The job was cancelled after `attempts` attempts.
    Cancelled { attempts: u32 },

    /// Every permitted attempt failed.
    Exhausted { attempts: u32, error: String },
}

/// A timestamped [`DispatchEventKind`] for one job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEvent {
    pub job_id: JobId,
    pub at: Timestamp,
    #[serde(flatten)]
    pub kind: DispatchEventKind,
}

impl DispatchEvent {
    pub fn now(job_id: JobId, kind: DispatchEventKind) -> Self {
        Self {
            job_id,
            at: chrono::Utc::now(),
            kind,
        }
    }

    /// Whether this is the last event the job will emit.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            DispatchEventKind::Succeeded { .. }
                | DispatchEventKind::Cancelled { .. }
                | DispatchEventKind::Exhausted { .. }
        )
    }
}
