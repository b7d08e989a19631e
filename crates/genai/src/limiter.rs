//! FIFO concurrency limiter for generation jobs.
//!
//! Backed by a fair [`tokio::sync::Semaphore`]: waiters are granted slots
//! in the order they started waiting. A [`Slot`] returns its permit when
//! dropped, so the in-flight count is released exactly once whether the
//! job succeeds, fails, is cancelled, or its future is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Returned when the limiter has been closed and admits no more jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Dispatcher is closed")]
pub struct LimiterClosed;

/// Bounds the number of jobs executing at once.
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    capacity: usize,
    waiting: AtomicUsize,
}

/// Permission to execute one job. Frees the slot on drop.
#[derive(Debug)]
pub struct Slot {
    _permit: OwnedSemaphorePermit,
}

/// Decrements the waiting gauge on drop, including when the wait is abandoned.
struct WaitGuard<'a>(&'a AtomicUsize);

impl Drop for WaitGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConcurrencyLimiter {
    /// Create a limiter admitting `capacity` jobs at once (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
            waiting: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs currently holding a slot.
    pub fn in_flight(&self) -> usize {
        self.capacity.saturating_sub(self.semaphore.available_permits())
    }

    /// Number of jobs waiting for a slot.
    pub fn waiting(&self) -> usize {
        self.waiting.load(Ordering::SeqCst)
    }

    /// Whether a call to [`acquire`](Self::acquire) would have to wait.
    pub fn is_saturated(&self) -> bool {
        self.semaphore.available_permits() == 0
    }

    /// Wait for a free slot, in arrival order.
    ///
    /// Cancel-safe: dropping the future removes the caller from the queue
    /// without consuming a slot.
    pub async fn acquire(&self) -> Result<Slot, LimiterClosed> {
        self.waiting.fetch_add(1, Ordering::SeqCst);
        let _guard = WaitGuard(&self.waiting);

        let permit = Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|_| LimiterClosed)?;
        Ok(Slot { _permit: permit })
    }

    /// Stop admitting jobs. Current waiters and later callers get
    /// [`LimiterClosed`]; slots already held are unaffected.
    pub fn close(&self) {
        self.semaphore.close();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}
