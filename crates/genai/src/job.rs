//! A single submitted generation job.

use booth_core::image::InlineImage;
use booth_core::request::GenerationRequest;
use booth_core::types::JobId;
use tokio_util::sync::CancellationToken;

/// An immutable generation job.
///
/// Created by the caller, consumed by [`Dispatcher::submit`](crate::dispatcher::Dispatcher::submit).
/// Cancelling the attached token at any point resolves the job to "no
/// result" without error.
#[derive(Debug, Clone)]
pub struct ImageJob {
    id: JobId,
    request: GenerationRequest,
    cancel: Option<CancellationToken>,
}

impl ImageJob {
    pub fn new(request: GenerationRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            request,
            cancel: None,
        }
    }

    /// Shorthand for a job with model, instruction, and optional photo.
    pub fn with_parts(
        model: impl Into<String>,
        instruction: impl Into<String>,
        input_image: Option<InlineImage>,
    ) -> Self {
        let mut request = GenerationRequest::new(model, instruction);
        request.input_image = input_image;
        Self::new(request)
    }

    /// Attach a cancellation token.
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn request(&self) -> &GenerationRequest {
        &self.request
    }

    pub fn cancel_token(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Whether the caller has already cancelled this job.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled)
    }

    /// Resolves once the job is cancelled; never resolves without a token.
    pub async fn cancelled(&self) {
        match &self.cancel {
            Some(token) => token.cancelled().await,
            None => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_jobs_get_distinct_ids() {
        let a = ImageJob::with_parts("m", "x", None);
        let b = ImageJob::with_parts("m", "x", None);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn job_without_token_is_never_cancelled() {
        let job = ImageJob::with_parts("m", "x", None);
        assert!(!job.is_cancelled());
        assert!(job.cancel_token().is_none());
    }

    #[test]
    fn job_observes_token_cancellation() {
        let token = CancellationToken::new();
        let job = ImageJob::with_parts("m", "x", None).with_cancel(token.clone());
        assert!(!job.is_cancelled());
        token.cancel();
        assert!(job.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_after_cancel() {
        let token = CancellationToken::new();
        let job = ImageJob::with_parts("m", "x", None).with_cancel(token.clone());
        token.cancel();
        job.cancelled().await;
    }
}
