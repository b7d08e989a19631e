//! Shared test double for dispatcher integration tests.
//!
//! [`ScriptedModel`] plays back a queue of [`Step`]s, one per call, and
//! falls back to a default step once the queue is drained. It records the
//! instruction and start instant of every call and the peak number of
//! concurrent calls.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use booth_genai::messages::{
    Blob, Candidate, Content, GenerateContentRequest, GenerateContentResponse, Part,
};
use booth_genai::model::{ImageModel, ModelError};
use tokio::time::Instant;

/// What a single call does after its delay.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Valid single-candidate reply with this base64 payload.
    Image(String),
    /// Reply with an empty candidate list.
    NoCandidates,
    /// Reply whose candidate has content but no parts.
    NoParts,
    /// Transport-level failure.
    Transport,
    /// Non-2xx HTTP status.
    Status(u16),
    /// Never settles.
    Hang,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub delay: Duration,
    pub reply: Reply,
}

impl Step {
    pub fn now(reply: Reply) -> Self {
        Self {
            delay: Duration::ZERO,
            reply,
        }
    }

    pub fn after(delay: Duration, reply: Reply) -> Self {
        Self { delay, reply }
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub instruction: String,
    pub at: Instant,
}

pub struct ScriptedModel {
    script: Mutex<VecDeque<Step>>,
    default: Step,
    calls: Mutex<Vec<Call>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl ScriptedModel {
    pub fn new(default: Step) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default,
            calls: Mutex::new(Vec::new()),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }

    pub fn with_script(default: Step, script: impl IntoIterator<Item = Step>) -> Self {
        let model = Self::new(default);
        model.script.lock().unwrap().extend(script);
        model
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Instructions of every call, in start order.
    pub fn started(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.instruction).collect()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn next_step(&self) -> Step {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.default.clone())
    }
}

/// Decrements the active-call gauge even when the call future is dropped.
struct Active<'a>(&'a AtomicUsize);

impl Drop for Active<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ImageModel for ScriptedModel {
    async fn generate_content(
        &self,
        _model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ModelError> {
        let instruction = instruction_of(request);
        self.calls.lock().unwrap().push(Call {
            instruction,
            at: Instant::now(),
        });

        let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now_active, Ordering::SeqCst);
        let _active = Active(&self.active);

        let step = self.next_step();
        tokio::time::sleep(step.delay).await;

        match step.reply {
            Reply::Image(data) => Ok(image_response(&data)),
            Reply::NoCandidates => Ok(GenerateContentResponse {
                candidates: Some(Vec::new()),
                prompt_feedback: None,
            }),
            Reply::NoParts => Ok(GenerateContentResponse {
                candidates: Some(vec![Candidate {
                    content: Some(Content {
                        role: Some("model".into()),
                        parts: None,
                    }),
                    finish_reason: Some("SAFETY".into()),
                }]),
                prompt_feedback: None,
            }),
            Reply::Transport => Err(ModelError::Transport("connection reset".into())),
            Reply::Status(status) => Err(ModelError::Status {
                status,
                body: "rejected".into(),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn image_response(data: &str) -> GenerateContentResponse {
    GenerateContentResponse {
        candidates: Some(vec![Candidate {
            content: Some(Content {
                role: Some("model".into()),
                parts: Some(vec![Part {
                    inline_data: Some(Blob {
                        mime_type: "image/png".into(),
                        data: data.into(),
                    }),
                    ..Default::default()
                }]),
            }),
            finish_reason: Some("STOP".into()),
        }]),
        prompt_feedback: None,
    }
}

fn instruction_of(request: &GenerateContentRequest) -> String {
    request
        .contents
        .iter()
        .filter_map(|c| c.parts.as_ref())
        .flatten()
        .find_map(|p| p.text.clone())
        .unwrap_or_default()
}
