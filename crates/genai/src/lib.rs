//! Client and dispatcher for the Gemini image-generation endpoint.
//!
//! Provides the `generateContent` wire types, a reqwest-based HTTP
//! client, the [`model::ImageModel`] seam used for test doubles, and the
//! [`dispatcher::Dispatcher`] that bounds concurrency, times out attempts,
//! and retries transient failures with exponential backoff.

pub mod api;
pub mod attempt;
pub mod dispatcher;
pub mod events;
pub mod job;
pub mod limiter;
pub mod messages;
pub mod model;
pub mod retry;
