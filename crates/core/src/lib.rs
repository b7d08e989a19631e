//! Shared domain types for the photo booth generation pipeline.
//!
//! Pure types, constants, and validation used by the dispatcher crate and
//! the worker binary. Has no async or network dependencies.

pub mod dispatch;
pub mod error;
pub mod image;
pub mod request;
pub mod types;
