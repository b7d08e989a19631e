//! The caller-facing description of one image-generation request.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::image::InlineImage;

/// Maximum length of a model identifier.
const MAX_MODEL_LEN: usize = 128;

/// Maximum length of an instruction, in characters.
const MAX_INSTRUCTION_LEN: usize = 16_384;

/// What to generate: target model, instruction, and an optional input photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub model: String,
    pub instruction: String,
    pub input_image: Option<InlineImage>,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, instruction: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instruction: instruction.into(),
            input_image: None,
        }
    }

    pub fn with_input_image(mut self, image: InlineImage) -> Self {
        self.input_image = Some(image);
        self
    }

    /// Check the request before it is queued.
    ///
    /// Rules:
    /// - Model must be non-empty, at most `MAX_MODEL_LEN` characters, and
    ///   contain no whitespace or `/` (it is spliced into a URL path).
    /// - Instruction must be non-blank and at most `MAX_INSTRUCTION_LEN`
    ///   characters.
    /// - An input image, when present, must carry a payload.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_model(&self.model)?;

        if self.instruction.trim().is_empty() {
            return Err(CoreError::Validation(
                "Instruction must not be empty".to_string(),
            ));
        }
        if self.instruction.chars().count() > MAX_INSTRUCTION_LEN {
            return Err(CoreError::Validation(format!(
                "Instruction must not exceed {MAX_INSTRUCTION_LEN} characters"
            )));
        }

        if let Some(image) = &self.input_image {
            if image.data.is_empty() {
                return Err(CoreError::InvalidImage("empty payload".to_string()));
            }
        }
        Ok(())
    }
}

fn validate_model(model: &str) -> Result<(), CoreError> {
    if model.is_empty() {
        return Err(CoreError::Validation("Model must not be empty".to_string()));
    }
    if model.len() > MAX_MODEL_LEN {
        return Err(CoreError::Validation(format!(
            "Model must not exceed {MAX_MODEL_LEN} characters"
        )));
    }
    if model.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(CoreError::Validation(
            "Model may not contain whitespace or '/'".to_string(),
        ));
    }
    Ok(())
}
