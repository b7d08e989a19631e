//! Wire types for the Gemini `generateContent` endpoint.
//!
//! Requests carry one user turn with an optional inline photo and the
//! instruction text, asking for image output only. Responses are
//! deserialized leniently (every level optional) so that blocked or
//! truncated replies surface as a [`ResponseError`] from
//! [`extract_image`] rather than a JSON error.

use booth_core::image::{ImageArtifact, InlineImage, INPUT_MIME_TYPE};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared
// ---------------------------------------------------------------------------

/// One turn of the conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<Part>>,
}

/// A single piece of content: text or an inline binary blob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<Blob>,
}

/// Base64 binary payload with its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob {
    pub mime_type: String,
    pub data: String,
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// Output modalities the model may produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Modality {
    Text,
    Image,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_modalities: Vec<Modality>,
}

/// Body of `POST /v1beta/models/{model}:generateContent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateContentRequest {
    /// Build an image-only request: the photo part (if any) first, then the
    /// instruction text. The photo is always declared as JPEG.
    pub fn image_only(instruction: &str, input_image: Option<&InlineImage>) -> Self {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = input_image {
            parts.push(Part {
                inline_data: Some(Blob {
                    mime_type: INPUT_MIME_TYPE.to_string(),
                    data: image.data.clone(),
                }),
                ..Default::default()
            });
        }
        parts.push(Part {
            text: Some(instruction.to_string()),
            ..Default::default()
        });

        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: Some(parts),
            }],
            generation_config: GenerationConfig {
                response_modalities: vec![Modality::Image],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidates: Option<Vec<Candidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// One possible result for the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Present when the prompt itself was blocked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

/// Ways a transport-level success can still fail to yield an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResponseError {
    #[error("No candidates in response{}", reason_suffix(.block_reason))]
    NoCandidates { block_reason: Option<String> },

    #[error(
        "No content found in response, possibly due to safety filters{}",
        reason_suffix(.finish_reason)
    )]
    NoContent { finish_reason: Option<String> },

    #[error("No inline data found in response")]
    NoInlineImage,
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" ({r})"))
        .unwrap_or_default()
}

/// Pull the generated image out of the first candidate.
///
/// The first candidate must carry content with parts, and one of those
/// parts must carry inline data. Text parts are ignored.
pub fn extract_image(response: &GenerateContentResponse) -> Result<ImageArtifact, ResponseError> {
    let candidate = response
        .candidates
        .as_deref()
        .and_then(<[Candidate]>::first)
        .ok_or_else(|| ResponseError::NoCandidates {
            block_reason: response
                .prompt_feedback
                .as_ref()
                .and_then(|f| f.block_reason.clone()),
        })?;

    let parts = candidate
        .content
        .as_ref()
        .and_then(|c| c.parts.as_deref())
        .ok_or_else(|| ResponseError::NoContent {
            finish_reason: candidate.finish_reason.clone(),
        })?;

    let blob = parts
        .iter()
        .find_map(|p| p.inline_data.as_ref())
        .ok_or(ResponseError::NoInlineImage)?;

    Ok(ImageArtifact {
        mime_type: blob.mime_type.clone(),
        data: blob.data.clone(),
    })
}
