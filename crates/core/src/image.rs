//! Base64 image payloads exchanged with the generation endpoint.
//!
//! Input photos arrive from the capture side as `data:` URLs; generated
//! images go back out the same way. Payloads stay base64-encoded end to
//! end, this module never decodes them.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// MIME type declared for every input photo sent to the model.
pub const INPUT_MIME_TYPE: &str = "image/jpeg";

/// Prefix of every data URL handed back to callers.
pub const ARTIFACT_DATA_URL_PREFIX: &str = "data:image/png;base64,";

// ---------------------------------------------------------------------------
// InlineImage
// ---------------------------------------------------------------------------

/// A base64-encoded image plus its declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload without any `data:` prefix.
    pub data: String,
}

impl InlineImage {
    /// Wrap an already base64-encoded JPEG payload.
    pub fn jpeg(data: impl Into<String>) -> Self {
        Self {
            mime_type: INPUT_MIME_TYPE.to_string(),
            data: data.into(),
        }
    }

    /// Parse a `data:<mime>;base64,<payload>` URL.
    ///
    /// The payload is everything after the first comma. The MIME type is
    /// always reported as JPEG since that is what the capture side encodes.
    pub fn from_data_url(url: &str) -> Result<Self, CoreError> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| CoreError::InvalidImage("missing `data:` scheme".to_string()))?;
        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| CoreError::InvalidImage("missing `,` separator".to_string()))?;
        if !header.ends_with(";base64") {
            return Err(CoreError::InvalidImage(format!(
                "expected a base64 data URL, got header `{header}`"
            )));
        }
        if payload.is_empty() {
            return Err(CoreError::InvalidImage("empty payload".to_string()));
        }
        Ok(Self::jpeg(payload))
    }

    /// Render back into a data URL using the declared MIME type.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

// ---------------------------------------------------------------------------
// ImageArtifact
// ---------------------------------------------------------------------------

/// A successfully generated image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageArtifact {
    /// MIME type reported by the endpoint, kept for diagnostics.
    pub mime_type: String,
    /// Base64 payload without any `data:` prefix.
    pub data: String,
}

impl ImageArtifact {
    /// Data URL delivered to callers. Always declared as PNG.
    pub fn data_url(&self) -> String {
        format!("{ARTIFACT_DATA_URL_PREFIX}{}", self.data)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
