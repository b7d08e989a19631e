//! Encoding of input photos and writing of generated images.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use booth_core::image::{ImageArtifact, InlineImage};

/// Maximum number of characters of an instruction used in a file name.
const MAX_SLUG_LEN: usize = 40;

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Generated payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Read a photo from disk and wrap it as a JPEG inline image.
pub async fn load_photo(path: &Path) -> Result<InlineImage, OutputError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(InlineImage::jpeg(BASE64.encode(bytes)))
}

/// Lowercase, dash-separated rendering of `text` suitable for a file name.
pub fn slugify(text: &str) -> String {
    let mut slug = String::new();
    for c in text.chars() {
        if slug.len() >= MAX_SLUG_LEN {
            break;
        }
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug.to_string()
    }
}

/// File name for the artifact of the `index`-th instruction.
pub fn artifact_file_name(index: usize, instruction: &str) -> String {
    format!("{:02}-{}.png", index + 1, slugify(instruction))
}

/// Decode `artifact` and write it into `dir` (created if missing).
pub async fn write_artifact(
    dir: &Path,
    file_name: &str,
    artifact: &ImageArtifact,
) -> Result<PathBuf, OutputError> {
    let bytes = BASE64.decode(artifact.data.as_bytes())?;

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|source| OutputError::Io {
            path: path.clone(),
            source,
        })?;
    Ok(path)
}
