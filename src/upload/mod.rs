//! Post-write hook for uploaded files carrying generation metadata

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::metadata::embed;
use crate::MetaResult;

/// What the hook did to a stored upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// A metadata chunk was added and the file rewritten
    Embedded { added_bytes: usize },
    /// The file does not have a `.png` extension
    SkippedNotPng,
    /// No metadata payload came with the upload
    SkippedNoMetadata,
    /// The payload was not valid JSON
    InvalidPayload(String),
    /// Embedding degraded to a no-op; the stored bytes were left alone
    Unchanged,
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("png"))
}

/// Embed an upload's metadata payload into the file already written at `path`.
///
/// Meant to run once, after the upload is durably stored. Only I/O errors
/// are returned; everything about the payload or the image itself degrades
/// to an outcome that leaves the stored file as it was. The rewrite is a
/// plain overwrite, so a crash midway can lose the file's metadata.
pub fn apply_upload_metadata(path: &Path, metadata_json: Option<&str>) -> MetaResult<UploadOutcome> {
    if !has_png_extension(path) {
        return Ok(UploadOutcome::SkippedNotPng);
    }

    let Some(payload) = metadata_json.map(str::trim).filter(|p| !p.is_empty()) else {
        return Ok(UploadOutcome::SkippedNoMetadata);
    };

    let metadata: Value = match serde_json::from_str(payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Ignoring upload metadata that is not valid JSON"
            );
            return Ok(UploadOutcome::InvalidPayload(err.to_string()));
        }
    };

    let original = fs::read(path)?;
    match embed(&original, Some(&metadata)) {
        Cow::Owned(embedded) => {
            fs::write(path, &embedded)?;
            let added_bytes = embedded.len() - original.len();
            tracing::debug!(path = %path.display(), added_bytes, "Rewrote upload with metadata");
            Ok(UploadOutcome::Embedded { added_bytes })
        }
        Cow::Borrowed(_) => Ok(UploadOutcome::Unchanged),
    }
}
