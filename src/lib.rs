//! # PNG Generation Parameters
//!
//! This library embeds and recovers generation metadata (prompts, model ids,
//! seeds, ...) inside PNG files as a `tEXt` chunk keyed `parameters`.
//!
//! The chunk is spliced in directly after IHDR so every PNG reader keeps
//! decoding the image unchanged. Embedding is best effort: anything that
//! goes wrong leaves the original bytes untouched.

// Public API exports
pub mod cli;
pub mod metadata;
pub mod png;
pub mod upload;
pub mod utils;

pub use metadata::{embed, extract, extract_as, try_embed, PARAMETERS_KEYWORD};
pub use upload::{apply_upload_metadata, UploadOutcome};

/// Result type alias for codec operations
pub type MetaResult<T> = Result<T, MetaError>;

/// Error type for the metadata codec
#[derive(Debug, thiserror::Error)]
pub enum MetaError {
    #[error("Not a PNG file")]
    NotAPng,

    #[error("Malformed chunk stream at offset {offset}: {reason}")]
    MalformedChunkStream { offset: usize, reason: String },

    #[error("Metadata serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Chunk data of {0} bytes does not fit a PNG length field")]
    ChunkTooLarge(usize),

    #[error("File error: {0}")]
    Io(#[from] std::io::Error),
}

impl MetaError {
    pub(crate) fn malformed(offset: usize, reason: impl Into<String>) -> Self {
        MetaError::MalformedChunkStream {
            offset,
            reason: reason.into(),
        }
    }
}
