//! Embedding and extraction of generation metadata in `tEXt` chunks

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::png::{
    build_text_chunk, first_chunk_end, splice_chunk, split_text, ChunkRef, ChunkScanner, ScanEnd,
    CHUNK_OVERHEAD, TEXT_CHUNK,
};
use crate::utils::{decode_latin1, encode_latin1, is_png_signature};
use crate::{MetaError, MetaResult};

/// Keyword reserved for the metadata text chunk
pub const PARAMETERS_KEYWORD: &str = "parameters";

/// Build the complete `parameters` text chunk for an already serialized payload
pub fn build_parameters_chunk(json: &str) -> MetaResult<Vec<u8>> {
    build_text_chunk(PARAMETERS_KEYWORD.as_bytes(), &encode_latin1(json))
}

/// Embed `metadata` as a `parameters` text chunk right after IHDR.
///
/// Returns the input untouched when there is nothing to embed (`None`,
/// `null` or an empty object), when the input is not a PNG, or when
/// embedding fails for any reason; failures are logged, never returned.
/// Otherwise the result is a new buffer exactly one chunk longer.
///
/// Calling this twice adds a second `parameters` chunk rather than
/// replacing the first. Each new chunk lands ahead of the older ones, so
/// [`extract`] sees the most recent payload.
pub fn embed<'a, T>(bytes: &'a [u8], metadata: Option<&T>) -> Cow<'a, [u8]>
where
    T: Serialize + ?Sized,
{
    let Some(metadata) = metadata else {
        return Cow::Borrowed(bytes);
    };

    if !is_png_signature(bytes) {
        tracing::debug!(input_len = bytes.len(), "not a PNG, skipping metadata embedding");
        return Cow::Borrowed(bytes);
    }

    match try_embed(bytes, metadata) {
        Ok(Some(embedded)) => Cow::Owned(embedded),
        Ok(None) => Cow::Borrowed(bytes),
        Err(err) => {
            tracing::warn!(
                error = %err,
                input_len = bytes.len(),
                "Failed to embed generation metadata, keeping original bytes"
            );
            Cow::Borrowed(bytes)
        }
    }
}

/// The embedding pipeline with its failures surfaced.
///
/// `Ok(None)` means the metadata was empty and nothing needed inserting.
pub fn try_embed<T>(bytes: &[u8], metadata: &T) -> MetaResult<Option<Vec<u8>>>
where
    T: Serialize + ?Sized,
{
    if !is_png_signature(bytes) {
        return Err(MetaError::NotAPng);
    }

    let json = serde_json::to_string(metadata)?;
    if json == "null" || json == "{}" {
        return Ok(None);
    }

    let chunk = build_parameters_chunk(&json)?;
    let insert_at = first_chunk_end(bytes)?;
    let embedded = splice_chunk(bytes, insert_at, &chunk)?;

    tracing::debug!(
        insert_at,
        chunk_len = chunk.len(),
        data_len = chunk.len() - CHUNK_OVERHEAD,
        "Embedded generation metadata"
    );

    Ok(Some(embedded))
}

/// Locate the first `tEXt` chunk keyed `parameters`, without parsing it
pub fn find_parameters_chunk(bytes: &[u8]) -> Option<ChunkRef> {
    if !is_png_signature(bytes) {
        return None;
    }

    let mut scanner = ChunkScanner::new(bytes);
    let found = scanner.by_ref().find(|chunk| {
        chunk.is_type(TEXT_CHUNK)
            && split_text(chunk.data_in(bytes))
                .is_some_and(|(keyword, _)| keyword == PARAMETERS_KEYWORD.as_bytes())
    });

    if found.is_none() {
        if let Some(ScanEnd::Malformed { offset }) = scanner.end() {
            tracing::debug!(offset, "Chunk stream ended early without metadata");
        }
    }

    found
}

/// Recover the metadata embedded by [`embed`].
///
/// The first `parameters` chunk wins. If its payload is not valid JSON the
/// result is `None`; later chunks are not consulted. CRCs are not checked.
pub fn extract(bytes: &[u8]) -> Option<Value> {
    let chunk = find_parameters_chunk(bytes)?;
    let (_, text) = split_text(chunk.data_in(bytes))?;

    match serde_json::from_str(&decode_latin1(text)) {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::debug!(
                error = %err,
                offset = chunk.offset,
                "Metadata chunk does not hold valid JSON"
            );
            None
        }
    }
}

/// [`extract`] into a concrete type; `None` if the payload does not fit `T`
pub fn extract_as<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    serde_json::from_value(extract(bytes)?).ok()
}
