//! PNG chunk assembly, splicing and inspection

pub mod parser;

use crate::utils::{chunk_crc, decode_latin1, is_png_signature, read_u32_be, PNG_SIGNATURE};
use crate::{MetaError, MetaResult};
pub use parser::{ChunkRef, ChunkScanner, ScanEnd};

/// Uncompressed Latin-1 text chunk type
pub const TEXT_CHUNK: &[u8; 4] = b"tEXt";

/// Bytes a chunk adds on top of its data: length, type and CRC fields
pub const CHUNK_OVERHEAD: usize = 12;

/// Assemble a complete chunk: length, type, data and CRC
pub fn build_chunk(chunk_type: &[u8; 4], data: &[u8]) -> MetaResult<Vec<u8>> {
    let length = u32::try_from(data.len()).map_err(|_| MetaError::ChunkTooLarge(data.len()))?;

    let mut chunk = Vec::with_capacity(CHUNK_OVERHEAD + data.len());
    chunk.extend_from_slice(&length.to_be_bytes());
    chunk.extend_from_slice(chunk_type);
    chunk.extend_from_slice(data);
    chunk.extend_from_slice(&chunk_crc(chunk_type, data).to_be_bytes());
    Ok(chunk)
}

/// Build a `tEXt` chunk from a keyword and already-encoded Latin-1 text
pub fn build_text_chunk(keyword: &[u8], text: &[u8]) -> MetaResult<Vec<u8>> {
    let mut data = Vec::with_capacity(keyword.len() + 1 + text.len());
    data.extend_from_slice(keyword);
    data.push(0); // Null separator
    data.extend_from_slice(text);
    build_chunk(TEXT_CHUNK, &data)
}

/// Split `tEXt` data at its first null byte into keyword and text
pub fn split_text(data: &[u8]) -> Option<(&[u8], &[u8])> {
    let nul = data.iter().position(|&b| b == 0)?;
    Some((&data[..nul], &data[nul + 1..]))
}

/// Offset just past the first chunk (IHDR in any valid PNG).
///
/// The chunk type is not checked; only its length field is trusted, and
/// the whole chunk must lie within `bytes`.
pub fn first_chunk_end(bytes: &[u8]) -> MetaResult<usize> {
    let offset = PNG_SIGNATURE.len();
    let length = read_u32_be(bytes, offset)
        .ok_or_else(|| MetaError::malformed(offset, "missing first chunk length"))?;

    match (offset + 4 + 4 + 4).checked_add(length as usize) {
        Some(end) if end <= bytes.len() => Ok(end),
        _ => Err(MetaError::malformed(
            offset,
            format!("first chunk of {length} bytes extends beyond file"),
        )),
    }
}

/// Copy `bytes` into a new buffer with `chunk` inserted at `at`
pub fn splice_chunk(bytes: &[u8], at: usize, chunk: &[u8]) -> MetaResult<Vec<u8>> {
    if at > bytes.len() {
        return Err(MetaError::malformed(at, "insertion point beyond end of file"));
    }

    let mut out = Vec::with_capacity(bytes.len() + chunk.len());
    out.extend_from_slice(&bytes[..at]);
    out.extend_from_slice(chunk);
    out.extend_from_slice(&bytes[at..]);
    Ok(out)
}

/// One line of a chunk listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSummary {
    pub offset: usize,
    pub chunk_type: String,
    pub length: u32,
    /// `None` when the CRC trailer is cut off
    pub crc_ok: Option<bool>,
    /// Keyword of a `tEXt` chunk
    pub keyword: Option<String>,
}

/// Chunk listing of a whole file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngSummary {
    pub total_len: usize,
    pub chunks: Vec<ChunkSummary>,
    pub end: ScanEnd,
}

impl PngSummary {
    /// Keywords of every `tEXt` chunk, in file order
    pub fn text_keywords(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().filter_map(|c| c.keyword.as_deref())
    }

    pub fn all_crcs_ok(&self) -> bool {
        self.chunks.iter().all(|c| c.crc_ok == Some(true))
    }
}

/// List every chunk with its CRC state.
///
/// Unlike metadata extraction this does look at CRCs, but only to report
/// them; a bad CRC does not stop the listing.
pub fn summarize(bytes: &[u8]) -> MetaResult<PngSummary> {
    if !is_png_signature(bytes) {
        return Err(MetaError::NotAPng);
    }

    let mut scanner = ChunkScanner::new(bytes);
    let chunks = scanner
        .by_ref()
        .map(|chunk| {
            let crc_ok = chunk
                .stored_crc(bytes)
                .map(|stored| stored == chunk.computed_crc(bytes));
            let keyword = if chunk.is_type(TEXT_CHUNK) {
                split_text(chunk.data_in(bytes)).map(|(keyword, _)| decode_latin1(keyword))
            } else {
                None
            };

            ChunkSummary {
                offset: chunk.offset,
                chunk_type: chunk.type_name(),
                length: chunk.length,
                crc_ok,
                keyword,
            }
        })
        .collect();

    Ok(PngSummary {
        total_len: bytes.len(),
        chunks,
        end: scanner.end().unwrap_or(ScanEnd::EndOfStream),
    })
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_build_chunk_layout() {
        let chunk = build_chunk(b"tEXt", b"a\0b").unwrap();
        assert_eq!(chunk.len(), CHUNK_OVERHEAD + 3);
        assert_eq!(&chunk[..4], &3u32.to_be_bytes());
        assert_eq!(&chunk[4..8], b"tEXt");
        assert_eq!(&chunk[8..11], b"a\0b");
        assert_eq!(&chunk[11..], &chunk_crc(b"tEXt", b"a\0b").to_be_bytes());
    }

    #[test]
    fn test_build_text_chunk() {
        let chunk = build_text_chunk(b"Comment", b"hi").unwrap();
        let mut expected = b"tEXtComment\0hi".to_vec();
        expected.extend_from_slice(&chunk_crc(b"tEXt", b"Comment\0hi").to_be_bytes());
        assert_eq!(chunk[4..].to_vec(), expected);
    }

    #[test]
    fn test_split_text() {
        assert_eq!(split_text(b"key\0value"), Some((&b"key"[..], &b"value"[..])));
        assert_eq!(split_text(b"key\0a\0b"), Some((&b"key"[..], &b"a\0b"[..])));
        assert_eq!(split_text(b"\0"), Some((&b""[..], &b""[..])));
        assert_eq!(split_text(b"no separator"), None);
    }

    #[test]
    fn test_first_chunk_end() {
        let png = minimal_rgba_png();
        assert_eq!(first_chunk_end(&png).unwrap(), 8 + 12 + 13);
    }

    #[test]
    fn test_first_chunk_end_rejects_truncation() {
        let png = minimal_rgba_png();
        assert!(matches!(
            first_chunk_end(&png[..30]),
            Err(MetaError::MalformedChunkStream { offset: 8, .. })
        ));
        assert!(first_chunk_end(&png[..10]).is_err());

        let mut garbage = PNG_SIGNATURE.to_vec();
        garbage.extend_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
        assert!(first_chunk_end(&garbage).is_err());
    }

    #[test]
    fn test_splice_chunk() {
        let spliced = splice_chunk(b"abcd", 2, b"XY").unwrap();
        assert_eq!(spliced, b"abXYcd");
        assert_eq!(splice_chunk(b"ab", 2, b"X").unwrap(), b"abX");
        assert!(splice_chunk(b"ab", 3, b"X").is_err());
    }

    #[test]
    fn test_summarize_reports_chunks_and_keywords() {
        let png = png_with_chunks_after_ihdr(&[build_text_chunk(b"Author", b"me").unwrap()]);
        let summary = summarize(&png).unwrap();

        let types: Vec<&str> = summary.chunks.iter().map(|c| c.chunk_type.as_str()).collect();
        assert_eq!(types, ["IHDR", "tEXt", "IDAT", "IEND"]);
        assert_eq!(summary.text_keywords().collect::<Vec<_>>(), ["Author"]);
        assert_eq!(summary.end, ScanEnd::EndOfStream);
        assert!(summary.all_crcs_ok());
    }

    #[test]
    fn test_summarize_flags_bad_crc() {
        let mut png = minimal_rgba_png();
        png[29] ^= 0xFF; // first byte of IHDR's CRC

        let summary = summarize(&png).unwrap();
        assert_eq!(summary.chunks[0].crc_ok, Some(false));
        assert_eq!(summary.chunks[1].crc_ok, Some(true));
        assert!(!summary.all_crcs_ok());
    }

    #[test]
    fn test_summarize_rejects_non_png() {
        assert!(matches!(summarize(b"GIF89a"), Err(MetaError::NotAPng)));
    }
}
