//! Zero-copy PNG chunk scanning using manual byte slicing

use std::ops::Range;

use crate::utils::{chunk_crc, read_u32_be, PNG_SIGNATURE};

/// A chunk located inside a borrowed PNG buffer.
///
/// Holds spans rather than bytes; use [`ChunkRef::data_in`] with the buffer
/// that was scanned to get at the data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkRef {
    /// Offset of the length field
    pub offset: usize,
    pub length: u32,
    pub chunk_type: [u8; 4],
    pub data: Range<usize>,
    /// Span of the CRC trailer; may run past the end of a truncated buffer
    pub crc: Range<usize>,
}

impl ChunkRef {
    pub fn is_type(&self, chunk_type: &[u8; 4]) -> bool {
        &self.chunk_type == chunk_type
    }

    /// Chunk type as text, for display
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    /// The chunk's data bytes within `bytes`
    pub fn data_in<'a>(&self, bytes: &'a [u8]) -> &'a [u8] {
        &bytes[self.data.clone()]
    }

    /// CRC stored in the trailer, `None` when the trailer is cut off
    pub fn stored_crc(&self, bytes: &[u8]) -> Option<u32> {
        read_u32_be(bytes, self.crc.start)
    }

    /// CRC recomputed over the type and data
    pub fn computed_crc(&self, bytes: &[u8]) -> u32 {
        chunk_crc(&self.chunk_type, self.data_in(bytes))
    }

    /// Offset just past the CRC trailer
    pub fn end(&self) -> usize {
        self.crc.end
    }
}

/// How a scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanEnd {
    /// The cursor landed exactly on the end of the buffer
    EndOfStream,
    /// A field at `offset` would have been read past the end of the buffer
    Malformed { offset: usize },
}

/// Iterator over the chunks following the PNG signature.
///
/// Neither the signature nor any CRC is checked, and IEND is not special:
/// scanning runs until the buffer is used up or a read would go out of
/// bounds. Check [`ChunkScanner::end`] afterwards to tell the two apart.
#[derive(Debug, Clone)]
pub struct ChunkScanner<'a> {
    bytes: &'a [u8],
    cursor: usize,
    end: Option<ScanEnd>,
}

impl<'a> ChunkScanner<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            cursor: PNG_SIGNATURE.len(),
            end: None,
        }
    }

    /// Terminal state, once the iterator has returned `None`
    pub fn end(&self) -> Option<ScanEnd> {
        self.end
    }

    fn stop(&mut self, end: ScanEnd) -> Option<ChunkRef> {
        self.end = Some(end);
        None
    }
}

impl Iterator for ChunkScanner<'_> {
    type Item = ChunkRef;

    fn next(&mut self) -> Option<ChunkRef> {
        if self.end.is_some() {
            return None;
        }

        let offset = self.cursor;
        if offset == self.bytes.len() {
            return self.stop(ScanEnd::EndOfStream);
        }

        let Some(length) = read_u32_be(self.bytes, offset) else {
            return self.stop(ScanEnd::Malformed { offset });
        };

        let type_start = offset + 4;
        let Some(chunk_type) = self
            .bytes
            .get(type_start..type_start + 4)
            .and_then(|t| <[u8; 4]>::try_from(t).ok())
        else {
            return self.stop(ScanEnd::Malformed { offset: type_start });
        };

        let data_start = type_start + 4;
        let data_end = match data_start.checked_add(length as usize) {
            Some(end) if end <= self.bytes.len() => end,
            _ => return self.stop(ScanEnd::Malformed { offset: data_start }),
        };

        // The CRC is skipped, not read; a short trailer surfaces on the next step
        let crc = data_end..data_end + 4;
        self.cursor = crc.end;

        Some(ChunkRef {
            offset,
            length,
            chunk_type,
            data: data_start..data_end,
            crc,
        })
    }
}
