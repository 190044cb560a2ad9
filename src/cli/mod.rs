//! Terminal rendering for the command-line tool

use std::fmt::Write;

use crate::png::{PngSummary, ScanEnd};
use crate::upload::UploadOutcome;

/// Render a chunk listing, one line per chunk
pub fn render_summary(summary: &PngSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} bytes, {} chunks", summary.total_len, summary.chunks.len());

    for chunk in &summary.chunks {
        let crc = match chunk.crc_ok {
            Some(true) => "crc ok",
            Some(false) => "CRC MISMATCH",
            None => "crc missing",
        };
        let _ = write!(
            out,
            "  {:>8}  {}  {:>8} bytes  {}",
            chunk.offset, chunk.chunk_type, chunk.length, crc
        );
        if let Some(keyword) = &chunk.keyword {
            let _ = write!(out, "  keyword={keyword:?}");
        }
        out.push('\n');
    }

    if let ScanEnd::Malformed { offset } = summary.end {
        let _ = writeln!(out, "[WARN] chunk stream truncated at offset {offset}");
    }
    out
}

/// One-line description of an upload hook outcome
pub fn describe_outcome(outcome: &UploadOutcome) -> String {
    match outcome {
        UploadOutcome::Embedded { added_bytes } => {
            format!("Embedded metadata ({added_bytes} bytes added)")
        }
        UploadOutcome::SkippedNotPng => "Skipped: not a .png file".to_string(),
        UploadOutcome::SkippedNoMetadata => "Skipped: no metadata given".to_string(),
        UploadOutcome::InvalidPayload(reason) => format!("Skipped: metadata is not JSON ({reason})"),
        UploadOutcome::Unchanged => "Unchanged: file could not take metadata".to_string(),
    }
}
