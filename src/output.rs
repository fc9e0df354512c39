//! Results of a submission run.

use serde::{Deserialize, Serialize};

/// Text extracted from one chunk, as yielded by
/// [`crate::stream::ChunkStream`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkText {
    pub chunk: crate::pipeline::plan::ChunkRange,
    pub text: String,
    /// Size of the serialised chunk PDF that was sent.
    pub pdf_bytes: usize,
    /// Build + extraction wall-clock time.
    pub duration_ms: u64,
}

/// Per-chunk record kept in the report; the text itself lives in the sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSummary {
    /// 1-indexed chunk number.
    pub chunk: usize,
    /// 1-indexed first page.
    pub first_page: usize,
    /// 1-indexed last page (inclusive).
    pub last_page: usize,
    pub pdf_bytes: usize,
    pub text_chars: usize,
    pub duration_ms: u64,
}

impl From<&ChunkText> for ChunkSummary {
    fn from(t: &ChunkText) -> Self {
        Self {
            chunk: t.chunk.number(),
            first_page: t.chunk.first_page(),
            last_page: t.chunk.last_page(),
            pdf_bytes: t.pdf_bytes,
            text_chars: t.text.chars().count(),
            duration_ms: t.duration_ms,
        }
    }
}

/// Completion signal of a successful run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReport {
    pub source: String,
    pub processor_name: String,
    pub total_pages: usize,
    pub max_chunk_size: usize,
    pub chunks: Vec<ChunkSummary>,
    pub total_chars: usize,
    pub total_duration_ms: u64,
}

/// What `inspect` reports: page count and the chunk plan, no API calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub source: String,
    pub pdf_version: String,
    pub page_count: usize,
    pub chunk_size: usize,
    pub chunks: Vec<crate::pipeline::plan::ChunkRange>,
}
