//! Chunk planning: partition `[0, N)` into contiguous page ranges.
//!
//! The plan is computed up front and never changes during a run. Chunk `i`
//! covers pages `i * max ..= min((i + 1) * max - 1, N - 1)` (0-based,
//! inclusive), so every chunk except possibly the last holds exactly `max`
//! pages and the last one is never empty.

use crate::error::DocAiError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// One contiguous page range of the source document.
///
/// `start` and `end` are 0-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkRange {
    /// 0-based position of the chunk in the plan.
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl ChunkRange {
    /// Number of pages in the chunk. Always ≥ 1.
    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`; a planned chunk holds at least one page.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 0-based page indices covered by the chunk.
    pub fn pages(&self) -> RangeInclusive<usize> {
        self.start..=self.end
    }

    /// 1-based chunk number, as shown to users.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    /// 1-based first page.
    pub fn first_page(&self) -> usize {
        self.start + 1
    }

    /// 1-based last page (inclusive).
    pub fn last_page(&self) -> usize {
        self.end + 1
    }
}

impl fmt::Display for ChunkRange {
    /// 1-based page span, e.g. `1-15` or `16`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.first_page())
        } else {
            write!(f, "{}-{}", self.first_page(), self.last_page())
        }
    }
}

/// Number of chunks needed for `total_pages` pages: `ceil(N / max)`.
///
/// Returns 0 when either argument is 0.
pub fn chunk_count(total_pages: usize, max_chunk_size: usize) -> usize {
    if max_chunk_size == 0 {
        return 0;
    }
    total_pages.div_ceil(max_chunk_size)
}

/// Compute the chunk boundaries for a document of `total_pages` pages.
///
/// # Errors
/// [`DocAiError::InvalidArgument`] if `total_pages` or `max_chunk_size` is 0.
pub fn plan_chunks(total_pages: usize, max_chunk_size: usize) -> Result<Vec<ChunkRange>, DocAiError> {
    if max_chunk_size == 0 {
        return Err(DocAiError::InvalidArgument(
            "maximum chunk size must be at least 1 page".into(),
        ));
    }
    if total_pages == 0 {
        return Err(DocAiError::InvalidArgument("document has no pages".into()));
    }

    let plan = (0..chunk_count(total_pages, max_chunk_size))
        .map(|index| {
            let start = index * max_chunk_size;
            let end = ((index + 1) * max_chunk_size - 1).min(total_pages - 1);
            ChunkRange { index, start, end }
        })
        .collect();

    Ok(plan)
}
