//! PDF splitting: build an independent sub-document for one chunk.
//!
//! The source is parsed once into a [`lopdf::Document`]. For every chunk the
//! object graph is cloned, the pages outside the chunk are deleted, objects
//! that became unreachable (their content streams, images, fonts used only
//! there) are pruned, and the result is serialised. Page objects and their
//! content streams are never rewritten, so the chunk carries the original
//! page content byte-for-byte; only the container framing (xref table, page
//! tree counts) changes.
//!
//! Splitting is CPU-bound and runs inside `spawn_blocking` when called from
//! async code (see [`SourceDocument::build_chunk_async`]).

use crate::error::DocAiError;
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::plan::ChunkRange;
use lopdf::Document;
use std::sync::Arc;
use tracing::{debug, info};

/// A parsed, immutable source PDF.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    name: String,
    document: Document,
    page_count: usize,
}

impl SourceDocument {
    /// Parse PDF bytes. `name` is used in error messages and logs only.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, DocAiError> {
        let name = name.into();
        input::check_magic(&name, bytes)?;

        let document = Document::load_mem(bytes).map_err(|e| DocAiError::CorruptPdf {
            source_name: name.clone(),
            detail: e.to_string(),
        })?;

        if document.is_encrypted() {
            return Err(DocAiError::EncryptedPdf { source_name: name });
        }

        let page_count = document.get_pages().len();
        info!("PDF loaded: {} ({} pages, v{})", name, page_count, document.version);

        Ok(Self {
            name,
            document,
            page_count,
        })
    }

    /// Load a PDF from a local path or HTTP(S) URL.
    pub async fn open(input: &str, download_timeout_secs: u64) -> Result<Self, DocAiError> {
        let ResolvedInput { name, bytes } = input::resolve_input(input, download_timeout_secs).await?;
        tokio::task::spawn_blocking(move || Self::from_bytes(name, &bytes))
            .await
            .map_err(|e| DocAiError::Internal(format!("PDF parse task panicked: {}", e)))?
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Total number of pages, N.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// PDF version string from the header, e.g. `1.7`.
    pub fn pdf_version(&self) -> &str {
        &self.document.version
    }

    /// Serialise the pages of `chunk` as a standalone PDF.
    pub fn build_chunk(&self, chunk: &ChunkRange) -> Result<Vec<u8>, DocAiError> {
        let fail = |detail: String| DocAiError::ChunkBuildFailed {
            chunk: chunk.number(),
            pages: chunk.to_string(),
            detail,
        };

        if chunk.end >= self.page_count || chunk.start > chunk.end {
            return Err(fail(format!(
                "page range out of bounds (document has {} pages)",
                self.page_count
            )));
        }

        // lopdf numbers pages from 1.
        let keep = (chunk.start as u32 + 1)..=(chunk.end as u32 + 1);
        let drop: Vec<u32> = self
            .document
            .get_pages()
            .into_keys()
            .filter(|n| !keep.contains(n))
            .collect();

        let mut doc = self.document.clone();
        doc.delete_pages(&drop);
        let pruned = doc.prune_objects();

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).map_err(|e| fail(e.to_string()))?;

        debug!(
            "Built chunk {} (pages {}): {} pages kept, {} objects pruned, {} bytes",
            chunk.number(),
            chunk,
            chunk.len(),
            pruned.len(),
            bytes.len()
        );
        Ok(bytes)
    }

    /// [`Self::build_chunk`] on the blocking thread pool.
    pub async fn build_chunk_async(self: Arc<Self>, chunk: ChunkRange) -> Result<Vec<u8>, DocAiError> {
        tokio::task::spawn_blocking(move || self.build_chunk(&chunk))
            .await
            .map_err(|e| DocAiError::Internal(format!("Chunk build task panicked: {}", e)))?
    }
}

#[cfg(test)]
#[path = "../../tests/common/pdf.rs"]
pub(crate) mod fixtures;

#[cfg(test)]
mod tests {
    use super::fixtures::{page_markers, sample_pdf};
    use super::*;
    use crate::pipeline::plan::plan_chunks;

    fn markers(range: std::ops::RangeInclusive<usize>) -> Vec<String> {
        range.map(|i| format!("page-{i}")).collect()
    }

    #[test]
    fn counts_pages() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(16)).unwrap();
        assert_eq!(doc.page_count(), 16);
        assert_eq!(doc.name(), "sample.pdf");
        assert_eq!(doc.pdf_version(), "1.5");
    }

    #[test]
    fn chunks_hold_their_pages_in_order() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(16)).unwrap();
        let plan = plan_chunks(doc.page_count(), 15).unwrap();

        let first = doc.build_chunk(&plan[0]).unwrap();
        assert!(first.starts_with(b"%PDF"));
        assert_eq!(page_markers(&first), markers(1..=15));

        let second = doc.build_chunk(&plan[1]).unwrap();
        assert_eq!(page_markers(&second), markers(16..=16));
    }

    #[test]
    fn middle_chunk() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(10)).unwrap();
        let plan = plan_chunks(10, 4).unwrap();
        assert_eq!(page_markers(&doc.build_chunk(&plan[1]).unwrap()), markers(5..=8));
    }

    #[test]
    fn building_a_chunk_leaves_the_source_intact() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(5)).unwrap();
        let plan = plan_chunks(5, 2).unwrap();
        doc.build_chunk(&plan[0]).unwrap();
        assert_eq!(doc.page_count(), 5);
        assert_eq!(page_markers(&doc.build_chunk(&plan[2]).unwrap()), markers(5..=5));
    }

    #[test]
    fn smaller_chunks_drop_unused_content() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(30)).unwrap();
        let whole = doc.build_chunk(&ChunkRange { index: 0, start: 0, end: 29 }).unwrap();
        let single = doc.build_chunk(&ChunkRange { index: 0, start: 0, end: 0 }).unwrap();
        assert!(single.len() < whole.len());
    }

    #[test]
    fn out_of_range_chunk_rejected() {
        let doc = SourceDocument::from_bytes("sample.pdf", &sample_pdf(3)).unwrap();
        let err = doc
            .build_chunk(&ChunkRange { index: 1, start: 3, end: 5 })
            .unwrap_err();
        assert!(matches!(err, DocAiError::ChunkBuildFailed { chunk: 2, .. }), "got: {err}");
    }

    #[test]
    fn garbage_after_magic_is_corrupt() {
        let err = SourceDocument::from_bytes("bad.pdf", b"%PDF-1.4\nthis is not a pdf").unwrap_err();
        assert!(matches!(err, DocAiError::CorruptPdf { .. }), "got: {err}");
    }

    #[test]
    fn non_pdf_rejected_before_parsing() {
        let err = SourceDocument::from_bytes("notes.txt", b"hello world").unwrap_err();
        assert!(matches!(err, DocAiError::NotAPdf { .. }), "got: {err}");
    }

    #[tokio::test]
    async fn async_build_matches_blocking_build() {
        let doc = Arc::new(SourceDocument::from_bytes("sample.pdf", &sample_pdf(4)).unwrap());
        let chunk = ChunkRange { index: 0, start: 1, end: 2 };
        let bytes = Arc::clone(&doc).build_chunk_async(chunk).await.unwrap();
        assert_eq!(page_markers(&bytes), markers(2..=3));
    }
}
