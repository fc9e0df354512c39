//! Streaming API: chunk texts as a lazy, strictly sequential stream.
//!
//! Each poll builds the next chunk, sends it and yields its text. Nothing
//! runs ahead: chunk `i + 1` is not even built until the consumer asks for
//! it, which is what lets [`crate::submit::Submitter::submit`] guarantee
//! that a chunk's text is in the sink before the next chunk starts, and that
//! no chunk after a failure is ever attempted.
//!
//! Consumers that keep polling after an `Err` will see the following chunks
//! processed; stop at the first error to get the all-or-prefix semantics.

use crate::error::DocAiError;
use crate::output::ChunkText;
use crate::pipeline::extract::Extractor;
use crate::pipeline::plan::ChunkRange;
use crate::pipeline::split::SourceDocument;
use crate::progress::ProgressCallback;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{debug, warn};

/// A boxed stream of chunk results, in chunk order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<ChunkText, DocAiError>> + Send>>;

/// Everything one chunk needs, cloned into each step of the stream.
#[derive(Clone)]
pub(crate) struct ChunkJob {
    pub document: Arc<SourceDocument>,
    pub extractor: Arc<dyn Extractor>,
    pub processor_name: Arc<str>,
    pub mime_type: Arc<str>,
    pub progress: Option<ProgressCallback>,
    pub total_chunks: usize,
    /// Fire `on_chunk_complete` once the text is extracted. Off when the
    /// consumer reports completion itself after storing the text.
    pub report_completion: bool,
}

impl ChunkJob {
    async fn run(self, chunk: ChunkRange) -> Result<ChunkText, DocAiError> {
        let start = Instant::now();
        if let Some(ref cb) = self.progress {
            cb.on_chunk_start(chunk.number(), self.total_chunks, chunk.first_page(), chunk.last_page());
        }

        let result = self.build_and_extract(chunk).await;

        match (&result, &self.progress) {
            (Ok(text), Some(cb)) if self.report_completion => {
                cb.on_chunk_complete(chunk.number(), self.total_chunks, text.0.chars().count())
            }
            (Err(e), Some(cb)) => cb.on_chunk_error(chunk.number(), self.total_chunks, &e.to_string()),
            _ => {}
        }

        let (text, pdf_bytes) = result?;
        let duration_ms = start.elapsed().as_millis() as u64;
        debug!(
            "Chunk {}/{} (pages {}): {} chars in {}ms",
            chunk.number(),
            self.total_chunks,
            chunk,
            text.len(),
            duration_ms
        );
        Ok(ChunkText {
            chunk,
            text,
            pdf_bytes,
            duration_ms,
        })
    }

    async fn build_and_extract(&self, chunk: ChunkRange) -> Result<(String, usize), DocAiError> {
        let bytes = Arc::clone(&self.document).build_chunk_async(chunk).await?;
        let text = self
            .extractor
            .extract(&self.processor_name, &bytes, &self.mime_type)
            .await
            .map_err(|source| {
                warn!("Chunk {} (pages {}) failed: {}", chunk.number(), chunk, source);
                DocAiError::ExtractionFailed {
                    chunk: chunk.number(),
                    pages: chunk.to_string(),
                    source,
                }
            })?;
        Ok((text, bytes.len()))
    }
}

/// Turn a chunk plan into a sequential stream of extraction results.
pub(crate) fn chunk_stream(plan: Vec<ChunkRange>, job: ChunkJob) -> ChunkStream {
    let s = stream::iter(plan).then(move |chunk| job.clone().run(chunk));
    Box::pin(s)
}
