//! Chunked submission entry points.
//!
//! [`Submitter`] is the core: plan the chunks, then for each chunk in order
//! build the sub-PDF, extract its text and append it to the sink. The first
//! failure ends the run; text already appended stays in the sink and no
//! later chunk is attempted.
//!
//! The free functions ([`submit_to_file`], [`submit_sync`], [`inspect`])
//! wire a [`DocAiConfig`] to a submitter for the common cases.

use crate::client::DocAiClient;
use crate::config::{DocAiConfig, DEFAULT_DOWNLOAD_TIMEOUT_SECS};
use crate::error::DocAiError;
use crate::output::{ChunkSummary, DocumentInfo, SubmissionReport};
use crate::pipeline::extract::{DocumentAiExtractor, Extractor};
use crate::pipeline::plan::plan_chunks;
use crate::pipeline::sink::{FileSink, OutputSink};
use crate::pipeline::split::SourceDocument;
use crate::progress::ProgressCallback;
use crate::stream::{self, ChunkJob, ChunkStream};
use futures::StreamExt;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Sends documents, chunk by chunk, to one processor.
#[derive(Clone)]
pub struct Submitter {
    extractor: Arc<dyn Extractor>,
    processor_name: Arc<str>,
    mime_type: Arc<str>,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Submitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submitter")
            .field("processor_name", &self.processor_name)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

impl Submitter {
    pub fn new(extractor: Arc<dyn Extractor>, processor_name: impl Into<String>) -> Self {
        Self {
            extractor,
            processor_name: Arc::from(processor_name.into()),
            mime_type: Arc::from(crate::config::PDF_MIME_TYPE),
            progress: None,
        }
    }

    /// Build a submitter from `config`.
    ///
    /// Uses `config.extractor` when set, otherwise a [`DocumentAiExtractor`]
    /// over a REST client for `config`'s endpoint and token.
    pub fn from_config(config: &DocAiConfig) -> Result<Self, DocAiError> {
        let processor_name = config.processor_name.clone().ok_or_else(|| {
            DocAiError::InvalidConfig("a processor name is required (--processor / DOCAI_PROCESSOR)".into())
        })?;

        let extractor: Arc<dyn Extractor> = match config.extractor {
            Some(ref e) => Arc::clone(e),
            None => Arc::new(DocumentAiExtractor::new(
                DocAiClient::from_config(config)?,
                config.ocr.clone(),
            )),
        };

        let mut submitter = Self::new(extractor, processor_name).with_mime_type(config.mime_type.as_str());
        submitter.progress = config.progress_callback.clone();
        Ok(submitter)
    }

    pub fn with_mime_type(mut self, mime: &str) -> Self {
        self.mime_type = Arc::from(mime);
        self
    }

    pub fn with_progress(mut self, cb: ProgressCallback) -> Self {
        self.progress = Some(cb);
        self
    }

    pub fn processor_name(&self) -> &str {
        &self.processor_name
    }

    /// Extract every chunk of `document` and append the texts to `sink`.
    ///
    /// # Errors
    /// * [`DocAiError::InvalidArgument`] — empty document or `max_chunk_size == 0`
    ///   (nothing is sent, the sink is untouched)
    /// * [`DocAiError::ChunkBuildFailed`] / [`DocAiError::ExtractionFailed`] —
    ///   the chunk could not be built or extracted
    /// * [`DocAiError::SinkWriteFailed`] — the sink rejected an append
    ///
    /// In every failure case the texts of the chunks before the failing one
    /// are already in the sink.
    pub async fn submit<S>(
        &self,
        document: Arc<SourceDocument>,
        max_chunk_size: usize,
        sink: &mut S,
    ) -> Result<SubmissionReport, DocAiError>
    where
        S: OutputSink + ?Sized,
    {
        let started = Instant::now();
        let total_pages = document.page_count();
        let source = document.name().to_string();

        let (mut chunks, total_chunks) = self.chunk_stream(document, max_chunk_size, false)?;
        info!(
            "Submitting {} ({} pages) in {} chunk(s) of ≤{} pages to {}",
            source, total_pages, total_chunks, max_chunk_size, self.processor_name
        );

        let mut summaries = Vec::with_capacity(total_chunks);
        while let Some(item) = chunks.next().await {
            let chunk_text = item?;
            let number = chunk_text.chunk.number();
            if let Err(source) = sink.append(&chunk_text.text).await {
                let err = DocAiError::SinkWriteFailed {
                    chunk: number,
                    sink: sink.describe(),
                    source,
                };
                if let Some(ref cb) = self.progress {
                    cb.on_chunk_error(number, total_chunks, &err.to_string());
                }
                return Err(err);
            }
            let summary = ChunkSummary::from(&chunk_text);
            if let Some(ref cb) = self.progress {
                cb.on_chunk_complete(number, total_chunks, summary.text_chars);
            }
            summaries.push(summary);
        }

        let total_chars = summaries.iter().map(|s| s.text_chars).sum();
        if let Some(ref cb) = self.progress {
            cb.on_submission_complete(summaries.len(), total_chars);
        }

        let report = SubmissionReport {
            source,
            processor_name: self.processor_name.to_string(),
            total_pages,
            max_chunk_size,
            chunks: summaries,
            total_chars,
            total_duration_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Submission complete: {} chunk(s), {} chars, {}ms",
            report.chunks.len(),
            report.total_chars,
            report.total_duration_ms
        );
        Ok(report)
    }

    /// Plan the chunks of `document` and return a lazy, in-order stream of
    /// their extracted texts.
    ///
    /// Validation happens eagerly: an empty document or a zero chunk size
    /// fails here, before anything is sent.
    pub fn extract_stream(
        &self,
        document: Arc<SourceDocument>,
        max_chunk_size: usize,
    ) -> Result<ChunkStream, DocAiError> {
        self.chunk_stream(document, max_chunk_size, true).map(|(stream, _)| stream)
    }

    fn chunk_stream(
        &self,
        document: Arc<SourceDocument>,
        max_chunk_size: usize,
        report_completion: bool,
    ) -> Result<(ChunkStream, usize), DocAiError> {
        let plan = plan_chunks(document.page_count(), max_chunk_size)?;
        let total_chunks = plan.len();

        if let Some(ref cb) = self.progress {
            cb.on_submission_start(document.page_count(), total_chunks);
        }

        let job = ChunkJob {
            document,
            extractor: Arc::clone(&self.extractor),
            processor_name: Arc::clone(&self.processor_name),
            mime_type: Arc::clone(&self.mime_type),
            progress: self.progress.clone(),
            total_chunks,
            report_completion,
        };
        Ok((stream::chunk_stream(plan, job), total_chunks))
    }
}

/// Load `input` (path or URL), submit it with `config`, and append the
/// extracted text to `output_path`.
///
/// The file is opened in append mode; on failure it keeps the text of the
/// chunks that succeeded.
pub async fn submit_to_file(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &DocAiConfig,
) -> Result<SubmissionReport, DocAiError> {
    let submitter = Submitter::from_config(config)?;
    let document = Arc::new(SourceDocument::open(input.as_ref(), config.download_timeout_secs).await?);
    // Reject empty documents before the output file is created.
    plan_chunks(document.page_count(), config.chunk_size)?;
    let mut sink = FileSink::open(output_path).await?;
    submitter.submit(document, config.chunk_size, &mut sink).await
}

/// Load `input` and return all extracted text as one string.
pub async fn submit_to_string(
    input: impl AsRef<str>,
    config: &DocAiConfig,
) -> Result<(String, SubmissionReport), DocAiError> {
    let submitter = Submitter::from_config(config)?;
    let document = Arc::new(SourceDocument::open(input.as_ref(), config.download_timeout_secs).await?);
    let mut text = String::new();
    let report = submitter.submit(document, config.chunk_size, &mut text).await?;
    Ok((text, report))
}

/// Synchronous wrapper around [`submit_to_file`].
///
/// Creates a temporary tokio runtime internally; do not call from async code.
pub fn submit_sync(
    input: impl AsRef<str>,
    output_path: impl AsRef<Path>,
    config: &DocAiConfig,
) -> Result<SubmissionReport, DocAiError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| DocAiError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(submit_to_file(input, output_path, config))
}

/// Page count and chunk plan of a PDF. Makes no API calls.
pub async fn inspect(input: impl AsRef<str>, chunk_size: usize) -> Result<DocumentInfo, DocAiError> {
    let document = SourceDocument::open(input.as_ref(), DEFAULT_DOWNLOAD_TIMEOUT_SECS).await?;
    let chunks = plan_chunks(document.page_count(), chunk_size)?;
    Ok(DocumentInfo {
        source: document.name().to_string(),
        pdf_version: document.pdf_version().to_string(),
        page_count: document.page_count(),
        chunk_size,
        chunks,
    })
}
