//! # docai-submit
//!
//! Submit PDF documents of any length to a Google Document AI OCR processor.
//!
//! ## Why this crate?
//!
//! Online processing requests are capped at a small number of pages (15 for
//! the OCR processor). Longer documents have to be cut into page ranges, sent
//! one range at a time and their text stitched back together in order. This
//! crate does exactly that, and stops cleanly at the first failing chunk
//! with the text of every earlier chunk already written to the output.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    resolve local file or download from URL
//!  ├─ 2. Plan     split page count into ≤ max-size contiguous ranges
//!  ├─ 3. Split    build a standalone PDF per range (lopdf, spawn_blocking)
//!  ├─ 4. Extract  POST {processor}:process, one chunk at a time
//!  └─ 5. Sink     append each chunk's text, in order, no separators
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docai_submit::{submit_to_file, DocAiConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Token from DOCAI_ACCESS_TOKEN / GOOGLE_ACCESS_TOKEN
//!     let config = DocAiConfig::builder()
//!         .project_id("my-project")
//!         .processor_name("projects/my-project/locations/us/processors/1234")
//!         .build()?;
//!     let report = submit_to_file("document.pdf", "output.txt", &config).await?;
//!     eprintln!("{} chunks, {} chars", report.chunks.len(), report.total_chars);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `docai` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! docai-submit = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod chat;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod processor;
pub mod progress;
pub mod stream;
pub mod submit;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use chat::{ChatBackend, ChatSession, ChatTurn, LlmBackend, Role};
pub use client::DocAiClient;
pub use config::{DocAiConfig, DocAiConfigBuilder, OcrOptions, PremiumFeatures, DEFAULT_CHUNK_SIZE};
pub use error::{DocAiError, ServiceError};
pub use output::{ChunkSummary, ChunkText, DocumentInfo, SubmissionReport};
pub use pipeline::extract::{DocumentAiExtractor, Extractor};
pub use pipeline::plan::{chunk_count, plan_chunks, ChunkRange};
pub use pipeline::sink::{FileSink, OutputSink, WriterSink};
pub use pipeline::split::SourceDocument;
pub use processor::{DeleteOutcome, Processor, ProcessorService, TemporaryProcessor, OCR_PROCESSOR};
pub use progress::{ChunkProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::ChunkStream;
pub use submit::{inspect, submit_sync, submit_to_file, submit_to_string, Submitter};
