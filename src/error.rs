//! Error types for the docai-submit library.
//!
//! Two error types reflect two layers:
//!
//! * [`DocAiError`] — **Fatal**: the run cannot continue (bad input file,
//!   invalid chunk size, a chunk failed extraction, the sink refused a
//!   write). Returned as `Err(DocAiError)` from every public entry point.
//!
//! * [`ServiceError`] — a single failed call to the remote service (HTTP
//!   status, transport failure, undecodable body). It is what an
//!   [`crate::pipeline::extract::Extractor`] returns, and is wrapped into a
//!   `DocAiError` with the chunk or operation it belongs to.
//!
//! Nothing is retried. A chunk failure aborts the run and whatever text was
//! already appended to the sink stays there.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the docai-submit library.
#[derive(Debug, Error)]
pub enum DocAiError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input string is not a valid file path or URL.
    #[error("Invalid input '{input}': not a file path or a valid HTTP/HTTPS URL")]
    InvalidInput { input: String },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The bytes were read, but they are not a PDF.
    #[error("'{source_name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { source_name: String, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{source_name}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { source_name: String, detail: String },

    /// Encrypted PDFs cannot be split without decrypting them first.
    #[error("PDF '{source_name}' is encrypted.\nDecrypt it first with: qpdf --decrypt input.pdf output.pdf")]
    EncryptedPdf { source_name: String },

    /// A chunk sub-document could not be assembled or serialized.
    #[error("Failed to build chunk {chunk} (pages {pages}): {detail}")]
    ChunkBuildFailed {
        chunk: usize,
        pages: String,
        detail: String,
    },

    // ── Submission errors ─────────────────────────────────────────────────
    /// Precondition violated: empty document or chunk size below 1.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The extraction call for a chunk failed. Not retried.
    #[error("Extraction failed for chunk {chunk} (pages {pages}): {source}")]
    ExtractionFailed {
        chunk: usize,
        pages: String,
        #[source]
        source: ServiceError,
    },

    /// The output sink rejected an append.
    #[error("Failed to write extracted text for chunk {chunk} to {sink}: {source}")]
    SinkWriteFailed {
        chunk: usize,
        sink: String,
        #[source]
        source: std::io::Error,
    },

    /// Could not open or create the output file.
    #[error("Failed to open output file '{path}': {source}")]
    OutputOpenFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Processor lifecycle errors ────────────────────────────────────────
    /// A processor management request failed.
    #[error("Processor {operation} failed: {source}")]
    ProcessorRequestFailed {
        operation: String,
        #[source]
        source: ServiceError,
    },

    /// A long-running operation finished with an error status.
    #[error("Operation '{name}' failed: {message}")]
    OperationFailed { name: String, message: String },

    // ── Auth / config errors ──────────────────────────────────────────────
    /// No OAuth access token was configured.
    #[error(
        "No access token configured.\n\
Set DOCAI_ACCESS_TOKEN (or GOOGLE_ACCESS_TOKEN), e.g.:\n\
  export DOCAI_ACCESS_TOKEN=$(gcloud auth print-access-token)"
    )]
    MissingAccessToken,

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Chat errors ───────────────────────────────────────────────────────
    /// The chat provider is not initialised (missing API key etc.).
    #[error("Chat provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The chat model returned an error.
    #[error("Chat request failed: {message}")]
    ChatFailed { message: String },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed call to the remote document-processing service.
///
/// `status` is `None` when the request never produced an HTTP response
/// (DNS, TLS, connection reset, client-side timeout).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    pub status: Option<u16>,
    pub message: String,
}

impl ServiceError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "HTTP {code}: {}", self.message),
            None => write!(f, "transport error: {}", self.message),
        }
    }
}

impl std::error::Error for ServiceError {}
