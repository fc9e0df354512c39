//! Configuration types for chunked Document AI submission.
//!
//! Everything a run needs (project, location, endpoint, credentials,
//! processor, chunk size, OCR options, timeouts) lives in [`DocAiConfig`],
//! built via its [`DocAiConfigBuilder`]. Nothing is read from module-level
//! state; the CLI maps its flags and environment variables onto the builder.

use crate::error::DocAiError;
use crate::pipeline::extract::Extractor;
use crate::processor::validate_processor_name;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Default number of pages per chunk.
///
/// Online (synchronous) processing requests on the OCR processor are capped
/// at 15 pages.
pub const DEFAULT_CHUNK_SIZE: usize = 15;

/// Default download timeout for URL inputs.
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 120;

/// MIME type of every chunk sent for extraction.
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// Configuration for a submission run.
///
/// Built via [`DocAiConfig::builder()`] or using [`DocAiConfig::default()`].
///
/// # Example
/// ```rust
/// use docai_submit::DocAiConfig;
///
/// let config = DocAiConfig::builder()
///     .project_id("my-project")
///     .location("eu")
///     .chunk_size(10)
///     .build()
///     .unwrap();
/// assert_eq!(config.api_endpoint(), "https://eu-documentai.googleapis.com");
/// ```
#[derive(Clone)]
pub struct DocAiConfig {
    /// Google Cloud project that owns the processors.
    pub project_id: Option<String>,

    /// Processor location, `us` or `eu`. Default: `us`.
    pub location: String,

    /// API endpoint override. When `None` the regional endpoint
    /// `https://{location}-documentai.googleapis.com` is used.
    pub endpoint: Option<String>,

    /// OAuth 2.0 bearer token. Falls back to `DOCAI_ACCESS_TOKEN`, then
    /// `GOOGLE_ACCESS_TOKEN`, when the client is created.
    pub access_token: Option<String>,

    /// Full processor resource name
    /// (`projects/{p}/locations/{l}/processors/{id}`).
    pub processor_name: Option<String>,

    /// Maximum pages per chunk. Default: 15.
    pub chunk_size: usize,

    /// MIME type declared for each chunk. Default: `application/pdf`.
    pub mime_type: String,

    /// OCR options attached to every process request.
    pub ocr: OcrOptions,

    /// Per-request HTTP timeout in seconds. Default: none.
    ///
    /// Extraction calls block until the service answers or fails; a timeout
    /// is purely a transport setting.
    pub request_timeout_secs: Option<u64>,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Delay between polls of a long-running operation. Default: 1000 ms.
    pub operation_poll_interval_ms: u64,

    /// Pre-constructed extractor. Takes precedence over the REST client.
    pub extractor: Option<Arc<dyn Extractor>>,

    /// Receives chunk-level progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DocAiConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            location: "us".to_string(),
            endpoint: None,
            access_token: None,
            processor_name: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            mime_type: PDF_MIME_TYPE.to_string(),
            ocr: OcrOptions::default(),
            request_timeout_secs: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            operation_poll_interval_ms: 1000,
            extractor: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DocAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocAiConfig")
            .field("project_id", &self.project_id)
            .field("location", &self.location)
            .field("endpoint", &self.endpoint)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("processor_name", &self.processor_name)
            .field("chunk_size", &self.chunk_size)
            .field("mime_type", &self.mime_type)
            .field("ocr", &self.ocr)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("extractor", &self.extractor.as_ref().map(|_| "<dyn Extractor>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ChunkProgressCallback>"),
            )
            .finish()
    }
}

impl DocAiConfig {
    /// Create a new builder for `DocAiConfig`.
    pub fn builder() -> DocAiConfigBuilder {
        DocAiConfigBuilder {
            config: Self::default(),
        }
    }

    /// The base URL every REST call is made against, without trailing slash.
    pub fn api_endpoint(&self) -> String {
        match self.endpoint {
            Some(ref e) => e.trim_end_matches('/').to_string(),
            None => format!("https://{}-documentai.googleapis.com", self.location),
        }
    }

    /// `projects/{project}/locations/{location}`, the parent of every processor.
    pub fn location_path(&self) -> Result<String, DocAiError> {
        let project = self.project_id.as_deref().ok_or_else(|| {
            DocAiError::InvalidConfig("a project id is required (--project / DOCAI_PROJECT_ID)".into())
        })?;
        Ok(format!("projects/{}/locations/{}", project, self.location))
    }

    /// Resolve the access token: explicit value first, then the environment.
    pub fn resolve_access_token(&self) -> Result<String, DocAiError> {
        if let Some(ref token) = self.access_token {
            if !token.is_empty() {
                return Ok(token.clone());
            }
        }
        ["DOCAI_ACCESS_TOKEN", "GOOGLE_ACCESS_TOKEN"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.trim().is_empty())
            .map(|v| v.trim().to_string())
            .ok_or(DocAiError::MissingAccessToken)
    }
}

/// Builder for [`DocAiConfig`].
pub struct DocAiConfigBuilder {
    config: DocAiConfig,
}

impl fmt::Debug for DocAiConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocAiConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl DocAiConfigBuilder {
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.config.project_id = Some(id.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.config.location = location.into().trim().to_lowercase();
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = Some(endpoint.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.access_token = Some(token.into());
        self
    }

    pub fn processor_name(mut self, name: impl Into<String>) -> Self {
        self.config.processor_name = Some(name.into());
        self
    }

    pub fn chunk_size(mut self, pages: usize) -> Self {
        self.config.chunk_size = pages;
        self
    }

    pub fn mime_type(mut self, mime: impl Into<String>) -> Self {
        self.config.mime_type = mime.into();
        self
    }

    pub fn ocr(mut self, ocr: OcrOptions) -> Self {
        self.config.ocr = ocr;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn operation_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.operation_poll_interval_ms = ms.max(10);
        self
    }

    pub fn extractor(mut self, extractor: Arc<dyn Extractor>) -> Self {
        self.config.extractor = Some(extractor);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DocAiConfig, DocAiError> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(DocAiError::InvalidConfig("chunk size must be ≥ 1".into()));
        }
        if c.location.is_empty() || c.location.contains('/') {
            return Err(DocAiError::InvalidConfig(format!(
                "invalid location '{}' (expected e.g. 'us' or 'eu')",
                c.location
            )));
        }
        if let Some(ref endpoint) = c.endpoint {
            if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
                return Err(DocAiError::InvalidConfig(format!(
                    "endpoint must be an http(s) URL, got '{}'",
                    endpoint
                )));
            }
        }
        if let Some(ref name) = c.processor_name {
            validate_processor_name(name)?;
        }
        if c.request_timeout_secs == Some(0) {
            return Err(DocAiError::InvalidConfig("request timeout must be ≥ 1s".into()));
        }
        Ok(self.config)
    }
}

/// OCR behaviour requested from the processor on every chunk.
///
/// Serialised directly as the `ocrConfig` object of a process request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrOptions {
    /// Use the embedded text layer of digital PDFs instead of OCR where present.
    pub enable_native_pdf_parsing: bool,

    /// Return symbol-level (character) detail. Off by default; it bloats the
    /// response and the text is all we keep.
    pub enable_symbol: bool,

    /// Premium features.
    pub premium_features: PremiumFeatures,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            enable_native_pdf_parsing: true,
            enable_symbol: false,
            premium_features: PremiumFeatures::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumFeatures {
    /// Recognise mathematical formulae and emit them as LaTeX.
    pub enable_math_ocr: bool,
}

impl Default for PremiumFeatures {
    fn default() -> Self {
        Self {
            enable_math_ocr: true,
        }
    }
}
