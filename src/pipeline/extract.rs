//! Text extraction: send one chunk to the OCR processor, get its text back.
//!
//! [`Extractor`] is the seam between the submitter and the remote service.
//! The production implementation, [`DocumentAiExtractor`], posts the chunk
//! to `{processor}:process` as a base64 `rawDocument` and returns
//! `document.text`. Tests and alternative backends plug in their own
//! implementation through [`crate::config::DocAiConfigBuilder::extractor`].
//!
//! One call per chunk, awaited to completion. No retries happen here; a
//! failed call is returned as-is and the submitter stops.

use crate::client::DocAiClient;
use crate::config::OcrOptions;
use crate::error::ServiceError;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Converts document bytes into text.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract the text of `content` using the processor `processor_name`.
    async fn extract(&self, processor_name: &str, content: &[u8], mime_type: &str) -> Result<String, ServiceError>;
}

/// [`Extractor`] backed by the Document AI `process` endpoint.
#[derive(Debug, Clone)]
pub struct DocumentAiExtractor {
    client: DocAiClient,
    ocr: OcrOptions,
}

impl DocumentAiExtractor {
    pub fn new(client: DocAiClient, ocr: OcrOptions) -> Self {
        Self { client, ocr }
    }
}

#[async_trait]
impl Extractor for DocumentAiExtractor {
    async fn extract(&self, processor_name: &str, content: &[u8], mime_type: &str) -> Result<String, ServiceError> {
        let body = ProcessRequest::new(content, mime_type, &self.ocr);
        let request = self
            .client
            .request(Method::POST, &format!("{processor_name}:process"))
            .json(&body);

        let response: ProcessResponse = self.client.send_json(request).await?;
        debug!(
            "Processor {} returned {} chars for {} bytes",
            processor_name,
            response.document.text.len(),
            content.len()
        );
        Ok(response.document.text)
    }
}

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProcessRequest<'a> {
    raw_document: RawDocument,
    process_options: ProcessOptions<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    /// Base64 of the document bytes.
    content: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProcessOptions<'a> {
    ocr_config: &'a OcrOptions,
}

impl<'a> ProcessRequest<'a> {
    pub(crate) fn new(content: &[u8], mime_type: &str, ocr: &'a OcrOptions) -> Self {
        Self {
            raw_document: RawDocument {
                content: STANDARD.encode(content),
                mime_type: mime_type.to_string(),
            },
            process_options: ProcessOptions { ocr_config: ocr },
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProcessResponse {
    #[serde(default)]
    document: ProcessedDocument,
}

/// Only the text is kept; pages, entities and layout are ignored.
#[derive(Debug, Default, Deserialize)]
struct ProcessedDocument {
    #[serde(default)]
    text: String,
}
