//! Shared helpers for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use docai_submit::{Extractor, ServiceError};
use std::sync::Mutex;
use std::time::Duration;

mod pdf;

pub use pdf::{page_markers, sample_pdf};

pub const PROCESSOR: &str = "projects/test-project/locations/us/processors/ocr-1";

/// Fake OCR service: returns `<first..last>` for each chunk, records every
/// call, optionally fails on one call and sleeps per call.
pub struct ScriptedExtractor {
    pub calls: Mutex<Vec<Vec<String>>>,
    pub fail_on_call: Option<usize>,
    pub delays_ms: Vec<u64>,
}

impl ScriptedExtractor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on_call: None,
            delays_ms: Vec::new(),
        }
    }

    pub fn failing_on(call: usize) -> Self {
        Self {
            fail_on_call: Some(call),
            ..Self::new()
        }
    }

    pub fn with_delays(delays_ms: Vec<u64>) -> Self {
        Self {
            delays_ms,
            ..Self::new()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(&self, processor_name: &str, content: &[u8], mime_type: &str) -> Result<String, ServiceError> {
        assert_eq!(processor_name, PROCESSOR);
        assert_eq!(mime_type, "application/pdf");

        let pages = page_markers(content);
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(pages.clone());
            calls.len()
        };

        if let Some(&ms) = self.delays_ms.get(call - 1) {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        if self.fail_on_call == Some(call) {
            return Err(ServiceError::http(503, "The service is currently unavailable."));
        }

        let first = pages.first().cloned().unwrap_or_default();
        let last = pages.last().cloned().unwrap_or_default();
        Ok(format!("<{first}..{last}>"))
    }
}
