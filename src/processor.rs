//! Processor lifecycle: create, look up, list and delete OCR processors.
//!
//! Deleting a processor starts a long-running operation; [`ProcessorService::delete_processor`]
//! polls it until it reports `done`. Deleting a processor that no longer
//! exists is not an error; the service's "not found" message is returned as
//! [`DeleteOutcome::NotFound`].

use crate::client::DocAiClient;
use crate::config::DocAiConfig;
use crate::error::{DocAiError, ServiceError};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Processor type of the general-purpose OCR processor.
pub const OCR_PROCESSOR: &str = "OCR_PROCESSOR";

static PROCESSOR_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^projects/[^/\s]+/locations/[^/\s]+/processors/[^/\s:]+$").expect("valid regex"));

/// Check that `name` is a full processor resource name.
pub fn validate_processor_name(name: &str) -> Result<(), DocAiError> {
    if PROCESSOR_NAME.is_match(name) {
        Ok(())
    } else {
        Err(DocAiError::InvalidConfig(format!(
            "'{name}' is not a processor resource name \
             (expected projects/{{project}}/locations/{{location}}/processors/{{id}})"
        )))
    }
}

/// A processor as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Processor {
    /// Full resource name, used as the processor identifier everywhere else.
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(rename = "type", default)]
    pub processor_type: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub process_endpoint: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateProcessorRequest<'a> {
    display_name: &'a str,
    #[serde(rename = "type")]
    processor_type: &'a str,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProcessorsResponse {
    #[serde(default)]
    processors: Vec<Processor>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// `google.longrunning.Operation`, reduced to what polling needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Clone, Deserialize)]
struct OperationError {
    #[serde(default)]
    message: String,
}

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DeleteOutcome {
    Deleted { name: String },
    NotFound { message: String },
}

impl DeleteOutcome {
    /// One-line summary for users.
    pub fn message(&self) -> String {
        match self {
            DeleteOutcome::Deleted { name } => format!("{name} deleted!"),
            DeleteOutcome::NotFound { message } => message.clone(),
        }
    }
}

/// Processor management for one project and location.
#[derive(Debug, Clone)]
pub struct ProcessorService {
    client: DocAiClient,
    parent: String,
    poll_interval: Duration,
}

impl ProcessorService {
    pub fn from_config(config: &DocAiConfig) -> Result<Self, DocAiError> {
        Ok(Self {
            client: DocAiClient::from_config(config)?,
            parent: config.location_path()?,
            poll_interval: Duration::from_millis(config.operation_poll_interval_ms),
        })
    }

    /// `projects/{p}/locations/{l}`.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    /// Create a processor of `processor_type` (e.g. [`OCR_PROCESSOR`]).
    pub async fn create_processor(&self, display_name: &str, processor_type: &str) -> Result<Processor, DocAiError> {
        let body = CreateProcessorRequest {
            display_name,
            processor_type,
        };
        let request = self
            .client
            .request(Method::POST, &format!("{}/processors", self.parent))
            .json(&body);

        let processor: Processor = self
            .client
            .send_json(request)
            .await
            .map_err(|source| request_failed("create", source))?;
        info!("Created processor {} ({})", processor.name, processor.display_name);
        Ok(processor)
    }

    pub async fn get_processor(&self, name: &str) -> Result<Processor, DocAiError> {
        validate_processor_name(name)?;
        let request = self.client.request(Method::GET, name);
        self.client
            .send_json(request)
            .await
            .map_err(|source| request_failed("get", source))
    }

    /// All processors under the parent, following pagination.
    pub async fn list_processors(&self) -> Result<Vec<Processor>, DocAiError> {
        let mut processors = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut request = self
                .client
                .request(Method::GET, &format!("{}/processors", self.parent));
            if let Some(ref token) = page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let page: ListProcessorsResponse = self
                .client
                .send_json(request)
                .await
                .map_err(|source| request_failed("list", source))?;
            processors.extend(page.processors);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(processors)
    }

    /// Delete a processor and wait for the deletion to finish.
    pub async fn delete_processor(&self, name: &str) -> Result<DeleteOutcome, DocAiError> {
        validate_processor_name(name)?;
        let request = self.client.request(Method::DELETE, name);
        let operation: Operation = match self.client.send_json(request).await {
            Ok(op) => op,
            Err(e) if e.is_not_found() => {
                warn!("Processor {} not found: {}", name, e.message);
                return Ok(DeleteOutcome::NotFound { message: e.message });
            }
            Err(source) => return Err(request_failed("delete", source)),
        };

        self.wait_for(operation).await?;
        info!("Deleted processor {}", name);
        Ok(DeleteOutcome::Deleted { name: name.to_string() })
    }

    /// Create an OCR processor that is deleted again by [`TemporaryProcessor::delete`].
    pub async fn create_temporary(&self, display_name: &str, processor_type: &str) -> Result<TemporaryProcessor, DocAiError> {
        let processor = self.create_processor(display_name, processor_type).await?;
        Ok(TemporaryProcessor {
            service: self.clone(),
            processor,
        })
    }

    async fn wait_for(&self, mut operation: Operation) -> Result<(), DocAiError> {
        loop {
            if let Some(outcome) = operation_outcome(&operation) {
                return outcome;
            }
            debug!("Operation {} still running", operation.name);
            tokio::time::sleep(self.poll_interval).await;
            let request = self.client.request(Method::GET, &operation.name);
            operation = self
                .client
                .send_json(request)
                .await
                .map_err(|source| request_failed("operation poll", source))?;
        }
    }
}

/// `None` while the operation is running.
fn operation_outcome(op: &Operation) -> Option<Result<(), DocAiError>> {
    if !op.done {
        return None;
    }
    Some(match op.error {
        Some(ref err) => Err(DocAiError::OperationFailed {
            name: op.name.clone(),
            message: err.message.clone(),
        }),
        None => Ok(()),
    })
}

fn request_failed(operation: &str, source: ServiceError) -> DocAiError {
    DocAiError::ProcessorRequestFailed {
        operation: operation.to_string(),
        source,
    }
}

/// A processor created for a single run.
///
/// Rust has no async drop, so the owner must call [`TemporaryProcessor::delete`]
/// once the run is over, whether it succeeded or not.
#[derive(Debug)]
pub struct TemporaryProcessor {
    service: ProcessorService,
    processor: Processor,
}

impl TemporaryProcessor {
    pub fn processor(&self) -> &Processor {
        &self.processor
    }

    pub fn name(&self) -> &str {
        &self.processor.name
    }

    pub async fn delete(self) -> Result<DeleteOutcome, DocAiError> {
        self.service.delete_processor(&self.processor.name).await
    }
}
