//! Thin REST client for the Document AI `v1` API.
//!
//! Holds the HTTP client, the regional endpoint and the bearer token, and
//! turns every non-2xx response into a [`ServiceError`] carrying the status
//! and the service's own error message. Higher layers
//! ([`crate::pipeline::extract`], [`crate::processor`]) decide what a failure
//! means for them.

use crate::config::DocAiConfig;
use crate::error::{DocAiError, ServiceError};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Authenticated client bound to one API endpoint.
#[derive(Clone)]
pub struct DocAiClient {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl std::fmt::Debug for DocAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocAiClient")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl DocAiClient {
    /// Create a client from the endpoint, token and timeout in `config`.
    pub fn from_config(config: &DocAiConfig) -> Result<Self, DocAiError> {
        let access_token = config.resolve_access_token()?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| DocAiError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.api_endpoint(),
            access_token,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Absolute URL of a `v1` resource path such as
    /// `projects/p/locations/us/processors/abc:process`.
    pub fn url(&self, resource: &str) -> String {
        format!("{}/v1/{}", self.endpoint, resource.trim_start_matches('/'))
    }

    pub(crate) fn request(&self, method: Method, resource: &str) -> RequestBuilder {
        self.http
            .request(method, self.url(resource))
            .bearer_auth(&self.access_token)
    }

    /// Send a request and decode a JSON body, mapping failures to [`ServiceError`].
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = request
            .send()
            .await
            .map_err(|e| ServiceError::transport(e.to_string()))?;
        let response = check_status(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::transport(format!("invalid response body: {e}")))
    }
}

/// Google API error envelope: `{"error": {"code", "message", "status"}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    debug!("Document AI returned {}: {}", status, body);
    Err(ServiceError::http(status.as_u16(), error_message(&body)))
}

/// Pull a readable message out of an error response body.
pub(crate) fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(env) => match env.error.status {
            Some(status) if !env.error.message.is_empty() => format!("{status}: {}", env.error.message),
            Some(status) => status,
            None => env.error.message,
        },
        Err(_) if body.trim().is_empty() => "empty response body".to_string(),
        Err(_) => body.trim().chars().take(300).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> DocAiClient {
        let config = DocAiConfig::builder()
            .endpoint(endpoint)
            .access_token("token")
            .build()
            .unwrap();
        DocAiClient::from_config(&config).unwrap()
    }

    #[test]
    fn builds_v1_urls() {
        let c = client("https://us-documentai.googleapis.com");
        assert_eq!(
            c.url("projects/p/locations/us/processors/abc:process"),
            "https://us-documentai.googleapis.com/v1/projects/p/locations/us/processors/abc:process"
        );
        assert_eq!(c.url("/operations/1"), "https://us-documentai.googleapis.com/v1/operations/1");
    }

    #[test]
    fn endpoint_defaults_to_location_and_drops_trailing_slash() {
        assert_eq!(client("http://localhost:8080/").endpoint(), "http://localhost:8080");

        let config = DocAiConfig::builder().location("eu").access_token("token").build().unwrap();
        let c = DocAiClient::from_config(&config).unwrap();
        assert_eq!(c.endpoint(), "https://eu-documentai.googleapis.com");
    }

    #[test]
    fn google_error_envelope() {
        let body = r#"{"error": {"code": 404, "message": "Processor not found.", "status": "NOT_FOUND"}}"#;
        assert_eq!(error_message(body), "NOT_FOUND: Processor not found.");
    }

    #[test]
    fn non_json_error_body() {
        assert_eq!(error_message("  upstream connect error \n"), "upstream connect error");
        assert_eq!(error_message(""), "empty response body");
    }

    #[test]
    fn debug_hides_token() {
        let dbg = format!("{:?}", client("http://localhost:1"));
        assert!(!dbg.contains("access_token"));
        assert!(dbg.contains("localhost"));
    }
}
