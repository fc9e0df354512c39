//! Input resolution: load a user-supplied path or URL into memory.
//!
//! lopdf parses from a byte buffer, so both local files and downloads end up
//! as a `Vec<u8>` tagged with a display name. The PDF magic bytes (`%PDF`)
//! are checked here so callers get a meaningful error instead of a parser
//! failure deep inside the splitter.

use crate::error::DocAiError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Raw PDF bytes plus the name they were loaded from (path or URL).
#[derive(Debug, Clone)]
pub struct ResolvedInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Resolve the input string to PDF bytes.
///
/// URLs are downloaded with the given timeout; anything else is treated as
/// a local path.
pub async fn resolve_input(input: &str, timeout_secs: u64) -> Result<ResolvedInput, DocAiError> {
    if input.trim().is_empty() {
        return Err(DocAiError::InvalidInput {
            input: input.to_string(),
        });
    }
    let resolved = if is_url(input) {
        download_url(input, timeout_secs).await?
    } else {
        read_local(input).await?
    };
    check_magic(&resolved.name, &resolved.bytes)?;
    Ok(resolved)
}

/// Fail with [`DocAiError::NotAPdf`] unless `bytes` starts with `%PDF`.
pub fn check_magic(name: &str, bytes: &[u8]) -> Result<(), DocAiError> {
    if bytes.starts_with(b"%PDF") {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    Err(DocAiError::NotAPdf {
        source_name: name.to_string(),
        magic,
    })
}

async fn read_local(path_str: &str) -> Result<ResolvedInput, DocAiError> {
    let path = PathBuf::from(path_str);

    let bytes = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => DocAiError::PermissionDenied { path: path.clone() },
        _ => DocAiError::FileNotFound { path: path.clone() },
    })?;

    debug!("Read local PDF: {} ({} bytes)", path.display(), bytes.len());
    Ok(ResolvedInput {
        name: path.display().to_string(),
        bytes,
    })
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ResolvedInput, DocAiError> {
    info!("Downloading PDF from: {}", url);

    let client = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| DocAiError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            DocAiError::DownloadTimeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else {
            DocAiError::DownloadFailed {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    })?;

    if !response.status().is_success() {
        return Err(DocAiError::DownloadFailed {
            url: url.to_string(),
            reason: format!("HTTP {}", response.status()),
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| DocAiError::DownloadFailed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    info!("Downloaded {} bytes", bytes.len());
    Ok(ResolvedInput {
        name: url.to_string(),
        bytes: bytes.to_vec(),
    })
}
