//! Output sinks: append-only destinations for extracted text.
//!
//! A sink receives exactly one `append` per successful chunk, in chunk
//! order, with no separators added. Appended text is never rolled back; if
//! a run fails midway the sink keeps what it already has.

use crate::error::DocAiError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Append-only text destination.
#[async_trait]
pub trait OutputSink: Send {
    async fn append(&mut self, text: &str) -> std::io::Result<()>;

    /// Short human-readable description used in error messages.
    fn describe(&self) -> String {
        "output sink".to_string()
    }
}

/// In-memory sink.
#[async_trait]
impl OutputSink for String {
    async fn append(&mut self, text: &str) -> std::io::Result<()> {
        self.push_str(text);
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory buffer".to_string()
    }
}

/// Appends to a file, creating it (and its parent directories) if needed.
///
/// Existing content is kept: running twice against the same path
/// concatenates both runs.
pub struct FileSink {
    path: PathBuf,
    file: File,
}

impl FileSink {
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DocAiError> {
        let path = path.as_ref().to_path_buf();
        let open_err = |source| DocAiError::OutputOpenFailed {
            path: path.clone(),
            source,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(open_err)?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(open_err)?;

        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl OutputSink for FileSink {
    async fn append(&mut self, text: &str) -> std::io::Result<()> {
        self.file.write_all(text.as_bytes()).await?;
        self.file.flush().await
    }

    fn describe(&self) -> String {
        format!("'{}'", self.path.display())
    }
}

/// Adapts any async writer (e.g. `tokio::io::stdout()`).
pub struct WriterSink<W> {
    writer: W,
    label: String,
}

impl<W: AsyncWrite + Unpin + Send> WriterSink<W> {
    pub fn new(writer: W, label: impl Into<String>) -> Self {
        Self {
            writer,
            label: label.into(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> OutputSink for WriterSink<W> {
    async fn append(&mut self, text: &str) -> std::io::Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.flush().await
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}
