//! Progress-callback trait for chunk-level submission events.
//!
//! Inject an [`Arc<dyn ChunkProgressCallback>`] via
//! [`crate::config::DocAiConfigBuilder::progress_callback`] to follow a run
//! as it moves through its states:
//!
//! ```text
//! NotStarted ──on_submission_start──▶ InProgress(0) ──on_chunk_complete──▶ InProgress(1) … ──▶ Completed
//!                                          │
//!                                          └──on_chunk_error──▶ Failed
//! ```
//!
//! `on_submission_complete` fires only on the `Completed` path; after
//! `on_chunk_error` no further events are emitted for that run.
//!
//! # Example
//!
//! ```rust
//! use docai_submit::{ChunkProgressCallback, DocAiConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CharCounter {
//!     chars: AtomicUsize,
//! }
//!
//! impl ChunkProgressCallback for CharCounter {
//!     fn on_chunk_complete(&self, _chunk: usize, _total: usize, text_len: usize) {
//!         self.chars.fetch_add(text_len, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = Arc::new(CharCounter { chars: AtomicUsize::new(0) });
//!
//! let config = DocAiConfig::builder()
//!     .progress_callback(counter as Arc<dyn ChunkProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the submitter as it processes each chunk.
///
/// Chunks are processed one at a time, but the trait is `Send + Sync` so a
/// single callback can be shared with other tasks (e.g. a UI thread).
/// All methods default to no-ops.
///
/// Chunk numbers passed to every method are 1-indexed.
pub trait ChunkProgressCallback: Send + Sync {
    /// Called once, after planning, before the first chunk is built.
    ///
    /// # Arguments
    /// * `total_pages`  — pages in the source document
    /// * `total_chunks` — chunks that will be submitted
    fn on_submission_start(&self, total_pages: usize, total_chunks: usize) {
        let _ = (total_pages, total_chunks);
    }

    /// Called before a chunk is built and sent.
    ///
    /// # Arguments
    /// * `chunk`        — 1-indexed chunk number
    /// * `total_chunks` — number of chunks in the run
    /// * `first_page`   — 1-indexed first page of the chunk
    /// * `last_page`    — 1-indexed last page of the chunk (inclusive)
    fn on_chunk_start(&self, chunk: usize, total_chunks: usize, first_page: usize, last_page: usize) {
        let _ = (chunk, total_chunks, first_page, last_page);
    }

    /// Called once the chunk's text has been extracted and, during
    /// [`crate::submit::Submitter::submit`], appended to the sink.
    ///
    /// `text_len` counts characters, not bytes.
    fn on_chunk_complete(&self, chunk: usize, total_chunks: usize, text_len: usize) {
        let _ = (chunk, total_chunks, text_len);
    }

    /// Called when a chunk fails to build, extract or reach the sink; the
    /// run stops right after.
    fn on_chunk_error(&self, chunk: usize, total_chunks: usize, error: &str) {
        let _ = (chunk, total_chunks, error);
    }

    /// Called once after every chunk has been appended to the sink.
    fn on_submission_complete(&self, total_chunks: usize, total_chars: usize) {
        let _ = (total_chunks, total_chars);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ChunkProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DocAiConfig`].
pub type ProgressCallback = Arc<dyn ChunkProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct EventLog {
        events: Mutex<Vec<String>>,
    }

    impl ChunkProgressCallback for EventLog {
        fn on_submission_start(&self, total_pages: usize, total_chunks: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("start {total_pages}/{total_chunks}"));
        }

        fn on_chunk_start(&self, chunk: usize, _total: usize, first: usize, last: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("chunk {chunk} {first}-{last}"));
        }

        fn on_chunk_error(&self, chunk: usize, _total: usize, error: &str) {
            self.events
                .lock()
                .unwrap()
                .push(format!("error {chunk} {error}"));
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_submission_start(16, 2);
        cb.on_chunk_start(1, 2, 1, 15);
        cb.on_chunk_complete(1, 2, 42);
        cb.on_chunk_error(2, 2, "boom");
        cb.on_submission_complete(2, 42);
    }

    #[test]
    fn overridden_methods_receive_events_and_defaults_stay_silent() {
        let log = EventLog::default();
        log.on_submission_start(16, 2);
        log.on_chunk_start(1, 2, 1, 15);
        log.on_chunk_complete(1, 2, 10);
        log.on_chunk_start(2, 2, 16, 16);
        log.on_chunk_error(2, 2, "HTTP 500");

        let events = log.events.lock().unwrap();
        assert_eq!(
            *events,
            vec!["start 16/2", "chunk 1 1-15", "chunk 2 16-16", "error 2 HTTP 500"]
        );
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_submission_start(3, 1);
        cb.on_chunk_complete(1, 1, 512);
    }
}
