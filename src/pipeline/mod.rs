//! Pipeline stages for chunked submission.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ plan ──▶ split ──▶ extract ──▶ sink
//! (URL/path) (ranges) (lopdf)   (REST)     (append)
//! ```
//!
//! 1. [`input`]   — read the user-supplied path or download the URL, check
//!    the `%PDF` magic
//! 2. [`plan`]    — pure page-range arithmetic, no I/O
//! 3. [`split`]   — parse once, then build one standalone PDF per range; runs
//!    in `spawn_blocking`
//! 4. [`extract`] — the only stage with network I/O; behind the
//!    [`extract::Extractor`] trait so tests can swap it out
//! 5. [`sink`]    — append-only destinations for the text

pub mod extract;
pub mod input;
pub mod plan;
pub mod sink;
pub mod split;
