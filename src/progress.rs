//! Progress-callback trait for per-document batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as a batch processes each document. The CLI drives its progress
//! bar from these.
//!
//! # Example
//!
//! ```rust
//! use timetable2png::{ConversionProgressCallback, ConversionConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     written: AtomicUsize,
//! }
//!
//! impl ConversionProgressCallback for CountingCallback {
//!     fn on_document_complete(&self, idx: usize, total: usize, name: &str, groups: usize) {
//!         self.written.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{idx}/{total} {name}: {groups} groups");
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { written: AtomicUsize::new(0) });
//!
//! let config = ConversionConfig::builder()
//!     .progress_callback(counter as Arc<dyn ConversionProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the batch driver as it processes each document.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. `idx` is 1-indexed.
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once after discovery, before the first document.
    fn on_batch_start(&self, total: usize) {
        let _ = total;
    }

    /// Called before a document is read.
    fn on_document_start(&self, idx: usize, total: usize, name: &str) {
        let _ = (idx, total, name);
    }

    /// Called when a document's artefacts are written.
    ///
    /// * `groups` — number of group columns in the extracted schedule
    fn on_document_complete(&self, idx: usize, total: usize, name: &str, groups: usize) {
        let _ = (idx, total, name, groups);
    }

    /// Called when a document has no table for the current week.
    fn on_document_skipped(&self, idx: usize, total: usize, name: &str, reason: &str) {
        let _ = (idx, total, name, reason);
    }

    /// Called when a document cannot be read or its output cannot be written.
    fn on_document_error(&self, idx: usize, total: usize, name: &str, error: &str) {
        let _ = (idx, total, name, error);
    }

    /// Called once after every document has been attempted.
    fn on_batch_complete(&self, total: usize, written: usize) {
        let _ = (total, written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
