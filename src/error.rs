//! Error types for the timetable2png library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`TimetableError`] — **Fatal** for one invocation: the document cannot be
//!   read at all (missing file, not a docx container, broken XML), or an
//!   artefact cannot be written. Returned as `Err(TimetableError)` from the
//!   top-level `convert*` functions.
//!
//! * [`DocumentError`] — **Non-fatal** for a batch: a single document had no
//!   table for the current week or could not be opened, but every other
//!   document is still processed. Stored inside
//!   [`crate::output::DocumentResult`].
//!
//! The extraction and rendering stages themselves never fail. A missing table
//! is an `Option::None`, an unparseable date is skipped, an unclassifiable
//! subject is dropped.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the timetable2png library.
#[derive(Debug, Error)]
pub enum TimetableError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("Document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a zip-based .docx container.
    #[error("File is not a valid .docx container: '{path}'\nFirst bytes: {magic:?}")]
    NotADocx { path: PathBuf, magic: [u8; 4] },

    /// The container opened but has no main document part.
    #[error("'{path}' has no {part} entry: {detail}")]
    MissingDocumentPart {
        path: PathBuf,
        part: &'static str,
        detail: String,
    },

    // ── Markup errors ─────────────────────────────────────────────────────
    /// document.xml is not well-formed.
    #[error("Document markup is malformed at byte {position}: {detail}")]
    MalformedMarkup { position: usize, detail: String },

    // ── Render errors ─────────────────────────────────────────────────────
    /// No usable TrueType font could be loaded.
    #[error("Failed to load font: {detail}\nPass --font /path/to/font.ttf or set TIMETABLE_FONT.")]
    FontLoadFailed { detail: String },

    /// PNG encoding of the rendered canvas failed.
    #[error("Failed to encode image: {0}")]
    ImageEncodeFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output artefact.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single document of a batch.
///
/// Stored in [`crate::output::DocumentResult`]; the batch continues with the
/// next document.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum DocumentError {
    /// No table in the document carries a date inside the current week.
    #[error("{file}: no table for the current week")]
    NoTableForWeek { file: String },

    /// The document could not be read or its artefacts could not be written.
    #[error("{file}: {detail}")]
    Unreadable { file: String, detail: String },
}

impl DocumentError {
    /// True when the document was skipped rather than failed.
    pub fn is_skip(&self) -> bool {
        matches!(self, DocumentError::NoTableForWeek { .. })
    }
}
