//! Output types returned by the conversion entry points.

use crate::error::DocumentError;
use crate::pipeline::layout::CanvasGeometry;
use crate::pipeline::schedule::ScheduleModel;
use crate::pipeline::week::WeekWindow;
use serde::Serialize;
use std::path::PathBuf;

/// In-memory result of converting one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentOutput {
    /// Filename stem, used for the header fallback and artefact names.
    pub stem: String,
    /// Week the schedule was extracted for.
    pub window: WeekWindow,
    /// The extracted schedule.
    pub model: ScheduleModel,
    /// Rendered image, absent when image output is disabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<RenderedImage>,
}

impl DocumentOutput {
    /// Number of group columns in the schedule.
    pub fn group_count(&self) -> usize {
        self.model.len()
    }
}

/// PNG bytes plus the geometry they were drawn with.
#[derive(Debug, Clone, Serialize)]
pub struct RenderedImage {
    pub geometry: CanvasGeometry,
    #[serde(skip)]
    pub png: Vec<u8>,
}

/// Paths of the artefacts persisted for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WrittenOutput {
    pub stem: String,
    pub groups: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

/// Outcome of one document in a batch.
///
/// Exactly one of `output` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentResult {
    /// 1-indexed position in the batch.
    pub index: usize,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<WrittenOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DocumentError>,
    pub duration_ms: u64,
}

impl DocumentResult {
    pub fn is_written(&self) -> bool {
        self.output.is_some()
    }

    pub fn is_skipped(&self) -> bool {
        self.error.as_ref().is_some_and(DocumentError::is_skip)
    }

    pub fn is_failed(&self) -> bool {
        self.error.as_ref().is_some_and(|e| !e.is_skip())
    }
}

/// Counters for a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchStats {
    /// Documents discovered.
    pub total: usize,
    /// Documents with artefacts persisted.
    pub written: usize,
    /// Documents without a table for the current week.
    pub skipped: usize,
    /// Documents that could not be read or written.
    pub failed: usize,
    pub duration_ms: u64,
}

impl BatchStats {
    /// Tally `results`.
    pub fn from_results(results: &[DocumentResult], duration_ms: u64) -> Self {
        Self {
            total: results.len(),
            written: results.iter().filter(|r| r.is_written()).count(),
            skipped: results.iter().filter(|r| r.is_skipped()).count(),
            failed: results.iter().filter(|r| r.is_failed()).count(),
            duration_ms,
        }
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutput {
    pub documents: Vec<DocumentResult>,
    pub stats: BatchStats,
}
