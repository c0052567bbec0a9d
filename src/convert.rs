//! Eager conversion entry points.
//!
//! From the innermost to the outermost:
//!
//! * [`extract_schedule`] — markup bytes → [`ScheduleModel`], no rendering
//! * [`convert_document`] — markup bytes → schedule + PNG, in memory
//! * [`convert_file`] / [`convert_file_sync`] — a `.docx` on disk, in memory
//! * [`convert_to_dir`] — a `.docx` on disk, artefacts persisted
//! * [`convert_dir`] — every `.docx` of a directory, one after another
//!
//! A document without a table for the current week is not an error: every
//! level reports it as `None` and nothing is written for it.

use crate::config::ConversionConfig;
use crate::error::{DocumentError, TimetableError};
use crate::output::{
    BatchOutput, BatchStats, DocumentOutput, DocumentResult, RenderedImage, WrittenOutput,
};
use crate::pipeline::font::{TrueTypeFont, Typeface};
use crate::pipeline::schedule::ScheduleModel;
use crate::pipeline::week::WeekWindow;
use crate::pipeline::{encode, header, input, layout, locate, markup, render, schedule};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Run the extraction stages over `word/document.xml` bytes.
///
/// # Returns
/// `Ok(None)` when no table carries a date inside `window`.
///
/// # Errors
/// Only [`TimetableError::MalformedMarkup`].
pub fn extract_schedule(
    xml: &[u8],
    file_stem: &str,
    window: &WeekWindow,
) -> Result<Option<ScheduleModel>, TimetableError> {
    let document = markup::parse_document(xml)?;
    debug!("{}: {} tables", file_stem, document.tables.len());

    let Some(table) = locate::locate_table(&document, window) else {
        return Ok(None);
    };
    let columns = header::extract_headers(table, file_stem);
    debug!("{}: {} group columns", file_stem, columns.columns().len());
    Ok(Some(schedule::build_schedule(table, &columns)))
}

/// The reporting week for this run: `config.today` if set, else the local date.
pub fn week_window(config: &ConversionConfig) -> WeekWindow {
    config
        .today
        .map(WeekWindow::for_date)
        .unwrap_or_else(WeekWindow::current)
}

/// Measure, draw and PNG-encode `model`.
pub fn render_png(
    model: &ScheduleModel,
    window: &WeekWindow,
    config: &ConversionConfig,
) -> Result<RenderedImage, TimetableError> {
    let face = resolve_typeface(config)?;
    render_with(model, window, config, face.as_ref())
}

fn render_with(
    model: &ScheduleModel,
    window: &WeekWindow,
    config: &ConversionConfig,
    face: &dyn Typeface,
) -> Result<RenderedImage, TimetableError> {
    let geometry = layout::measure(model, &config.style, face);
    let img = render::render(model, &geometry, window, &config.style, face);
    let png = encode::encode_png(&img)
        .map_err(|e| TimetableError::ImageEncodeFailed(e.to_string()))?;
    Ok(RenderedImage { geometry, png })
}

/// Convert one document's markup entirely in memory.
///
/// The image is only rendered when `config.write_image` is set, so a
/// record-only run needs no font.
pub fn convert_document(
    xml: &[u8],
    file_stem: &str,
    config: &ConversionConfig,
) -> Result<Option<DocumentOutput>, TimetableError> {
    let window = week_window(config);
    let Some(model) = extract_schedule(xml, file_stem, &window)? else {
        info!("{}: no table for week {}", file_stem, window.label());
        return Ok(None);
    };

    let image = if config.write_image {
        Some(render_png(&model, &window, config)?)
    } else {
        None
    };

    Ok(Some(DocumentOutput {
        stem: file_stem.to_string(),
        window,
        model,
        image,
    }))
}

fn convert_file_blocking(
    path: &Path,
    config: &ConversionConfig,
) -> Result<Option<DocumentOutput>, TimetableError> {
    let xml = input::read_document_xml(path)?;
    convert_document(&xml, &input::document_stem(path), config)
}

/// Convert a `.docx` file in memory.
///
/// Parsing and rasterisation are CPU-bound, so the work runs in
/// `spawn_blocking`.
pub async fn convert_file(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Option<DocumentOutput>, TimetableError> {
    let path = path.as_ref().to_path_buf();
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_file_blocking(&path, &config))
        .await
        .map_err(|e| TimetableError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Synchronous counterpart of [`convert_file`].
pub fn convert_file_sync(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Option<DocumentOutput>, TimetableError> {
    convert_file_blocking(path.as_ref(), config)
}

/// Convert a `.docx` file and persist its record and image.
///
/// Uses atomic writes (temp file + rename) so a crash never leaves a
/// truncated artefact behind. Nothing is written when the document has no
/// table for the current week.
pub async fn convert_to_dir(
    path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<Option<WrittenOutput>, TimetableError> {
    let Some(output) = convert_file(path, config).await? else {
        return Ok(None);
    };
    write_output(&output, config).await.map(Some)
}

/// Persist `output` under `config.output_dir`, creating `json/` and `pics/`
/// on demand.
pub async fn write_output(
    output: &DocumentOutput,
    config: &ConversionConfig,
) -> Result<WrittenOutput, TimetableError> {
    let mut written = WrittenOutput {
        stem: output.stem.clone(),
        groups: output.group_count(),
        ..WrittenOutput::default()
    };

    if config.write_record {
        let json = output
            .model
            .to_json_pretty()
            .map_err(|e| TimetableError::Internal(format!("Record serialisation failed: {}", e)))?;
        let path = config.record_dir().join(format!("{}.json", output.stem));
        write_atomic(&path, &json).await?;
        written.record_path = Some(path);
    }

    if let Some(image) = &output.image {
        let path = config.image_dir().join(format!("{}.png", output.stem));
        write_atomic(&path, &image.png).await?;
        written.image_path = Some(path);
    }

    info!(
        "{}: {} groups written to {}",
        output.stem,
        written.groups,
        config.output_dir.display()
    );
    Ok(written)
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), TimetableError> {
    let fail = |source| TimetableError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }

    let ext = path
        .extension()
        .map(|e| format!("{}.tmp", e.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let tmp_path = path.with_extension(ext);
    tokio::fs::write(&tmp_path, bytes).await.map_err(fail)?;
    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(fail(e));
    }
    Ok(())
}

/// Convert every `.docx` in `dir`, one document at a time.
///
/// Per-document failures are recorded in [`DocumentResult::error`] and the
/// batch moves on.
///
/// # Errors
/// Returns `Err` only when `dir` cannot be listed or, with image output
/// enabled, no font can be loaded.
pub async fn convert_dir(
    dir: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<BatchOutput, TimetableError> {
    let start = Instant::now();
    let dir = dir.as_ref();
    let paths = input::list_documents(dir)?;
    let config = prepare_batch(config)?;
    let total = paths.len();
    info!("Converting {} documents from {}", total, dir.display());

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut documents = Vec::with_capacity(total);
    for (i, path) in paths.into_iter().enumerate() {
        documents.push(process_document(i + 1, total, path, &config).await);
    }

    let stats = BatchStats::from_results(&documents, start.elapsed().as_millis() as u64);
    info!(
        "Batch complete: {} written, {} skipped, {} failed of {} in {}ms",
        stats.written, stats.skipped, stats.failed, stats.total, stats.duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, stats.written);
    }

    Ok(BatchOutput { documents, stats })
}

// ── Internal helpers ─────────────────────────────────────────────────────

/// Resolve the font once per batch instead of once per document.
pub(crate) fn prepare_batch(config: &ConversionConfig) -> Result<ConversionConfig, TimetableError> {
    let mut config = config.clone();
    if config.write_image && config.typeface.is_none() {
        config.typeface = Some(resolve_typeface(&config)?);
    }
    Ok(config)
}

/// Convert and persist one batch member, reporting through the callback.
pub(crate) async fn process_document(
    index: usize,
    total: usize,
    path: PathBuf,
    config: &ConversionConfig,
) -> DocumentResult {
    let start = Instant::now();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let cb = config.progress_callback.as_ref();
    if let Some(cb) = cb {
        cb.on_document_start(index, total, &name);
    }

    let (output, error) = match convert_to_dir(&path, config).await {
        Ok(Some(written)) => {
            if let Some(cb) = cb {
                cb.on_document_complete(index, total, &name, written.groups);
            }
            (Some(written), None)
        }
        Ok(None) => {
            let err = DocumentError::NoTableForWeek { file: name.clone() };
            info!("Skipping {}", err);
            if let Some(cb) = cb {
                cb.on_document_skipped(index, total, &name, &err.to_string());
            }
            (None, Some(err))
        }
        Err(e) => {
            warn!("Failed to convert {}: {}", name, e);
            if let Some(cb) = cb {
                cb.on_document_error(index, total, &name, &e.to_string());
            }
            let err = DocumentError::Unreadable {
                file: name.clone(),
                detail: e.to_string(),
            };
            (None, Some(err))
        }
    };

    DocumentResult {
        index,
        path,
        output,
        error,
        duration_ms: start.elapsed().as_millis() as u64,
    }
}

/// Resolve the typeface, from most-specific to least-specific.
///
/// 1. **Pre-built typeface** (`config.typeface`) — used as-is; tests inject
///    a deterministic face this way.
/// 2. **Font path** (`config.font_path`) — loaded from disk.
/// 3. **Environment** (`TIMETABLE_FONT`) — loaded from disk when non-empty.
/// 4. **Discovery** — the first readable font among the well-known system
///    locations in [`crate::pipeline::font::FONT_CANDIDATES`].
pub fn resolve_typeface(config: &ConversionConfig) -> Result<Arc<dyn Typeface>, TimetableError> {
    if let Some(ref face) = config.typeface {
        return Ok(Arc::clone(face));
    }

    if let Some(ref path) = config.font_path {
        return Ok(Arc::new(TrueTypeFont::from_path(path)?));
    }

    if let Ok(path) = std::env::var("TIMETABLE_FONT") {
        if !path.is_empty() {
            return Ok(Arc::new(TrueTypeFont::from_path(Path::new(&path))?));
        }
    }

    let font = TrueTypeFont::discover()?;
    debug!("Discovered font at {}", font.source());
    Ok(Arc::new(font))
}
