//! # timetable2png
//!
//! Extract the current week's timetable from `.docx` schedules and render it
//! to a PNG.
//!
//! Faculty schedules are kept as one Word document per student group,
//! with a new table appended every week. This crate finds the table for the
//! current week, turns it into a structured group → day → slot → subject
//! record, and draws that record as a compact, self-sized image.
//!
//! ## Pipeline Overview
//!
//! ```text
//! .docx
//!  │
//!  ├─ 1. Input     unzip word/document.xml
//!  ├─ 2. Markup    parse tables / rows / cells / paragraphs
//!  ├─ 3. Locate    last table with a date inside the week window
//!  ├─ 4. Header    group columns from the header row + filename
//!  ├─ 5. Schedule  rows → record, subjects cleaned and shortened
//!  ├─ 6. Measure   size every column from the widest label
//!  ├─ 7. Draw      bands, grid, one subject per slot (blue > black > red)
//!  └─ 8. Output    <out>/json/<stem>.json + <out>/pics/<stem>.png
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use timetable2png::{convert_to_dir, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .output_dir("res")
//!         .font_path("res/arial.ttf")
//!         .build()?;
//!     match convert_to_dir("test_cases/ПІ-11.docx", &config).await? {
//!         Some(out) => eprintln!("{} groups → {:?}", out.groups, out.image_path),
//!         None => eprintln!("no table for this week"),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `timetable2png` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! timetable2png = { version = "0.5", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, RenderStyle};
pub use convert::{
    convert_dir, convert_document, convert_file, convert_file_sync, convert_to_dir,
    extract_schedule, render_png, resolve_typeface, week_window, write_output,
};
pub use error::{DocumentError, TimetableError};
pub use output::{
    BatchOutput, BatchStats, DocumentOutput, DocumentResult, RenderedImage, WrittenOutput,
};
pub use pipeline::font::{TextBox, TrueTypeFont, Typeface};
pub use pipeline::layout::CanvasGeometry;
pub use pipeline::schedule::{EntryKind, PriorityColor, ScheduleEntry, ScheduleModel};
pub use pipeline::week::WeekWindow;
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
pub use stream::{convert_dir_stream, DocumentStream};
