//! Configuration types for timetable extraction and rendering.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Drawing constants live in
//! [`RenderStyle`], an immutable value handed to both the measure pass and
//! the draw pass so the two can never disagree.

use crate::error::TimetableError;
use crate::pipeline::font::Typeface;
use crate::pipeline::schedule::PriorityColor;
use crate::progress::ProgressCallback;
use chrono::NaiveDate;
use image::Rgb;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for a timetable conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use timetable2png::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .output_dir("out")
///     .today(chrono::NaiveDate::from_ymd_opt(2023, 8, 7).unwrap())
///     .write_image(false)
///     .build()
///     .unwrap();
/// assert!(!config.write_image);
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Root of the persisted artefacts. Default: `./res`.
    ///
    /// Records are written to `<output_dir>/json/<stem>.json` and images to
    /// `<output_dir>/pics/<stem>.png`.
    pub output_dir: PathBuf,

    /// TrueType font for measuring and drawing labels.
    /// If None, well-known system locations are probed.
    pub font_path: Option<PathBuf>,

    /// Pre-constructed typeface. Takes precedence over `font_path`.
    pub typeface: Option<Arc<dyn Typeface>>,

    /// Date that decides the reporting week. Default: the local current date.
    pub today: Option<NaiveDate>,

    /// Palette and metrics for the rendered image.
    pub style: RenderStyle,

    /// Persist the JSON record. Default: true.
    pub write_record: bool,

    /// Persist the PNG image. Default: true.
    pub write_image: bool,

    /// Receives per-document events during batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("res"),
            font_path: None,
            typeface: None,
            today: None,
            style: RenderStyle::default(),
            write_record: true,
            write_image: true,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("output_dir", &self.output_dir)
            .field("font_path", &self.font_path)
            .field("typeface", &self.typeface.as_ref().map(|_| "<dyn Typeface>"))
            .field("today", &self.today)
            .field("style", &self.style)
            .field("write_record", &self.write_record)
            .field("write_image", &self.write_image)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Directory receiving JSON records.
    pub fn record_dir(&self) -> PathBuf {
        self.output_dir.join("json")
    }

    /// Directory receiving PNG images.
    pub fn image_dir(&self) -> PathBuf {
        self.output_dir.join("pics")
    }
}

/// Builder for [`ConversionConfig`].
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl fmt::Debug for ConversionConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ConversionConfigBuilder {
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn typeface(mut self, face: Arc<dyn Typeface>) -> Self {
        self.config.typeface = Some(face);
        self
    }

    pub fn today(mut self, date: NaiveDate) -> Self {
        self.config.today = Some(date);
        self
    }

    pub fn style(mut self, style: RenderStyle) -> Self {
        self.config.style = style;
        self
    }

    pub fn write_record(mut self, v: bool) -> Self {
        self.config.write_record = v;
        self
    }

    pub fn write_image(mut self, v: bool) -> Self {
        self.config.write_image = v;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, TimetableError> {
        let c = &self.config;
        if c.output_dir.as_os_str().is_empty() {
            return Err(TimetableError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        c.style.validate()?;
        Ok(self.config)
    }
}

// ── Render style ─────────────────────────────────────────────────────────

/// Immutable palette and metrics of the rendered timetable.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderStyle {
    /// Canvas background and the title/day bands.
    pub background: Rgb<u8>,
    /// Time column and group header band.
    pub accent: Rgb<u8>,
    /// Cell area and band labels.
    pub white: Rgb<u8>,
    /// Grid lines and neutral text.
    pub black: Rgb<u8>,
    /// Separators between slots of one day.
    pub gray: Rgb<u8>,
    /// Cancelled entries and their strike.
    pub red: Rgb<u8>,
    /// Replacement entries.
    pub blue: Rgb<u8>,
    /// Pixels per em for body text.
    pub body_px: f32,
    /// Pixels per em for the title and the time column label.
    pub title_px: f32,
    /// Added to the widest label of every column.
    pub padding_px: u32,
    pub row_height: u32,
    /// Title reads `"<prefix> (YYYY.MM.DD - YYYY.MM.DD)"`.
    pub title_prefix: String,
    pub time_label: String,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            background: Rgb([47, 96, 85]),
            accent: Rgb([92, 141, 135]),
            white: Rgb([255, 255, 255]),
            black: Rgb([0, 0, 0]),
            gray: Rgb([191, 191, 191]),
            red: Rgb([255, 0, 0]),
            blue: Rgb([0, 112, 192]),
            body_px: 18.0,
            title_px: 21.0,
            padding_px: 20,
            row_height: 25,
            title_prefix: "Розклад".to_string(),
            time_label: "ЧАС".to_string(),
        }
    }
}

impl RenderStyle {
    /// Text colour of a subject entry.
    pub fn text_color(&self, color: PriorityColor) -> Rgb<u8> {
        match color {
            PriorityColor::Black => self.black,
            PriorityColor::Red => self.red,
            PriorityColor::Blue => self.blue,
        }
    }

    fn validate(&self) -> Result<(), TimetableError> {
        if self.row_height < 4 {
            return Err(TimetableError::InvalidConfig(format!(
                "Row height must be ≥ 4 px, got {}",
                self.row_height
            )));
        }
        for (name, px) in [("body", self.body_px), ("title", self.title_px)] {
            if !(px.is_finite() && px > 0.0) {
                return Err(TimetableError::InvalidConfig(format!(
                    "{name} font size must be positive, got {px}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.record_dir(), PathBuf::from("res/json"));
        assert_eq!(c.image_dir(), PathBuf::from("res/pics"));
        assert!(c.write_record && c.write_image);
        assert_eq!(c.style.row_height, 25);
        assert_eq!(c.style.padding_px, 20);
    }

    #[test]
    fn builder_sets_fields() {
        let c = ConversionConfig::builder()
            .output_dir("/tmp/x")
            .font_path("/fonts/a.ttf")
            .write_record(false)
            .build()
            .unwrap();
        assert_eq!(c.output_dir, PathBuf::from("/tmp/x"));
        assert_eq!(c.font_path, Some(PathBuf::from("/fonts/a.ttf")));
        assert!(!c.write_record);
    }

    #[test]
    fn builder_rejects_bad_style() {
        let style = RenderStyle {
            body_px: 0.0,
            ..RenderStyle::default()
        };
        let err = ConversionConfig::builder().style(style).build().unwrap_err();
        assert!(matches!(err, TimetableError::InvalidConfig(_)));

        let err = ConversionConfig::builder().output_dir("").build().unwrap_err();
        assert!(matches!(err, TimetableError::InvalidConfig(_)));
    }

    #[test]
    fn entry_colors() {
        let s = RenderStyle::default();
        assert_eq!(s.text_color(PriorityColor::Blue), Rgb([0, 112, 192]));
        assert_eq!(s.text_color(PriorityColor::Red), Rgb([255, 0, 0]));
        assert_eq!(s.text_color(PriorityColor::Black), Rgb([0, 0, 0]));
    }
}
