//! Text metrics and glyph drawing.
//!
//! Both render passes go through [`Typeface`]: the layout pass only calls
//! [`Typeface::measure`], the draw pass calls [`Typeface::draw`]. Using the
//! same face for both is what guarantees every label fits its cell.
//!
//! [`TrueTypeFont`] is the production implementation on top of `rusttype`.

use crate::error::TimetableError;
use image::{Rgb, RgbImage};
use rusttype::{point, Font, Scale};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Rendered extent of a string, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBox {
    pub width: u32,
    pub height: u32,
}

/// A font able to measure and draw single-line text.
pub trait Typeface: Send + Sync {
    /// Extent of `text` at `px` pixels per em.
    fn measure(&self, text: &str, px: f32) -> TextBox;

    /// Draw `text` with its top-left corner at `(x, y)`. Pixels outside the
    /// image are clipped.
    fn draw(&self, img: &mut RgbImage, x: i32, y: i32, text: &str, px: f32, color: Rgb<u8>);
}

/// Places probed when no font path is configured.
pub const FONT_CANDIDATES: &[&str] = &[
    "res/arial.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// TrueType/OpenType font rasterised with `rusttype`.
pub struct TrueTypeFont {
    font: Font<'static>,
    source: String,
}

impl std::fmt::Debug for TrueTypeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("source", &self.source)
            .finish()
    }
}

impl TrueTypeFont {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, TimetableError> {
        Self::parse(bytes, "<memory>".to_string())
    }

    pub fn from_path(path: &Path) -> Result<Self, TimetableError> {
        let bytes = std::fs::read(path).map_err(|e| TimetableError::FontLoadFailed {
            detail: format!("{}: {}", path.display(), e),
        })?;
        Self::parse(bytes, path.display().to_string())
    }

    /// First readable font among [`FONT_CANDIDATES`].
    pub fn discover() -> Result<Self, TimetableError> {
        for candidate in FONT_CANDIDATES {
            let path = PathBuf::from(candidate);
            if path.is_file() {
                match Self::from_path(&path) {
                    Ok(font) => return Ok(font),
                    Err(e) => debug!("Font candidate rejected: {}", e),
                }
            }
        }
        Err(TimetableError::FontLoadFailed {
            detail: format!("no font found in {} known locations", FONT_CANDIDATES.len()),
        })
    }

    fn parse(bytes: Vec<u8>, source: String) -> Result<Self, TimetableError> {
        let font = Font::try_from_vec(bytes).ok_or_else(|| TimetableError::FontLoadFailed {
            detail: format!("{source}: not a TrueType/OpenType font"),
        })?;
        debug!("Loaded font from {}", source);
        Ok(Self { font, source })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl Typeface for TrueTypeFont {
    fn measure(&self, text: &str, px: f32) -> TextBox {
        let scale = Scale::uniform(px);
        let v = self.font.v_metrics(scale);
        let width = self
            .font
            .layout(text, scale, point(0.0, v.ascent))
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .fold(0.0f32, f32::max);
        TextBox {
            width: width.ceil() as u32,
            height: (v.ascent - v.descent).ceil() as u32,
        }
    }

    fn draw(&self, img: &mut RgbImage, x: i32, y: i32, text: &str, px: f32, color: Rgb<u8>) {
        let scale = Scale::uniform(px);
        let v = self.font.v_metrics(scale);
        let origin = point(x as f32, y as f32 + v.ascent);
        let (w, h) = (img.width() as i32, img.height() as i32);

        for glyph in self.font.layout(text, scale, origin) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = bb.min.x + gx as i32;
                let py = bb.min.y + gy as i32;
                if px < 0 || py < 0 || px >= w || py >= h {
                    return;
                }
                let dst = img.get_pixel_mut(px as u32, py as u32);
                for c in 0..3 {
                    let bg = f32::from(dst.0[c]);
                    let fg = f32::from(color.0[c]);
                    dst.0[c] = (bg + (fg - bg) * coverage).round() as u8;
                }
            });
        }
    }
}
