//! Image encoding: rendered canvas → PNG bytes.
//!
//! PNG keeps the one-pixel grid lines and small glyphs crisp; the flat
//! palette also compresses far better than any lossy format would.

use image::RgbImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered timetable as PNG.
pub fn encode_png(img: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    debug!(
        "Encoded {}x{} image → {} bytes PNG",
        img.width(),
        img.height(),
        buf.len()
    );
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn encode_small_image() {
        let img = RgbImage::from_pixel(10, 6, Rgb([47, 96, 85]));
        let data = encode_png(&img).expect("encode should succeed");
        assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&data).expect("valid png").to_rgb8();
        assert_eq!(decoded.dimensions(), (10, 6));
        assert_eq!(*decoded.get_pixel(3, 3), Rgb([47, 96, 85]));
    }
}
