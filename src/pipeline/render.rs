//! Draw pass: paint a measured [`ScheduleModel`] onto a canvas.
//!
//! ## Why draw the day band sideways?
//!
//! Day names run vertically along the left edge of the final image. Text is
//! only ever drawn horizontally, so the day band is painted first on a canvas
//! with width and height swapped, and the canvas is then turned a quarter
//! turn counter-clockwise. Everything else is drawn on the upright canvas.
//!
//! ## Conflict resolution
//!
//! A slot holding several subjects shows exactly one, chosen by
//! [`pick_subject`]: blue beats black beats red. Within blue the later entry
//! wins; within black or red the earlier one is kept.

use crate::config::RenderStyle;
use crate::pipeline::font::Typeface;
use crate::pipeline::layout::CanvasGeometry;
use crate::pipeline::schedule::{PriorityColor, ScheduleModel, Slot};
use crate::pipeline::week::WeekWindow;
use image::imageops;
use image::{Rgb, RgbImage};
use tracing::debug;

/// Subject shown for a slot, with its colour. `None` for an empty slot.
pub fn pick_subject(slot: &Slot) -> Option<(&str, PriorityColor)> {
    let mut picked: Option<(&str, PriorityColor)> = None;
    for (subject, entry) in slot {
        let replace = match picked {
            None => true,
            Some((_, current)) => {
                entry.color == PriorityColor::Blue || entry.color.rank() > current.rank()
            }
        };
        if replace {
            picked = Some((subject.as_str(), entry.color));
        }
    }
    picked
}

/// Render `model` into an image of exactly `geometry`'s size.
pub fn render(
    model: &ScheduleModel,
    geometry: &CanvasGeometry,
    window: &WeekWindow,
    style: &RenderStyle,
    face: &dyn Typeface,
) -> RgbImage {
    let rh = style.row_height as i32;
    let body = style.body_px;

    // Day band, drawn sideways: last day nearest the origin.
    let mut sideways =
        RgbImage::from_pixel(geometry.image_height, geometry.image_width, style.background);
    if let Some((_, group)) = model.first() {
        let mut x = 0i32;
        for (day, slots) in group.days.iter().rev() {
            let span = slots.len() as i32 * rh;
            let text = face.measure(day, body);
            face.draw(
                &mut sideways,
                x + (span - text.width as i32) / 2,
                (rh - text.height as i32) / 2,
                day,
                body,
                style.white,
            );
            x += span;
        }
    }
    let mut img = imageops::rotate270(&sideways);
    let (w, h) = (img.width() as i32, img.height() as i32);

    // Title, frame, time column label.
    let title = format!("{} ({})", style.title_prefix, window.label());
    let text = face.measure(&title, style.title_px);
    face.draw(
        &mut img,
        (w - text.width as i32) / 2,
        (rh - text.height as i32) / 2,
        &title,
        style.title_px,
        style.white,
    );
    hline(&mut img, rh, w - 1, rh, 1, style.black);
    vline(&mut img, rh, 0, h - 1, style.black);

    let time_w = geometry.time_column_width as i32;
    let text = face.measure(&style.time_label, style.title_px);
    face.draw(
        &mut img,
        rh + (time_w - text.width as i32) / 2,
        rh - 2 + (rh - text.height as i32) / 2,
        &style.time_label,
        style.title_px,
        style.white,
    );

    // Time column and row separators, laid out from the first group.
    if let Some((_, group)) = model.first() {
        fill_rect(&mut img, rh + 1, rh * 2, rh + time_w, h - 1, style.accent);
        fill_rect(&mut img, rh + time_w + 1, rh * 2 + 1, w - 1, h - 1, style.white);

        let mut y = rh * 2;
        for slots in group.days.values() {
            for (slot_idx, time) in slots.keys().enumerate() {
                let text = face.measure(time, body);
                face.draw(
                    &mut img,
                    rh + (time_w - text.width as i32) / 2,
                    y - 1 + (rh - text.height as i32) / 2,
                    time,
                    body,
                    style.black,
                );
                if slot_idx == 0 {
                    hline(&mut img, 0, w - 1, y, 1, style.black);
                } else {
                    hline(&mut img, rh + 1, w - 1, y, 1, style.gray);
                }
                y += rh;
            }
        }
    }

    // Group headers and cells.
    let mut x = rh + time_w;
    fill_rect(&mut img, x, rh + 1, w - 1, rh * 2 - 1, style.accent);
    for ((name, group), &col_w) in model.iter().zip(&geometry.column_widths) {
        let col_w = col_w as i32;
        let text = face.measure(name, body);
        face.draw(
            &mut img,
            x + (col_w - text.width as i32) / 2,
            rh + (rh - text.height as i32) / 2,
            name,
            body,
            style.black,
        );
        vline(&mut img, x, rh, h - 1, style.black);

        let mut y = rh * 2;
        for slots in group.days.values() {
            for subjects in slots.values() {
                if let Some((subject, color)) = pick_subject(subjects) {
                    let text = face.measure(subject, body);
                    let tx = x + (col_w - text.width as i32) / 2;
                    face.draw(
                        &mut img,
                        tx,
                        y + (rh - text.height as i32) / 2,
                        subject,
                        body,
                        style.text_color(color),
                    );
                    if color == PriorityColor::Red {
                        hline(&mut img, tx, tx + text.width as i32, y + rh / 2, 2, style.red);
                    }
                }
                y += rh;
            }
        }
        x += col_w;
    }

    debug!("Rendered {}x{} px", img.width(), img.height());
    img
}

/// Fill the inclusive rectangle `(x0, y0)..=(x1, y1)`, clipped to the image.
fn fill_rect(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(img.width() as i32 - 1);
    let y1 = y1.min(img.height() as i32 - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            img.put_pixel(x as u32, y as u32, color);
        }
    }
}

fn hline(img: &mut RgbImage, x0: i32, x1: i32, y: i32, thickness: i32, color: Rgb<u8>) {
    fill_rect(img, x0, y, x1, y + thickness - 1, color);
}

fn vline(img: &mut RgbImage, x: i32, y0: i32, y1: i32, color: Rgb<u8>) {
    fill_rect(img, x, y0, x, y1, color);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::font::testing::BlockFace;
    use crate::pipeline::layout::measure;
    use crate::pipeline::schedule::{EntryKind, ScheduleEntry};
    use chrono::NaiveDate;
    use PriorityColor::{Black, Blue, Red};

    fn slot(entries: &[(&str, PriorityColor)]) -> Slot {
        entries
            .iter()
            .map(|(s, c)| {
                (
                    s.to_string(),
                    ScheduleEntry {
                        kind: EntryKind::Unspecified,
                        color: *c,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn black_beats_red() {
        assert_eq!(pick_subject(&slot(&[("a", Red), ("b", Black)])), Some(("b", Black)));
        assert_eq!(pick_subject(&slot(&[("b", Black), ("a", Red)])), Some(("b", Black)));
    }

    #[test]
    fn blue_beats_red_and_black() {
        assert_eq!(pick_subject(&slot(&[("a", Blue), ("b", Red)])), Some(("a", Blue)));
        assert_eq!(
            pick_subject(&slot(&[("a", Black), ("b", Blue), ("c", Black)])),
            Some(("b", Blue))
        );
    }

    #[test]
    fn later_blue_replaces_earlier_blue() {
        assert_eq!(pick_subject(&slot(&[("a", Blue), ("b", Blue)])), Some(("b", Blue)));
    }

    // Asymmetric on purpose: only the top tier is last-write-wins.
    #[test]
    fn first_black_and_first_red_are_kept() {
        assert_eq!(pick_subject(&slot(&[("a", Black), ("b", Black)])), Some(("a", Black)));
        assert_eq!(pick_subject(&slot(&[("a", Red), ("b", Red)])), Some(("a", Red)));
    }

    #[test]
    fn empty_slot_shows_nothing() {
        assert_eq!(pick_subject(&Slot::new()), None);
    }

    fn sample() -> (ScheduleModel, WeekWindow) {
        let mut m = ScheduleModel::default();
        let e = |color| ScheduleEntry {
            kind: EntryKind::Lecture,
            color,
        };
        m.insert_entry("A", "ПН", "1", "Фізика".into(), e(Blue));
        m.insert_entry("A", "ПН", "2", "Хімія".into(), e(Red));
        m.insert_entry("A", "ВТ", "1", "Мова".into(), e(Black));
        let window = WeekWindow::for_date(NaiveDate::from_ymd_opt(2023, 8, 7).unwrap());
        (m, window)
    }

    #[test]
    fn image_matches_geometry() {
        let (m, window) = sample();
        let style = RenderStyle::default();
        let g = measure(&m, &style, &BlockFace);
        let img = render(&m, &g, &window, &style, &BlockFace);
        assert_eq!((img.width(), img.height()), (g.image_width, g.image_height));
    }

    #[test]
    fn cells_use_entry_colors_and_bands() {
        let (m, window) = sample();
        let style = RenderStyle::default();
        let g = measure(&m, &style, &BlockFace);
        let img = render(&m, &g, &window, &style, &BlockFace);

        let rh = style.row_height;
        let cx = rh + g.time_column_width + g.column_widths[0] / 2;
        let row_mid = |row: u32| rh * (2 + row) + rh / 2 - 2;
        assert_eq!(*img.get_pixel(cx, row_mid(0)), style.blue);
        assert_eq!(*img.get_pixel(cx, row_mid(1)), style.red);
        assert_eq!(*img.get_pixel(cx, row_mid(2)), style.black);

        // Title band and white cell area around the text.
        assert_eq!(*img.get_pixel(g.image_width - 1, 0), style.background);
        assert_eq!(*img.get_pixel(g.image_width - 2, row_mid(0)), style.white);
        // Time column background.
        assert_eq!(*img.get_pixel(rh + 2, rh * 2 + 2), style.accent);
    }

    #[test]
    fn red_entry_gets_strike() {
        let (m, window) = sample();
        let style = RenderStyle::default();
        let g = measure(&m, &style, &BlockFace);
        let img = render(&m, &g, &window, &style, &BlockFace);

        let rh = style.row_height;
        let col_x = rh + g.time_column_width;
        let text_w = 5 * 9;
        let tx = col_x + (g.column_widths[0] - text_w) / 2;
        // The strike runs one pixel past the glyph block's right edge.
        let y = rh * 3 + rh / 2;
        assert_eq!(*img.get_pixel(tx + text_w, y), style.red);
        assert_eq!(*img.get_pixel(tx + text_w, y + 1), style.red);
        assert_eq!(*img.get_pixel(tx + text_w + 1, y), style.white);
    }

    #[test]
    fn empty_model_renders_minimal_canvas() {
        let style = RenderStyle::default();
        let m = ScheduleModel::default();
        let g = measure(&m, &style, &BlockFace);
        let window = WeekWindow::for_date(NaiveDate::from_ymd_opt(2023, 8, 7).unwrap());
        let img = render(&m, &g, &window, &style, &BlockFace);
        assert_eq!((img.width(), img.height()), (45, 50));
    }
}
