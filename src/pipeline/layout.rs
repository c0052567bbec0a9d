//! Measure pass: size the canvas before anything is drawn.
//!
//! Column widths depend on every row, so the whole model is measured first
//! and the result frozen into a [`CanvasGeometry`] for the draw pass.
//!
//! ```text
//!  rh   time_w        col[0]     col[1]  …
//! ┌──┬──────────────────────────────────┐  ─┐
//! │  │            title                 │   │ rh
//! │  ├────────┬──────────┬──────────────┤   │
//! │  │  ЧАС   │  ПІ-11   │  ПІ-12       │   │ rh
//! │D ├────────┼──────────┼──────────────┤   │
//! │A │ 8.30   │ …        │ …            │   │ rh × total_row_count
//! │Y │ …      │          │              │   │
//! └──┴────────┴──────────┴──────────────┘  ─┘
//! ```

use crate::config::RenderStyle;
use crate::pipeline::font::Typeface;
use crate::pipeline::schedule::ScheduleModel;
use serde::Serialize;
use tracing::debug;

/// Pixel geometry of one rendered timetable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CanvasGeometry {
    /// Final width: day band + time column + every group column.
    pub image_width: u32,
    /// Final height: title and header bands + one row per slot.
    pub image_height: u32,
    pub time_column_width: u32,
    /// One per group column, in model order.
    pub column_widths: Vec<u32>,
    /// Most (day, slot) pairs of any group.
    pub total_row_count: usize,
}

/// Measure `model` with `face`. Draws nothing.
pub fn measure(model: &ScheduleModel, style: &RenderStyle, face: &dyn Typeface) -> CanvasGeometry {
    let mut total_row_count = 0usize;
    let mut widest_time = 0u32;
    let mut column_widths = Vec::with_capacity(model.len());

    for (_, group) in model.iter() {
        total_row_count = total_row_count.max(group.row_count());
        let mut widest_subject = 0u32;
        for slots in group.days.values() {
            for (time, subjects) in slots {
                widest_time = widest_time.max(face.measure(time, style.body_px).width);
                for subject in subjects.keys() {
                    widest_subject =
                        widest_subject.max(face.measure(subject, style.body_px).width);
                }
            }
        }
        column_widths.push(widest_subject + style.padding_px);
    }

    let rh = style.row_height;
    let time_column_width = widest_time + style.padding_px;
    let geometry = CanvasGeometry {
        image_width: rh + time_column_width + column_widths.iter().sum::<u32>(),
        image_height: rh * (total_row_count as u32 + 2),
        time_column_width,
        column_widths,
        total_row_count,
    };
    debug!(
        "Canvas {}x{} px, {} rows, {} columns",
        geometry.image_width,
        geometry.image_height,
        geometry.total_row_count,
        geometry.column_widths.len()
    );
    geometry
}
