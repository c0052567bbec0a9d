//! Pipeline stages for timetable extraction and rendering.
//!
//! Each submodule implements exactly one transformation step.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ markup ──▶ locate ──▶ header ──▶ schedule ──▶ layout ──▶ render ──▶ encode
//! (.docx)   (tree)    (+week)   (columns)  (+normalize)  (measure)   (draw)     (PNG)
//! ```
//!
//! 1. [`input`]    — unzip `word/document.xml`; discover batch files
//! 2. [`markup`]   — parse the XML into tables, rows, cells and paragraphs
//! 3. [`week`]     — the Monday–Sunday window a run considers current
//! 4. [`locate`]   — pick the last table carrying a date inside the window
//! 5. [`header`]   — group column identities from the header row and filename
//! 6. [`normalize`] — strip noise from subject text, map long names to short ones
//! 7. [`schedule`] — walk the rows into the group → day → slot → subject tree
//! 8. [`layout`]   — measure every label and freeze the canvas geometry
//! 9. [`render`]   — draw bands, grid and the winning subject of each slot
//! 10. [`encode`]  — PNG-encode the canvas
//!
//! Stages 3–9 are pure: they never touch the file system and never fail.
//! [`font`] supplies text metrics to both [`layout`] and [`render`].

pub mod encode;
pub mod font;
pub mod header;
pub mod input;
pub mod layout;
pub mod locate;
pub mod markup;
pub mod normalize;
pub mod render;
pub mod schedule;
pub mod week;
