//! Markup tree: `word/document.xml` → tables of rows of cells of paragraphs.
//!
//! Only the subset of WordprocessingML the timetables actually use is kept.
//! Elements are matched by local name (`tbl`, `tr`, `tc`, `p`, `t`, `color`)
//! so the namespace prefix chosen by the authoring tool does not matter.
//!
//! A table nested inside a cell becomes its own candidate table; its rows do
//! not leak into the enclosing table. Tables are listed in the order their
//! opening tag appears in the document.

use crate::error::TimetableError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One `w:p` inside a table cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    /// Concatenation of every `w:t` run.
    pub text: String,
    /// `w:val` of every `w:color` found in the paragraph's run properties.
    pub colors: Vec<String>,
}

impl Paragraph {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            colors: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.colors.push(color.into());
        self
    }

    pub fn has_color(&self, hex: &str) -> bool {
        self.colors.iter().any(|c| c.eq_ignore_ascii_case(hex))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cell {
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    /// Paragraph texts joined by a single space, trimmed.
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub tables: Vec<Table>,
}

/// A table under construction. `slot` is its position in document order.
#[derive(Default)]
struct TableFrame {
    slot: usize,
    rows: Vec<Row>,
    row: Option<Row>,
    cell: Option<Cell>,
}

fn current_cell(frames: &mut [TableFrame]) -> Option<&mut Cell> {
    frames.last_mut().and_then(|f| f.cell.as_mut())
}

fn color_value(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"val")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Parse document.xml bytes into a [`Document`].
pub fn parse_document(xml: &[u8]) -> Result<Document, TimetableError> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();

    let mut frames: Vec<TableFrame> = Vec::new();
    let mut slots: Vec<Option<Table>> = Vec::new();
    let mut paragraph: Option<Paragraph> = None;
    let mut in_text = false;

    loop {
        let position = reader.buffer_position();
        match reader
            .read_event_into(&mut buf)
            .map_err(|e| TimetableError::MalformedMarkup {
                position,
                detail: e.to_string(),
            })? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"tbl" => {
                    slots.push(None);
                    frames.push(TableFrame {
                        slot: slots.len() - 1,
                        ..TableFrame::default()
                    });
                }
                b"tr" => {
                    if let Some(frame) = frames.last_mut() {
                        frame.row = Some(Row::default());
                    }
                }
                b"tc" => {
                    if let Some(frame) = frames.last_mut() {
                        frame.cell = Some(Cell::default());
                    }
                }
                b"p" => {
                    if current_cell(&mut frames).is_some() {
                        paragraph = Some(Paragraph::default());
                    }
                }
                b"t" => in_text = paragraph.is_some(),
                b"color" => {
                    if let (Some(p), Some(v)) = (paragraph.as_mut(), color_value(e)) {
                        p.colors.push(v);
                    }
                }
                _ => {}
            },
            Event::Empty(ref e) => match e.local_name().as_ref() {
                b"p" => {
                    if let Some(cell) = current_cell(&mut frames) {
                        cell.paragraphs.push(Paragraph::default());
                    }
                }
                b"color" => {
                    if let (Some(p), Some(v)) = (paragraph.as_mut(), color_value(e)) {
                        p.colors.push(v);
                    }
                }
                _ => {}
            },
            Event::Text(ref t) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    let text = t.unescape().map_err(|e| TimetableError::MalformedMarkup {
                        position,
                        detail: e.to_string(),
                    })?;
                    p.text.push_str(&text);
                }
            }
            Event::CData(ref t) if in_text => {
                if let Some(p) = paragraph.as_mut() {
                    p.text.push_str(&String::from_utf8_lossy(&t.clone().into_inner()));
                }
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"p" => {
                    if let Some(p) = paragraph.take() {
                        if let Some(cell) = current_cell(&mut frames) {
                            cell.paragraphs.push(p);
                        }
                    }
                }
                b"tc" => {
                    if let Some(frame) = frames.last_mut() {
                        if let (Some(cell), Some(row)) = (frame.cell.take(), frame.row.as_mut()) {
                            row.cells.push(cell);
                        }
                    }
                }
                b"tr" => {
                    if let Some(frame) = frames.last_mut() {
                        if let Some(row) = frame.row.take() {
                            frame.rows.push(row);
                        }
                    }
                }
                b"tbl" => {
                    if let Some(frame) = frames.pop() {
                        slots[frame.slot] = Some(Table { rows: frame.rows });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(Document {
        tables: slots.into_iter().flatten().collect(),
    })
}
