//! The schedule model and the builder that fills it from a located table.
//!
//! ## Shape
//!
//! ```text
//! group ─┬─ groups: ["ПІ-11", …]
//!        └─ day ── time-slot ── subject ── { type, state }
//! ```
//!
//! Days and slots keep first-seen order: that order is the row order of the
//! rendered image. Several subjects in one slot are alternating biweekly
//! classes; all are kept and the renderer picks one.
//!
//! ## Carry-forward context
//!
//! Merged cells in the source leave the day and time columns empty on
//! continuation rows, so the last seen day and time stay in effect until a
//! new one appears.

use crate::pipeline::header::{ColumnHeader, LEADING_COLUMNS};
use crate::pipeline::markup::{Paragraph, Table};
use crate::pipeline::normalize::normalize_subject;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use tracing::debug;

/// Lecture/practice marker as written in the source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    #[serde(rename = "lecture")]
    Lecture,
    #[serde(rename = "practice")]
    Practice,
    #[serde(rename = "?")]
    Unspecified,
}

impl EntryKind {
    /// Classify from the *uncleaned* paragraph text.
    pub fn classify(raw: &str) -> Self {
        if raw.contains("л.") {
            EntryKind::Lecture
        } else if raw.contains("пр.") {
            EntryKind::Practice
        } else {
            EntryKind::Unspecified
        }
    }
}

/// Colour of a subject in the source, which doubles as its display priority.
///
/// Red marks a cancelled or moved class, blue a replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriorityColor {
    #[serde(rename = "#000000")]
    Black,
    #[serde(rename = "#FF0000")]
    Red,
    #[serde(rename = "#0070C0")]
    Blue,
}

impl PriorityColor {
    pub const RED_MARKUP: &'static str = "FF0000";
    pub const BLUE_MARKUP: &'static str = "0070C0";

    /// Red wins over blue when a paragraph carries both.
    pub fn classify(paragraph: &Paragraph) -> Self {
        if paragraph.has_color(Self::RED_MARKUP) {
            PriorityColor::Red
        } else if paragraph.has_color(Self::BLUE_MARKUP) {
            PriorityColor::Blue
        } else {
            PriorityColor::Black
        }
    }

    /// Display precedence: blue > black > red.
    pub fn rank(self) -> u8 {
        match self {
            PriorityColor::Red => 0,
            PriorityColor::Black => 1,
            PriorityColor::Blue => 2,
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            PriorityColor::Black => "#000000",
            PriorityColor::Red => "#FF0000",
            PriorityColor::Blue => "#0070C0",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(rename = "state")]
    pub color: PriorityColor,
}

/// subject → entry
pub type Slot = IndexMap<String, ScheduleEntry>;
/// time-slot → subjects
pub type Day = IndexMap<String, Slot>;

/// Everything recorded for one group column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSchedule {
    pub groups: Vec<String>,
    #[serde(flatten)]
    pub days: IndexMap<String, Day>,
}

impl GroupSchedule {
    /// Number of (day, slot) pairs, i.e. image rows this group needs.
    pub fn row_count(&self) -> usize {
        self.days.values().map(|d| d.len()).sum()
    }
}

/// group column name → schedule, in header order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScheduleModel {
    columns: IndexMap<String, GroupSchedule>,
}

impl ScheduleModel {
    /// Empty model with one entry per header column.
    pub fn with_columns(header: &ColumnHeader) -> Self {
        let columns = header
            .columns()
            .iter()
            .map(|c| {
                (
                    c.name.clone(),
                    GroupSchedule {
                        groups: c.groups.clone(),
                        days: IndexMap::new(),
                    },
                )
            })
            .collect();
        Self { columns }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &GroupSchedule)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn get(&self, column: &str) -> Option<&GroupSchedule> {
        self.columns.get(column)
    }

    pub fn first(&self) -> Option<(&str, &GroupSchedule)> {
        self.columns.first().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    fn column_mut(&mut self, column: &str) -> &mut GroupSchedule {
        self.columns.entry(column.to_string()).or_default()
    }

    /// Ensure `column → day` exists.
    pub fn upsert_day(&mut self, column: &str, day: &str) -> &mut Day {
        self.column_mut(column)
            .days
            .entry(day.to_string())
            .or_default()
    }

    /// Ensure `column → day → time` exists.
    pub fn upsert_slot(&mut self, column: &str, day: &str, time: &str) -> &mut Slot {
        self.upsert_day(column, day)
            .entry(time.to_string())
            .or_default()
    }

    /// Record a subject. Re-recording a subject replaces its entry in place.
    pub fn insert_entry(
        &mut self,
        column: &str,
        day: &str,
        time: &str,
        subject: String,
        entry: ScheduleEntry,
    ) {
        self.upsert_slot(column, day, time).insert(subject, entry);
    }

    /// Pretty JSON with one-space indentation, non-ASCII kept verbatim.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut out = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b" "));
        self.serialize(&mut ser)?;
        Ok(out)
    }
}

/// Fully upper-case, with at least one cased letter.
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Walk the data rows of `table` and build the schedule.
///
/// Cells beyond the day, time and header-announced group columns are
/// ignored.
pub fn build_schedule(table: &Table, header: &ColumnHeader) -> ScheduleModel {
    let mut model = ScheduleModel::with_columns(header);
    let mut day = String::new();
    let mut time = String::new();
    let cell_limit = LEADING_COLUMNS + header.cell_count();
    let mut recorded = 0usize;

    for row in table.rows.iter().skip(1) {
        for (idx, cell) in row.cells.iter().take(cell_limit).enumerate() {
            for paragraph in &cell.paragraphs {
                match idx {
                    0 => {
                        if is_upper(&paragraph.text) {
                            day = paragraph.text.clone();
                            for column in header.columns() {
                                model.upsert_day(&column.name, &day);
                            }
                        }
                    }
                    1 => {
                        time = paragraph.text.clone();
                        for column in header.columns() {
                            model.upsert_slot(&column.name, &day, &time);
                        }
                    }
                    _ => {
                        let Some(column) = header.column_at(idx - LEADING_COLUMNS) else {
                            continue;
                        };
                        let Some(subject) = normalize_subject(&paragraph.text) else {
                            continue;
                        };
                        let entry = ScheduleEntry {
                            kind: EntryKind::classify(&paragraph.text),
                            color: PriorityColor::classify(paragraph),
                        };
                        model.insert_entry(&column.name, &day, &time, subject, entry);
                        recorded += 1;
                    }
                }
            }
        }
    }

    debug!(
        "Built schedule: {} columns, {} entries",
        model.len(),
        recorded
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::markup::{Cell, Row};

    fn cell(paragraphs: &[&str]) -> Cell {
        Cell {
            paragraphs: paragraphs.iter().map(|t| Paragraph::new(*t)).collect(),
        }
    }

    fn row(cells: Vec<Cell>) -> Row {
        Row { cells }
    }

    fn header_row(groups: &[&str]) -> Row {
        let mut cells = vec![cell(&["День"]), cell(&["Час"])];
        cells.extend(groups.iter().map(|g| cell(&[g])));
        row(cells)
    }

    #[test]
    fn kind_from_raw_text() {
        assert_eq!(EntryKind::classify("Фізика л. доц."), EntryKind::Lecture);
        assert_eq!(EntryKind::classify("Фізика пр. Іванов"), EntryKind::Practice);
        assert_eq!(EntryKind::classify("Фізика"), EntryKind::Unspecified);
    }

    #[test]
    fn color_from_markup() {
        assert_eq!(PriorityColor::classify(&Paragraph::new("x")), PriorityColor::Black);
        assert_eq!(
            PriorityColor::classify(&Paragraph::new("x").with_color("0070C0")),
            PriorityColor::Blue
        );
        assert_eq!(
            PriorityColor::classify(&Paragraph::new("x").with_color("ff0000")),
            PriorityColor::Red
        );
        assert_eq!(
            PriorityColor::classify(&Paragraph::new("x").with_color("00B050")),
            PriorityColor::Black
        );
    }

    #[test]
    fn upper_detection() {
        assert!(is_upper("ПОНЕДІЛОК"));
        assert!(is_upper("ВІВТОРОК 12.09"));
        assert!(!is_upper("07.08.23р."));
        assert!(!is_upper("Понеділок"));
        assert!(!is_upper("12.30"));
        assert!(!is_upper(""));
    }

    #[test]
    fn builds_days_slots_and_entries() {
        let table = Table {
            rows: vec![
                header_row(&["ПІ-11", "ПІ-12"]),
                row(vec![
                    cell(&["ПОНЕДІЛОК", "07.08.23р."]),
                    cell(&["8.30-9.50"]),
                    cell(&["Фізика л. доц. Петренко О.В."]),
                    cell(&["Хімія пр. Іваненко І.І."]),
                ]),
                row(vec![
                    cell(&[""]),
                    cell(&["10.00-11.20"]),
                    cell(&["—"]),
                    cell(&["Історія"]),
                ]),
            ],
        };
        let header = ColumnHeader::from_names(["ПІ-11", "ПІ-12"], "ПІ-1");
        let model = build_schedule(&table, &header);

        let g1 = model.get("ПІ-11").unwrap();
        assert_eq!(g1.groups, ["ПІ-11"]);
        let monday = &g1.days["ПОНЕДІЛОК"];
        let slots: Vec<_> = monday.keys().map(String::as_str).collect();
        assert_eq!(slots, ["8.30-9.50", "10.00-11.20"]);
        assert_eq!(
            monday["8.30-9.50"]["Фізика"],
            ScheduleEntry {
                kind: EntryKind::Lecture,
                color: PriorityColor::Black
            }
        );
        assert!(monday["10.00-11.20"].is_empty(), "dash cell is not a subject");

        let g2 = &model.get("ПІ-12").unwrap().days["ПОНЕДІЛОК"];
        assert_eq!(g2["8.30-9.50"]["Хімія"].kind, EntryKind::Practice);
        assert_eq!(g2["10.00-11.20"]["Історія"].kind, EntryKind::Unspecified);
    }

    #[test]
    fn day_carries_forward_across_rows() {
        let table = Table {
            rows: vec![
                header_row(&["A"]),
                row(vec![cell(&["ВІВТОРОК"]), cell(&["8.30"]), cell(&["Фізика"])]),
                row(vec![cell(&[]), cell(&["10.00"]), cell(&["Хімія"])]),
            ],
        };
        let header = ColumnHeader::from_names(["A"], "ПІ-1");
        let model = build_schedule(&table, &header);
        let tuesday = &model.get("A").unwrap().days["ВІВТОРОК"];
        assert!(tuesday["8.30"].contains_key("Фізика"));
        assert!(tuesday["10.00"].contains_key("Хімія"));
    }

    #[test]
    fn empty_time_paragraph_opens_its_own_slot() {
        let table = Table {
            rows: vec![
                header_row(&["A"]),
                row(vec![cell(&["ПОНЕДІЛОК"]), cell(&["8.30"]), cell(&["Фізика"])]),
                row(vec![cell(&[""]), cell(&[""]), cell(&["Хімія"])]),
            ],
        };
        let header = ColumnHeader::from_names(["A"], "ПІ-1");
        let model = build_schedule(&table, &header);
        let monday = &model.get("A").unwrap().days["ПОНЕДІЛОК"];
        let slots: Vec<_> = monday.keys().map(String::as_str).collect();
        assert_eq!(slots, ["8.30", ""]);
        assert_eq!(monday["8.30"].keys().map(String::as_str).collect::<Vec<_>>(), ["Фізика"]);
        assert_eq!(monday[""].keys().map(String::as_str).collect::<Vec<_>>(), ["Хімія"]);
        assert_eq!(model.get("A").unwrap().row_count(), 2);
    }

    #[test]
    fn extra_cells_are_ignored() {
        let table = Table {
            rows: vec![
                header_row(&["A"]),
                row(vec![
                    cell(&["СЕРЕДА"]),
                    cell(&["8.30"]),
                    cell(&["Фізика"]),
                    cell(&["Зайве"]),
                ]),
            ],
        };
        let header = ColumnHeader::from_names(["A"], "ПІ-1");
        let model = build_schedule(&table, &header);
        assert_eq!(model.len(), 1);
        let slot = &model.get("A").unwrap().days["СЕРЕДА"]["8.30"];
        assert_eq!(slot.len(), 1);
        assert!(slot.contains_key("Фізика"));
    }

    #[test]
    fn alternating_subjects_all_kept_in_order() {
        let table = Table {
            rows: vec![
                header_row(&["A"]),
                row(vec![
                    cell(&["ЧЕТВЕР"]),
                    cell(&["8.30"]),
                    Cell {
                        paragraphs: vec![
                            Paragraph::new("Фізика").with_color("FF0000"),
                            Paragraph::new("Хімія").with_color("0070C0"),
                        ],
                    },
                ]),
            ],
        };
        let header = ColumnHeader::from_names(["A"], "ПІ-1");
        let model = build_schedule(&table, &header);
        let slot = &model.get("A").unwrap().days["ЧЕТВЕР"]["8.30"];
        let got: Vec<_> = slot.iter().map(|(k, v)| (k.as_str(), v.color)).collect();
        assert_eq!(
            got,
            [("Фізика", PriorityColor::Red), ("Хімія", PriorityColor::Blue)]
        );
    }

    #[test]
    fn row_count_sums_day_slots() {
        let mut model = ScheduleModel::default();
        model.upsert_slot("A", "ПОНЕДІЛОК", "1");
        model.upsert_slot("A", "ПОНЕДІЛОК", "2");
        model.upsert_slot("A", "ВІВТОРОК", "1");
        model.upsert_day("A", "СЕРЕДА");
        assert_eq!(model.get("A").unwrap().row_count(), 3);
    }

    #[test]
    fn json_shape_matches_record_format() {
        let mut model = ScheduleModel::with_columns(&ColumnHeader::from_names(["ПІ-11"], "ПІ-1"));
        model.insert_entry(
            "ПІ-11",
            "ПОНЕДІЛОК",
            "8.30",
            "Фізика".into(),
            ScheduleEntry {
                kind: EntryKind::Lecture,
                color: PriorityColor::Red,
            },
        );
        let json = String::from_utf8(model.to_json_pretty().unwrap()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["ПІ-11"]["groups"][0], "ПІ-11");
        assert_eq!(value["ПІ-11"]["ПОНЕДІЛОК"]["8.30"]["Фізика"]["type"], "lecture");
        assert_eq!(value["ПІ-11"]["ПОНЕДІЛОК"]["8.30"]["Фізика"]["state"], "#FF0000");
        assert!(json.contains("\n \"ПІ-11\""), "one-space indent: {json}");
        assert!(json.contains("Фізика"), "non-ASCII kept verbatim");

        let back: ScheduleModel = serde_json::from_str(&json).unwrap();
        assert_eq!(back, model);
    }
}
