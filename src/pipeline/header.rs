//! Column identities from the located table's header row.
//!
//! The first two header cells are the fixed day and time columns; every cell
//! after them names one group column, e.g. `ПІ-11 (25 студ.)` or `11,12`.
//! A header that only says "Дисципліна" means the whole document belongs to a
//! single group named by its file.
//!
//! Group codes are completed from the filename when the header omits a part:
//! a document `ПІ-1.docx` with header `11,12` yields `ПІ-11` and `ПІ-12`.

use crate::pipeline::markup::Table;
use crate::pipeline::normalize::{similarity, SIMILARITY_THRESHOLD};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Header label of single-group documents.
pub const DISCIPLINE_SENTINEL: &str = "Дисципліна";

/// Day and time columns preceding the group columns.
pub const LEADING_COLUMNS: usize = 2;

static RE_PARENS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static RE_FULL_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЩЬЮЯҐЄІЇа-щьюяґєії]+-\d+$").unwrap());
static RE_LETTERS_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[А-ЩЬЮЯҐЄІЇа-щьюяґєії]+").unwrap());
static RE_DIGITS_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+").unwrap());
static RE_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[А-ЩЬЮЯҐЄІЇа-щьюяґєії]+").unwrap());
static RE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

/// One distinct group column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    /// Display name, e.g. `ПІ-11,ПІ-12`.
    pub name: String,
    /// Canonical `letters-digits` codes the column stands for.
    pub groups: Vec<String>,
}

/// Ordered group columns of a table.
///
/// `positions` maps each physical header cell to its entry in `columns`; two
/// cells with the same text share one column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    columns: Vec<Column>,
    positions: Vec<usize>,
}

impl ColumnHeader {
    /// Build from display names in source order.
    pub fn from_names<I, S>(names: I, file_stem: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header = Self::default();
        for name in names {
            header.push(name.into(), file_stem);
        }
        header
    }

    fn push(&mut self, name: String, file_stem: &str) {
        let idx = match self.columns.iter().position(|c| c.name == name) {
            Some(idx) => idx,
            None => {
                let groups = group_names(&name, file_stem);
                self.columns.push(Column { name, groups });
                self.columns.len() - 1
            }
        };
        self.positions.push(idx);
    }

    /// Number of physical group cells per row.
    pub fn cell_count(&self) -> usize {
        self.positions.len()
    }

    /// Distinct columns in draw order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column for the `pos`-th group cell of a row (0 = first after time).
    pub fn column_at(&self, pos: usize) -> Option<&Column> {
        self.positions.get(pos).map(|&idx| &self.columns[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Read the header row of `table`.
pub fn extract_headers(table: &Table, file_stem: &str) -> ColumnHeader {
    let Some(header_row) = table.rows.first() else {
        return ColumnHeader::default();
    };

    let mut names = Vec::new();
    for cell in header_row.cells.iter().skip(LEADING_COLUMNS) {
        let text = cell.text();
        let is_sentinel = std::iter::once(text.as_str())
            .chain(cell.paragraphs.iter().map(|p| p.text.trim()))
            .any(|t| similarity(DISCIPLINE_SENTINEL, t) > SIMILARITY_THRESHOLD);
        if is_sentinel {
            return ColumnHeader::from_names([file_stem], file_stem);
        }
        names.push(column_identity(&text));
    }
    ColumnHeader::from_names(names, file_stem)
}

/// `"ПІ-11 (25 студ.)"` → `"ПІ-11"`.
pub fn column_identity(text: &str) -> String {
    RE_PARENS
        .replace_all(text, "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Split a column name on `,` and complete each part to `letters-digits`.
///
/// Parts that are neither letter- nor digit-led are dropped, as are parts
/// whose missing half cannot be found in the filename.
pub fn group_names(column_name: &str, file_stem: &str) -> Vec<String> {
    column_name
        .split(',')
        .filter_map(|part| {
            if RE_FULL_CODE.is_match(part) {
                Some(part.to_string())
            } else if RE_LETTERS_PREFIX.is_match(part) {
                let digits = RE_DIGITS.find(file_stem)?;
                Some(format!("{}-{}", part, digits.as_str()))
            } else if RE_DIGITS_PREFIX.is_match(part) {
                let letters = RE_LETTERS.find(file_stem)?;
                Some(format!("{}-{}", letters.as_str(), part))
            } else {
                None
            }
        })
        .collect()
}
