//! Table locator: pick the table whose rows carry a date inside the week.
//!
//! Schedules are appended to the same document week after week, so the most
//! recent table is usually the last one. Candidates are therefore checked in
//! reverse document order and the first hit wins.
//!
//! Date tokens live in the first column of data rows, next to the weekday
//! name. Three spellings are recognised, tried in this order:
//!
//! | Pattern        | Example      | Year                     |
//! |----------------|--------------|--------------------------|
//! | `dd.mm.yyр.`   | `07.08.23р.` | `20yy`                   |
//! | `.dd.mm.yyр.`  | `.07.08.23р.`| `20yy`                   |
//! | `dd.mm[.]`     | `07.08.`     | year of the window's day |
//!
//! Tokens that match nothing, or match but name an impossible date
//! (`31.02.23р.`), are skipped.

use crate::pipeline::markup::{Document, Table};
use crate::pipeline::week::WeekWindow;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static RE_FULL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.(\d{2})\s?р\.?$").unwrap());

static RE_LEADING_DOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\.(\d{1,2})\.(\d{1,2})\.(\d{2})\s?р\.?$").unwrap());

static RE_DAY_MONTH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})\.?$").unwrap());

fn number(caps: &regex::Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

/// Parse one date token. `default_year` fills in the `dd.mm` form.
pub fn parse_date_token(token: &str, default_year: i32) -> Option<NaiveDate> {
    let token = token.trim();

    let dated = RE_FULL
        .captures(token)
        .or_else(|| RE_LEADING_DOT.captures(token));
    if let Some(caps) = dated {
        let year = 2000 + i32::try_from(number(&caps, 3)?).ok()?;
        return NaiveDate::from_ymd_opt(year, number(&caps, 2)?, number(&caps, 1)?);
    }

    let caps = RE_DAY_MONTH.captures(token)?;
    NaiveDate::from_ymd_opt(default_year, number(&caps, 2)?, number(&caps, 1)?)
}

fn table_matches(table: &Table, window: &WeekWindow) -> bool {
    use chrono::Datelike;
    let year = window.today.year();

    table
        .rows
        .iter()
        .skip(1)
        .filter_map(|row| row.cells.first())
        .flat_map(|cell| cell.paragraphs.iter())
        .filter_map(|p| parse_date_token(&p.text, year))
        .any(|date| window.contains_date(date))
}

/// Return the last table with an in-window date, or `None` when the document
/// has no table for this week.
pub fn locate_table<'a>(document: &'a Document, window: &WeekWindow) -> Option<&'a Table> {
    let found = document
        .tables
        .iter()
        .enumerate()
        .rev()
        .find(|(_, table)| table_matches(table, window));

    match found {
        Some((idx, table)) => {
            debug!(
                "Table {}/{} matches week {}",
                idx + 1,
                document.tables.len(),
                window.label()
            );
            Some(table)
        }
        None => {
            debug!(
                "None of {} tables matches week {}",
                document.tables.len(),
                window.label()
            );
            None
        }
    }
}
