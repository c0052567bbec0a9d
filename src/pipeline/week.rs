//! The reporting week a run considers "current".
//!
//! Monday to Friday map to the running ISO week; Saturday and Sunday already
//! look ahead to the next one, when students want next week's timetable.

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Monday 00:00 through Sunday 23:59 of the selected week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekWindow {
    pub today: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl WeekWindow {
    /// Compute the window for `today`.
    pub fn for_date(today: NaiveDate) -> Self {
        let weekday = i64::from(today.weekday().num_days_from_monday());
        let monday = if weekday <= 4 {
            today - Duration::days(weekday)
        } else {
            today + Duration::days(7 - weekday)
        };
        let start = monday.and_time(NaiveTime::MIN);
        let end = start + Duration::days(6) + Duration::hours(23) + Duration::minutes(59);
        Self { today, start, end }
    }

    /// Window for the local current date.
    pub fn current() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    /// Inclusive on both ends.
    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        moment >= self.start && moment <= self.end
    }

    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.contains(date.and_time(NaiveTime::MIN))
    }

    /// `"2022.04.11 - 2022.04.17"`
    pub fn label(&self) -> String {
        format!(
            "{} - {}",
            self.start.format("%Y.%m.%d"),
            self.end.format("%Y.%m.%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    #[test]
    fn monday_starts_its_own_week() {
        let w = WeekWindow::for_date(date(2023, 8, 7));
        assert_eq!(w.start, at(2023, 8, 7, 0, 0));
        assert_eq!(w.end, at(2023, 8, 13, 23, 59));
    }

    #[test]
    fn friday_stays_in_current_week() {
        let w = WeekWindow::for_date(date(2023, 8, 11));
        assert_eq!(w.start, at(2023, 8, 7, 0, 0));
        assert_eq!(w.end, at(2023, 8, 13, 23, 59));
    }

    #[test]
    fn weekend_shifts_to_next_week() {
        for d in [12, 13] {
            let w = WeekWindow::for_date(date(2023, 8, d));
            assert_eq!(w.start, at(2023, 8, 14, 0, 0), "day {d}");
            assert_eq!(w.end, at(2023, 8, 20, 23, 59), "day {d}");
        }
    }

    #[test]
    fn window_crosses_year_boundary() {
        let w = WeekWindow::for_date(date(2022, 12, 31));
        assert_eq!(w.start, at(2023, 1, 2, 0, 0));
        assert_eq!(w.today, date(2022, 12, 31));
    }

    #[test]
    fn contains_is_inclusive() {
        let w = WeekWindow::for_date(date(2023, 8, 7));
        assert!(w.contains(w.start));
        assert!(w.contains(w.end));
        assert!(w.contains_date(date(2023, 8, 13)));
        assert!(!w.contains_date(date(2023, 8, 14)));
        assert!(!w.contains_date(date(2023, 8, 6)));
    }

    #[test]
    fn label_uses_dotted_dates() {
        let w = WeekWindow::for_date(date(2022, 4, 12));
        assert_eq!(w.label(), "2022.04.11 - 2022.04.17");
    }
}
