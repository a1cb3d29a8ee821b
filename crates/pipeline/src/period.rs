//! Period filtering over an opportunity's expected-close date.

use chrono::{Datelike, Days, NaiveDate};

/// Named time window, evaluated against an injected `today`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Period {
    All,
    Today,
    ThisWeek,
    ThisMonth,
    Overdue,
    NoDueDate,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::All => "ALL",
            Period::Today => "TODAY",
            Period::ThisWeek => "THIS_WEEK",
            Period::ThisMonth => "THIS_MONTH",
            Period::Overdue => "OVERDUE",
            Period::NoDueDate => "NO_DUE_DATE",
        }
    }
}

/// Whether an expected-close date falls inside `period`.
///
/// An absent date is its own state: it passes `All` and `NoDueDate` and
/// fails every dated window. Weeks start on Monday; all windows are
/// half-open (inclusive start, exclusive end).
pub fn matches(period: Period, expected_close: Option<NaiveDate>, today: NaiveDate) -> bool {
    match (period, expected_close) {
        (Period::All, _) => true,
        (Period::NoDueDate, date) => date.is_none(),
        (_, None) => false,
        (Period::Today, Some(date)) => date == today,
        (Period::ThisWeek, Some(date)) => {
            let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
            date >= week_start && date < week_start + Days::new(7)
        }
        (Period::ThisMonth, Some(date)) => {
            date.year() == today.year() && date.month() == today.month()
        }
        (Period::Overdue, Some(date)) => date < today,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2025-06-18 is a Wednesday; its week runs Mon 16th..Mon 23rd.
    fn today() -> NaiveDate {
        date(2025, 6, 18)
    }

    #[test]
    fn absent_date_passes_only_all_and_no_due_date() {
        assert!(matches(Period::All, None, today()));
        assert!(matches(Period::NoDueDate, None, today()));
        for period in [
            Period::Today,
            Period::ThisWeek,
            Period::ThisMonth,
            Period::Overdue,
        ] {
            assert!(!matches(period, None, today()));
        }
    }

    #[test]
    fn no_due_date_rejects_any_present_date() {
        assert!(!matches(Period::NoDueDate, Some(today()), today()));
        assert!(!matches(Period::NoDueDate, Some(date(1999, 1, 1)), today()));
    }

    #[test]
    fn today_is_a_single_day_window() {
        assert!(matches(Period::Today, Some(date(2025, 6, 18)), today()));
        assert!(!matches(Period::Today, Some(date(2025, 6, 17)), today()));
        assert!(!matches(Period::Today, Some(date(2025, 6, 19)), today()));
    }

    #[test]
    fn this_week_runs_monday_to_monday_exclusive() {
        assert!(matches(Period::ThisWeek, Some(date(2025, 6, 16)), today()));
        assert!(matches(Period::ThisWeek, Some(date(2025, 6, 22)), today()));
        assert!(!matches(Period::ThisWeek, Some(date(2025, 6, 15)), today()));
        assert!(!matches(Period::ThisWeek, Some(date(2025, 6, 23)), today()));
    }

    #[test]
    fn this_month_is_calendar_bound() {
        assert!(matches(Period::ThisMonth, Some(date(2025, 6, 1)), today()));
        assert!(matches(Period::ThisMonth, Some(date(2025, 6, 30)), today()));
        assert!(!matches(Period::ThisMonth, Some(date(2025, 5, 31)), today()));
        assert!(!matches(Period::ThisMonth, Some(date(2025, 7, 1)), today()));
        // Same month of a different year does not count.
        assert!(!matches(Period::ThisMonth, Some(date(2024, 6, 15)), today()));
    }

    #[test]
    fn overdue_is_strictly_before_today() {
        assert!(matches(Period::Overdue, Some(date(2025, 6, 17)), today()));
        assert!(!matches(Period::Overdue, Some(date(2025, 6, 18)), today()));
        assert!(!matches(Period::Overdue, Some(date(2025, 6, 19)), today()));
    }
}
