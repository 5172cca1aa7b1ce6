//! Date arithmetic for planner task seeding and rescheduling.
//! Pure functions — all DB access stays in the handlers.

use chrono::{Datelike, Duration, NaiveDate};

use crate::roadmap::generator::DAYS_PER_WEEK;

/// First calendar day of a roadmap week. Week numbers start at 1.
pub fn week_start(path_start: NaiveDate, week: u32) -> NaiveDate {
    path_start + Duration::weeks(week.saturating_sub(1) as i64)
}

/// Due dates for one week's daily tasks: 7 consecutive days from the week start.
pub fn daily_due_dates(path_start: NaiveDate, week: u32) -> Vec<NaiveDate> {
    let start = week_start(path_start, week);
    (0..DAYS_PER_WEEK as i64)
        .map(|offset| start + Duration::days(offset))
        .collect()
}

/// New due dates for shifted tasks: consecutive days strictly after the
/// latest existing due date in the path.
pub fn shift_dates(latest_due: NaiveDate, count: usize) -> Vec<NaiveDate> {
    (1..=count as i64)
        .map(|offset| latest_due + Duration::days(offset))
        .collect()
}

/// ISO week number of a date, used to pick out "this week's" tasks.
pub fn iso_week_of(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_week_start_offsets_by_whole_weeks() {
        let start = date(2025, 6, 2);
        assert_eq!(week_start(start, 1), start);
        assert_eq!(week_start(start, 2), date(2025, 6, 9));
        assert_eq!(week_start(start, 4), date(2025, 6, 23));
    }

    #[test]
    fn test_week_zero_treated_as_week_one() {
        let start = date(2025, 6, 2);
        assert_eq!(week_start(start, 0), start);
    }

    #[test]
    fn test_daily_due_dates_are_seven_consecutive_days() {
        let dates = daily_due_dates(date(2025, 6, 2), 2);
        assert_eq!(dates.len(), 7);
        assert_eq!(dates[0], date(2025, 6, 9));
        assert_eq!(dates[6], date(2025, 6, 15));
        for pair in dates.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::days(1));
        }
    }

    #[test]
    fn test_shift_dates_start_after_latest_due() {
        let shifted = shift_dates(date(2025, 6, 15), 3);
        assert_eq!(
            shifted,
            vec![date(2025, 6, 16), date(2025, 6, 17), date(2025, 6, 18)]
        );
    }

    #[test]
    fn test_shift_dates_empty_for_zero_count() {
        assert!(shift_dates(date(2025, 6, 15), 0).is_empty());
    }

    #[test]
    fn test_iso_week_of_known_dates() {
        assert_eq!(iso_week_of(date(2025, 1, 1)), 1);
        assert_eq!(iso_week_of(date(2025, 12, 29)), 1); // ISO week wraps into next year
        assert_eq!(iso_week_of(date(2025, 6, 4)), 23);
    }
}
