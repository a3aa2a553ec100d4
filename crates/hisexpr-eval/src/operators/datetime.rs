//! Date functions
//!
//! Differences count whole units from `start` to `end`, negative when `end`
//! comes first. Months and years follow calendar fields, so a month only
//! completes on the same day of the month.

use chrono::{Datelike, NaiveDate, TimeDelta};

const MINUTES_PER_DAY: i64 = 24 * 60;

pub fn add_days(date: NaiveDate, days: f64) -> Option<NaiveDate> {
    date.checked_add_signed(TimeDelta::try_days(days.trunc() as i64)?)
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

pub fn weeks_between(start: NaiveDate, end: NaiveDate) -> i64 {
    days_between(start, end) / 7
}

pub fn minutes_between(start: NaiveDate, end: NaiveDate) -> i64 {
    days_between(start, end) * MINUTES_PER_DAY
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i64 {
    let months = |d: NaiveDate| i64::from(d.year()) * 12 + i64::from(d.month0());
    let mut total = months(end) - months(start);
    if total > 0 && end.day() < start.day() {
        total -= 1;
    } else if total < 0 && end.day() > start.day() {
        total += 1;
    }
    total
}

pub fn years_between(start: NaiveDate, end: NaiveDate) -> i64 {
    months_between(start, end) / 12
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(date(2024, 2, 27), 3.0), Some(date(2024, 3, 1)));
        assert_eq!(add_days(date(2024, 1, 1), -1.0), Some(date(2023, 12, 31)));
    }

    #[rstest]
    #[case(date(2024, 1, 1), date(2024, 1, 15), 14, 2)]
    #[case(date(2024, 1, 15), date(2024, 1, 1), -14, -2)]
    #[case(date(2024, 1, 1), date(2024, 1, 6), 5, 0)]
    fn test_days_and_weeks(
        #[case] start: NaiveDate,
        #[case] end: NaiveDate,
        #[case] days: i64,
        #[case] weeks: i64,
    ) {
        assert_eq!(days_between(start, end), days);
        assert_eq!(weeks_between(start, end), weeks);
    }

    #[rstest]
    #[case(date(2024, 1, 31), date(2024, 2, 29), 0)]
    #[case(date(2024, 1, 15), date(2024, 3, 15), 2)]
    #[case(date(2024, 3, 15), date(2024, 1, 16), -1)]
    #[case(date(2020, 6, 1), date(2024, 5, 31), 47)]
    fn test_months_between(#[case] start: NaiveDate, #[case] end: NaiveDate, #[case] months: i64) {
        assert_eq!(months_between(start, end), months);
    }

    #[test]
    fn test_years_and_minutes() {
        assert_eq!(years_between(date(2020, 6, 1), date(2024, 5, 31)), 3);
        assert_eq!(years_between(date(2020, 6, 1), date(2024, 6, 1)), 4);
        assert_eq!(minutes_between(date(2024, 1, 1), date(2024, 1, 2)), 1440);
    }
}
