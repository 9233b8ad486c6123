use chrono::{Datelike, Months, NaiveDate};
use std::fmt;

/// A calendar month, identified by its first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month(NaiveDate);

impl Month {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Truncate a date to the month containing it
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    pub fn start(&self) -> NaiveDate {
        self.0
    }

    /// First day of the following month (exclusive end of this month)
    pub fn end(&self) -> NaiveDate {
        self.0
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn succ(&self) -> Option<Self> {
        self.0.checked_add_months(Months::new(1)).map(Self)
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }

    pub fn month(&self) -> u32 {
        self.0.month()
    }

    /// Months elapsed from `earlier` to `self`; negative when `self` is before `earlier`
    pub fn months_since(&self, earlier: Month) -> i64 {
        (self.year() as i64 - earlier.year() as i64) * 12 + self.month() as i64
            - earlier.month() as i64
    }

    /// `YYYY-MM` label used on the wire
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Every month from `first` through `last` inclusive, ascending.
///
/// Returns an empty spine when `last` precedes `first`.
pub fn month_spine(first: Month, last: Month) -> Vec<Month> {
    let mut months = Vec::new();
    let mut current = Some(first);

    while let Some(month) = current {
        if month > last {
            break;
        }
        months.push(month);
        current = month.succ();
    }

    months
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_containing_truncates_to_first_day() {
        let month = Month::containing(date(2025, 3, 31));
        assert_eq!(month.start(), date(2025, 3, 1));
        assert_eq!(month.end(), date(2025, 4, 1));
        assert_eq!(month.label(), "2025-03");
    }

    #[test]
    fn test_succ_crosses_year_boundary() {
        let december = Month::new(2024, 12).unwrap();
        assert_eq!(december.succ(), Month::new(2025, 1));
        assert_eq!(december.end(), date(2025, 1, 1));
    }

    #[test]
    fn test_months_since() {
        let jan = Month::new(2025, 1).unwrap();
        let nov = Month::new(2024, 11).unwrap();
        assert_eq!(jan.months_since(nov), 2);
        assert_eq!(nov.months_since(jan), -2);
        assert_eq!(jan.months_since(jan), 0);
    }

    #[test]
    fn test_month_spine_is_contiguous_and_inclusive() {
        let spine = month_spine(Month::new(2024, 11).unwrap(), Month::new(2025, 2).unwrap());
        let labels: Vec<String> = spine.iter().map(Month::label).collect();
        assert_eq!(labels, vec!["2024-11", "2024-12", "2025-01", "2025-02"]);

        for pair in spine.windows(2) {
            assert_eq!(pair[0].succ(), Some(pair[1]));
        }
    }

    #[test]
    fn test_month_spine_single_and_inverted() {
        let jan = Month::new(2025, 1).unwrap();
        assert_eq!(month_spine(jan, jan), vec![jan]);
        assert!(month_spine(Month::new(2025, 2).unwrap(), jan).is_empty());
    }
}
