//! Defines [`DateInterval`], the inclusive calendar range an extraction run covers.

use chrono::{Days, NaiveDate};
use std::fmt;
use std::fmt::{Display, Formatter};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive range of calendar dates.
///
/// Construction never fails: the caller decides what to do with a range whose
/// `to_date` precedes its `from_date` (see [`DateInterval::is_valid`]). The
/// [`crate::ExtractionRunner`] checks this once, before any network traffic.
///
/// # Examples
///
/// ```
/// use renewables_extractor::DateInterval;
/// use chrono::NaiveDate;
///
/// let interval = DateInterval::new(
///     NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
/// );
/// let dates: Vec<NaiveDate> = interval.dates().collect();
/// assert_eq!(dates.len(), 3);
/// assert_eq!(interval.to_string(), "`2024-06-10` -> `2024-06-12`");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DateInterval {
    from_date: NaiveDate,
    to_date: NaiveDate,
}

impl DateInterval {
    pub fn new(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self { from_date, to_date }
    }

    /// Creates the interval `[to_date - days_back, to_date]`.
    ///
    /// Returns `None` if the start date would fall before the earliest date
    /// `chrono` can represent.
    pub fn ending_at(to_date: NaiveDate, days_back: u64) -> Option<Self> {
        let from_date = to_date.checked_sub_days(Days::new(days_back))?;
        Some(Self::new(from_date, to_date))
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to_date
    }

    /// `true` when `to_date` is not before `from_date`.
    pub fn is_valid(&self) -> bool {
        self.to_date >= self.from_date
    }

    /// Number of dates yielded by [`DateInterval::dates`]. Zero for an invalid interval.
    pub fn num_days(&self) -> usize {
        if !self.is_valid() {
            return 0;
        }
        (self.to_date - self.from_date).num_days() as usize + 1
    }

    /// Ascending sequence of every date in the interval, both ends included.
    ///
    /// An invalid interval yields nothing.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let to_date = self.to_date;
        self.from_date
            .iter_days()
            .take_while(move |date| *date <= to_date)
    }
}

impl Display for DateInterval {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "`{}` -> `{}`",
            self.from_date.format(DATE_FORMAT),
            self.to_date.format(DATE_FORMAT)
        )
    }
}
