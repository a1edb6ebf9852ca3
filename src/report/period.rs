use std::fmt;

use chrono::{Datelike, NaiveDate};

use super::calendar::{days_in_year, month_end};
use crate::error::ReportError;

const MARKER_DATE_FORMAT: &str = "%b %d, %Y";
const COMPACT_DATE_FORMAT: &str = "%m%d%Y";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ReportError> {
        if start > end {
            return Err(ReportError::DateFormat {
                text: format!("{} - {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn parse_marker(text: &str) -> Result<Self, ReportError> {
        let malformed = || ReportError::DateFormat {
            text: text.to_string(),
        };

        let (start, end) = text.split_once(" - ").ok_or_else(malformed)?;
        let start = NaiveDate::parse_from_str(start.trim(), MARKER_DATE_FORMAT)
            .map_err(|_| malformed())?;
        let end =
            NaiveDate::parse_from_str(end.trim(), MARKER_DATE_FORMAT).map_err(|_| malformed())?;

        Self::new(start, end)
    }

    pub fn compact(&self) -> String {
        format!(
            "{}-{}",
            self.start.format(COMPACT_DATE_FORMAT),
            self.end.format(COMPACT_DATE_FORMAT)
        )
    }

    pub fn is_full_period(&self) -> bool {
        is_full_period(self.start, self.end)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compact())
    }
}

/// True when `start..=end` is made of whole calendar months, or spans a full
/// year across a year boundary.
pub fn is_full_period(start: NaiveDate, end: NaiveDate) -> bool {
    if start.year() != end.year() {
        if (start.month(), start.day()) == (1, 1) && (end.month(), end.day()) == (12, 31) {
            return true;
        }
        let inclusive_days = (end - start).num_days() + 1;
        if inclusive_days >= days_in_year(start.year()) {
            return true;
        }
    }

    let mut current = start;
    let mut full_months = 0_u32;
    while current <= end {
        let last_day = month_end(current);
        if last_day > end {
            break;
        }
        full_months += 1;
        match last_day.succ_opt() {
            Some(next) => current = next,
            None => return false,
        }
    }

    current > end && full_months > 0
}
