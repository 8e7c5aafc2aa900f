use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};

use crate::error::{AppError, AppResult};

/// Inclusive calendar-day range used to select commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    date: NaiveDate,
}

impl DayWindow {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Lower bound handed verbatim to `--since`.
    pub fn since(&self) -> String {
        format!("{} 00:00:00", self.date.format("%Y-%m-%d"))
    }

    /// Upper bound handed verbatim to `--until`.
    pub fn until(&self) -> String {
        format!("{} 23:59:59", self.date.format("%Y-%m-%d"))
    }

    /// Compares against the wall-clock time the commit recorded, ignoring
    /// the offset it was recorded in.
    pub fn contains(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        let local = timestamp.naive_local();
        let start = self.date.and_time(NaiveTime::MIN);
        let end = self
            .date
            .and_hms_opt(23, 59, 59)
            .unwrap_or(start);
        local >= start && local <= end
    }
}

pub fn parse_target_date(input: Option<&str>, today: NaiveDate) -> AppResult<NaiveDate> {
    match input.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| AppError::InvalidDate(raw.to_string())),
        None => Ok(today),
    }
}
