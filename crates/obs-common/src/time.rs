//! Reconstruction of observation times from per-scan calendar components.
//!
//! Swath files carry `Year`, `Month`, `Day`, `Hour`, `Minute` and `Second`
//! arrays with one entry per scan. Every spot in a scan shares that scan's
//! time. Components are treated as naive UTC; out-of-range components are
//! normalized the way `timegm` normalizes a `struct tm`.

use chrono::{NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// How the calendar components are mapped onto a broken-down time.
///
/// Two conventions exist in the converters and they disagree. Both are kept
/// under distinct names until the intended one is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeConvention {
    /// Standard civil time: `tm_year = year - 1900`, `tm_mday = day`.
    Civil,
    /// Legacy mapping: `tm_year = year - 1970`, `tm_mday = day - 1`.
    ///
    /// Yields the civil time of year `year - 70`, one day earlier.
    Offset1970,
}

impl TimeConvention {
    pub fn name(&self) -> &'static str {
        match self {
            TimeConvention::Civil => "civil",
            TimeConvention::Offset1970 => "offset1970",
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Calendar component '{name}' has {actual} scans, expected {expected}")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Calendar date out of range: year {year}, month index {month}")]
    OutOfRange { year: i64, month: i64 },
}

/// Per-scan calendar components, one entry per scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCalendar {
    pub year: Vec<i64>,
    pub month: Vec<i64>,
    pub day: Vec<i64>,
    pub hour: Vec<i64>,
    pub minute: Vec<i64>,
    pub second: Vec<i64>,
}

impl ScanCalendar {
    /// A calendar where every scan has the same components.
    pub fn uniform(n_scans: usize, ymdhms: (i64, i64, i64, i64, i64, i64)) -> Self {
        let (y, mo, d, h, mi, s) = ymdhms;
        Self {
            year: vec![y; n_scans],
            month: vec![mo; n_scans],
            day: vec![d; n_scans],
            hour: vec![h; n_scans],
            minute: vec![mi; n_scans],
            second: vec![s; n_scans],
        }
    }

    pub fn len(&self) -> usize {
        self.year.len()
    }

    pub fn is_empty(&self) -> bool {
        self.year.is_empty()
    }

    fn check_lengths(&self) -> Result<(), TimeError> {
        let expected = self.year.len();
        let components = [
            ("Month", self.month.len()),
            ("Day", self.day.len()),
            ("Hour", self.hour.len()),
            ("Minute", self.minute.len()),
            ("Second", self.second.len()),
        ];
        for (name, actual) in components {
            if actual != expected {
                return Err(TimeError::LengthMismatch {
                    name,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Converts [`ScanCalendar`] components into seconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeReconstructor {
    convention: TimeConvention,
}

impl TimeReconstructor {
    pub fn new(convention: TimeConvention) -> Self {
        Self { convention }
    }

    pub fn convention(&self) -> TimeConvention {
        self.convention
    }

    /// One epoch time per scan.
    pub fn reconstruct(&self, calendar: &ScanCalendar) -> Result<Vec<f64>, TimeError> {
        calendar.check_lengths()?;
        (0..calendar.len())
            .map(|j| {
                self.epoch_seconds(
                    calendar.year[j],
                    calendar.month[j],
                    calendar.day[j],
                    calendar.hour[j],
                    calendar.minute[j],
                    calendar.second[j],
                )
                .map(|t| t as f64)
            })
            .collect()
    }

    /// Epoch seconds of a single set of components under this convention.
    pub fn epoch_seconds(
        &self,
        year: i64,
        month: i64,
        day: i64,
        hour: i64,
        minute: i64,
        second: i64,
    ) -> Result<i64, TimeError> {
        // Leap second
        let second = if second == 60 { 59 } else { second };
        let (tm_year, tm_mday) = match self.convention {
            TimeConvention::Civil => (year - 1900, day),
            TimeConvention::Offset1970 => (year - 1970, day - 1),
        };
        timegm(tm_year, month - 1, tm_mday, hour, minute, second)
    }
}

impl Default for TimeReconstructor {
    fn default() -> Self {
        Self::new(TimeConvention::Civil)
    }
}

/// `timegm` over `struct tm` fields, with the same normalization of
/// out-of-range months, days and times.
fn timegm(
    tm_year: i64,
    tm_mon: i64,
    tm_mday: i64,
    tm_hour: i64,
    tm_min: i64,
    tm_sec: i64,
) -> Result<i64, TimeError> {
    let months = (1900 + tm_year) * 12 + tm_mon;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) + 1;

    let out_of_range = || TimeError::OutOfRange {
        year: 1900 + tm_year,
        month: tm_mon,
    };
    let first_of_month = i32::try_from(year)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, month as u32, 1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(out_of_range)?;
    let base = Utc.from_utc_datetime(&first_of_month).timestamp();

    Ok(base + (tm_mday - 1) * 86_400 + tm_hour * 3_600 + tm_min * 60 + tm_sec)
}
