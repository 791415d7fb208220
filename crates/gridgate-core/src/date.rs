//! Excel serial date conversion
//!
//! Spreadsheets store dates as serial numbers (days since a base date, with
//! the time of day as the fraction).
//!
//! Notes:
//! - In the 1900 date system, Excel includes the historical "1900 leap year"
//!   bug: serial 60 is the non-existent 1900-02-29. Serials 1-59 map directly
//!   from 1900-01-01; from 61 on, one day is subtracted. Serial 60 lands on
//!   1900-03-01, the same day as 61.
//! - In the 1904 date system serial 0 is 1904-01-01.
//! - The time fraction is rounded to the millisecond; a fraction that rounds
//!   up to a full day rolls the date forward.

use chrono::{Duration, NaiveDate};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Largest serial Excel can display (9999-12-31 in the 1900 system)
pub const MAX_SERIAL: f64 = 2_958_465.999_999_9;

/// Date system of a workbook
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DateSystem {
    /// Windows default: day 1 is 1900-01-01
    #[default]
    Excel1900,
    /// Legacy Mac: day 0 is 1904-01-01
    Excel1904,
}

impl DateSystem {
    /// Select the system from a workbook's `date1904` flag
    pub fn from_1904_flag(date_1904: bool) -> Self {
        if date_1904 {
            DateSystem::Excel1904
        } else {
            DateSystem::Excel1900
        }
    }
}

/// Check whether a number can be shown as a date at all
pub fn is_valid_serial(serial: f64) -> bool {
    serial.is_finite() && serial >= 0.0 && serial <= MAX_SERIAL
}

/// Convert a serial number to the calendar date it falls on
///
/// Returns `None` for negative, non-finite or out-of-range serials.
pub fn serial_to_date(serial: f64, system: DateSystem) -> Option<NaiveDate> {
    if !is_valid_serial(serial) {
        return None;
    }

    let mut whole_days = serial.floor() as i64;
    let millis = ((serial - serial.floor()) * MILLIS_PER_DAY as f64 + 0.5) as i64;
    if millis >= MILLIS_PER_DAY {
        whole_days += 1;
    }

    // Offset from the day before the epoch's January 1st
    let (epoch_year, day_adjust) = match system {
        DateSystem::Excel1904 => (1904, 1),
        DateSystem::Excel1900 if whole_days < 61 => (1900, 0),
        DateSystem::Excel1900 => (1900, -1),
    };

    let jan_zero = NaiveDate::from_ymd_opt(epoch_year, 1, 1)? - Duration::days(1);
    jan_zero.checked_add_signed(Duration::days(whole_days + day_adjust))
}
