//! Wall-clock `"HH:MM"` times.
//!
//! Appointment start times and slot labels are provider-local wall-clock
//! values with no timezone attached. Parsing is strict: both fields must be
//! two ASCII digits, hours in `0..=23`, minutes in `0..=59`.

use chrono::{NaiveTime, Timelike};

use crate::error::{Result, SlotError};

/// Parse a strict `"HH:MM"` wall-clock time.
///
/// # Errors
/// Returns `SlotError::InvalidTime` for anything that is not two two-digit
/// fields separated by `:` or that is out of range.
pub fn parse_wall_clock(s: &str) -> Result<NaiveTime> {
    let invalid = || SlotError::InvalidTime(s.to_string());

    let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
    let two_digits = |part: &str| part.len() == 2 && part.bytes().all(|b| b.is_ascii_digit());
    if !two_digits(hours) || !two_digits(minutes) {
        return Err(invalid());
    }

    let hour: u32 = hours.parse().map_err(|_| invalid())?;
    let minute: u32 = minutes.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Format a time as `"HH:MM"`, dropping seconds.
pub fn format_wall_clock(time: NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Serde adapter for `NaiveTime` fields stored as `"HH:MM"`.
pub mod wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_wall_clock(*time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_wall_clock(&raw).map_err(serde::de::Error::custom)
    }
}
