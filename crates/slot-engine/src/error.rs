//! Error types for slot-engine operations.

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlotError {
    #[error("Invalid time: {0} (expected HH:MM)")]
    InvalidTime(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid duration: {0} minutes (must be positive and in range)")]
    InvalidDuration(i64),

    #[error("Invalid slot grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid appointment {id}: {reason}")]
    InvalidAppointment { id: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Slot {time} on {date} is not available")]
    SlotUnavailable { date: NaiveDate, time: NaiveTime },

    #[error("Incomplete booking: {0} not selected")]
    IncompleteBooking(&'static str),

    #[error("Invalid contact details: {0}")]
    InvalidContact(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, SlotError>;
