//! Shaping appointment snapshots for calendar and list views.
//!
//! None of this is slot computation; it is the grouping and filtering the
//! dashboard and the public booking page need around it.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::Serialize;
use tracing::debug;

use crate::appointment::{Appointment, AppointmentStatus};
use crate::error::{Result, SlotError};

/// One cell of a month view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub appointments: Vec<Appointment>,
    pub is_today: bool,
    pub is_past: bool,
}

/// Appointments whose `date` is `day`, in input order.
pub fn appointments_on<'a>(appointments: &'a [Appointment], day: NaiveDate) -> Vec<&'a Appointment> {
    appointments.iter().filter(|a| a.date == day).collect()
}

/// Build the month view for `year`/`month`: one [`CalendarDay`] per day,
/// in calendar order, each holding that day's appointments sorted by start
/// time.
///
/// # Errors
/// Returns `SlotError::InvalidDate` if `month` is not in `1..=12` or the
/// year is out of range.
pub fn month_view(
    appointments: &[Appointment],
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<Vec<CalendarDay>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| SlotError::InvalidDate(format!("{}-{:02}", year, month)))?;

    let days: Vec<CalendarDay> = first
        .iter_days()
        .take_while(|d| d.month() == month)
        .map(|date| {
            let mut on_day: Vec<Appointment> =
                appointments_on(appointments, date).into_iter().cloned().collect();
            on_day.sort_by_key(|a| a.start_time);
            CalendarDay {
                date,
                appointments: on_day,
                is_today: date == today,
                is_past: date < today,
            }
        })
        .collect();

    debug!(
        year,
        month,
        days = days.len(),
        appointments = appointments.len(),
        "built month view"
    );
    Ok(days)
}

/// Dates a client may pick on the public booking page: the `horizon_days`
/// days starting at `from`, restricted to `working_days`.
pub fn bookable_dates(from: NaiveDate, horizon_days: u32, working_days: &[Weekday]) -> Vec<NaiveDate> {
    (0..i64::from(horizon_days))
        .filter_map(|offset| from.checked_add_signed(Duration::days(offset)))
        .filter(|d| working_days.contains(&d.weekday()))
        .collect()
}

/// Filter for the appointment list: a case-insensitive `search` over client
/// id, client name and notes, and an optional exact `status`.
///
/// An empty search matches everything.
pub fn filter_appointments<'a>(
    appointments: &'a [Appointment],
    search: &str,
    status: Option<AppointmentStatus>,
) -> Vec<&'a Appointment> {
    let needle = search.trim().to_lowercase();
    appointments
        .iter()
        .filter(|a| status.is_none_or(|s| a.status == s))
        .filter(|a| {
            needle.is_empty()
                || a.client_id.to_lowercase().contains(&needle)
                || a.client_name.to_lowercase().contains(&needle)
                || a
                    .notes
                    .as_deref()
                    .is_some_and(|n| n.to_lowercase().contains(&needle))
        })
        .collect()
}
