//! Slot availability for a single barber and day.
//!
//! Walks the business-hours grid and marks every slot start as available or
//! occupied by an existing, non-cancelled appointment of the same barber.
//! Appointments belonging to other barbers never affect the result.
//!
//! Runs in O(slots × appointments), which is fine for the tens of
//! appointments a barber has on a given day.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::appointment::Appointment;
use crate::clock::wall_clock;
use crate::error::{Result, SlotError};
use crate::grid::SlotGrid;

/// How a candidate slot is tested against an appointment's occupied window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapRule {
    /// The slot conflicts when its start falls inside `[appt.start, appt.end)`.
    /// A slot that starts before an appointment but runs into it stays available.
    #[default]
    StartWithin,
    /// The slot conflicts when `[slot.start, slot.start + service)` intersects
    /// `[appt.start, appt.end)`. Adjacent windows do not conflict.
    Interval,
}

impl OverlapRule {
    fn conflicts(
        self,
        slot: (NaiveDateTime, NaiveDateTime),
        appointment: (NaiveDateTime, NaiveDateTime),
    ) -> bool {
        let (slot_start, slot_end) = slot;
        let (appt_start, appt_end) = appointment;
        match self {
            OverlapRule::StartWithin => slot_start < appt_end && slot_start >= appt_start,
            OverlapRule::Interval => slot_start < appt_end && slot_end > appt_start,
        }
    }
}

/// One entry of the day's slot grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(with = "wall_clock")]
    pub time: NaiveTime,
    pub available: bool,
    /// Set iff `available` is false: the first conflicting appointment in
    /// input order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<String>,
}

/// Slot computation bound to a set of business hours and an overlap rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SlotEngine {
    grid: SlotGrid,
    rule: OverlapRule,
}

impl SlotEngine {
    pub fn new(grid: SlotGrid, rule: OverlapRule) -> Self {
        SlotEngine { grid, rule }
    }

    pub fn grid(&self) -> &SlotGrid {
        &self.grid
    }

    pub fn rule(&self) -> OverlapRule {
        self.rule
    }

    /// Compute the slot grid of `day` for `provider_id`.
    ///
    /// Only the calendar date of `day` is used; any time-of-day component is
    /// discarded. `service_duration_minutes` is the length of the booking
    /// being considered.
    ///
    /// Appointments are filtered to the provider and to statuses that block
    /// slots. When several appointments conflict with one slot, the first one
    /// in `appointments` order is attached.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidDuration` if `service_duration_minutes <= 0`
    /// or the slot window would end past the last representable date, and
    /// `SlotError::InvalidAppointment` for a blocking appointment whose own
    /// window is not representable.
    pub fn compute_slots<D: Datelike>(
        &self,
        day: D,
        provider_id: &str,
        service_duration_minutes: i64,
        appointments: &[Appointment],
    ) -> Result<Vec<TimeSlot>> {
        if service_duration_minutes <= 0 {
            return Err(SlotError::InvalidDuration(service_duration_minutes));
        }
        let day = calendar_date(&day)?;
        let service = Duration::try_minutes(service_duration_minutes)
            .ok_or(SlotError::InvalidDuration(service_duration_minutes))?;

        let blocking = appointments
            .iter()
            .filter(|a| a.barber_id == provider_id && a.status.blocks_slots())
            .map(|a| Ok((a, a.occupied_window()?)))
            .collect::<Result<Vec<(&Appointment, (NaiveDateTime, NaiveDateTime))>>>()?;

        debug!(
            %day,
            provider_id,
            service_duration_minutes,
            blocking = blocking.len(),
            rule = ?self.rule,
            "computing slots"
        );

        let slots = self
            .grid
            .starts()
            .map(|time| {
                let slot_start = day.and_time(time);
                let slot_end = slot_start
                    .checked_add_signed(service)
                    .ok_or(SlotError::InvalidDuration(service_duration_minutes))?;
                let conflict = blocking
                    .iter()
                    .find(|(_, occupied)| self.rule.conflicts((slot_start, slot_end), *occupied))
                    .map(|(appointment, _)| appointment.id.clone());

                Ok(TimeSlot {
                    time,
                    available: conflict.is_none(),
                    appointment_id: conflict,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(slots)
    }
}

/// Compute slots with the default engine: 08:00–18:00 in 30 minute steps
/// using [`OverlapRule::StartWithin`].
///
/// See [`SlotEngine::compute_slots`].
pub fn compute_slots<D: Datelike>(
    day: D,
    provider_id: &str,
    service_duration_minutes: i64,
    appointments: &[Appointment],
) -> Result<Vec<TimeSlot>> {
    SlotEngine::default().compute_slots(day, provider_id, service_duration_minutes, appointments)
}

/// Start times of the slots that are still free.
pub fn available_times(slots: &[TimeSlot]) -> Vec<NaiveTime> {
    slots.iter().filter(|s| s.available).map(|s| s.time).collect()
}

fn calendar_date<D: Datelike>(day: &D) -> Result<NaiveDate> {
    NaiveDate::from_ymd_opt(day.year(), day.month(), day.day()).ok_or_else(|| {
        SlotError::InvalidDate(format!("{}-{}-{}", day.year(), day.month(), day.day()))
    })
}
