//! Appointment records and validation at the ingestion boundary.
//!
//! Records arrive from the storage collaborator as JSON snapshots. Every
//! record is validated on the way in, so the slot engine only ever sees
//! well-formed start times and positive durations.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::clock::wall_clock;
use crate::error::{Result, SlotError};

/// Lifecycle status of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Whether an appointment in this status occupies its time window.
    /// Only cancelled appointments release their slot.
    pub fn blocks_slots(self) -> bool {
        self != AppointmentStatus::Cancelled
    }
}

/// A booked appointment as stored by the appointment repository.
///
/// Serializes with a derived `endTime`; an incoming `endTime` is ignored and
/// recomputed from `startTime` and `duration`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_email: Option<String>,
    /// The barber this appointment belongs to.
    pub barber_id: String,
    #[serde(default)]
    pub barber_name: String,
    /// Display name of the booked service.
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub service_id: Option<String>,
    /// Calendar day of the appointment. The time of day lives in `start_time`.
    pub date: NaiveDate,
    #[serde(with = "wall_clock")]
    pub start_time: NaiveTime,
    /// Length in minutes.
    pub duration: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub client_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Wire form of [`Appointment`], borrowing its fields.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AppointmentRecord<'a> {
    id: &'a str,
    client_id: &'a str,
    client_name: &'a str,
    client_phone: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_email: Option<&'a str>,
    barber_id: &'a str,
    barber_name: &'a str,
    service: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_id: Option<&'a str>,
    date: NaiveDate,
    #[serde(with = "wall_clock")]
    start_time: NaiveTime,
    #[serde(with = "optional_wall_clock", skip_serializing_if = "Option::is_none")]
    end_time: Option<NaiveTime>,
    duration: u32,
    price: f64,
    status: AppointmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_notes: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    updated_at: Option<DateTime<Utc>>,
}

impl Serialize for Appointment {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        AppointmentRecord {
            id: &self.id,
            client_id: &self.client_id,
            client_name: &self.client_name,
            client_phone: &self.client_phone,
            client_email: self.client_email.as_deref(),
            barber_id: &self.barber_id,
            barber_name: &self.barber_name,
            service: &self.service,
            service_id: self.service_id.as_deref(),
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time().ok(),
            duration: self.duration,
            price: self.price,
            status: self.status,
            notes: self.notes.as_deref(),
            client_notes: self.client_notes.as_deref(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .serialize(serializer)
    }
}

impl Appointment {
    /// Materialize a creation payload under a freshly assigned id.
    pub fn from_new(id: impl Into<String>, new: NewAppointment, now: DateTime<Utc>) -> Self {
        Appointment {
            id: id.into(),
            client_id: new.client_id,
            client_name: new.client_name,
            client_phone: new.client_phone,
            client_email: new.client_email,
            barber_id: new.barber_id,
            barber_name: new.barber_name,
            service: new.service,
            service_id: new.service_id,
            date: new.date,
            start_time: new.start_time,
            duration: new.duration,
            price: new.price,
            status: new.status,
            notes: new.notes,
            client_notes: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// The half-open window `[start, start + duration)` this appointment occupies.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidAppointment` if the end of the window falls
    /// outside the representable date range.
    pub fn occupied_window(&self) -> Result<(NaiveDateTime, NaiveDateTime)> {
        let start = self.date.and_time(self.start_time);
        let end = start
            .checked_add_signed(Duration::minutes(i64::from(self.duration)))
            .ok_or_else(|| SlotError::InvalidAppointment {
                id: self.id.clone(),
                reason: "occupied window ends out of range".to_string(),
            })?;
        Ok((start, end))
    }

    /// Wall-clock end time. Wraps past midnight for appointments that cross it.
    ///
    /// # Errors
    /// As [`Appointment::occupied_window`].
    pub fn end_time(&self) -> Result<NaiveTime> {
        Ok(self.occupied_window()?.1.time())
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidAppointment` when the id or barber id is
    /// blank, the duration is zero, or the occupied window ends past the
    /// last representable date.
    pub fn validate(&self) -> Result<()> {
        let reject = |reason: &str| SlotError::InvalidAppointment {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if self.id.trim().is_empty() {
            return Err(reject("empty id"));
        }
        if self.barber_id.trim().is_empty() {
            return Err(reject("empty barberId"));
        }
        if self.duration == 0 {
            return Err(reject("duration must be positive"));
        }
        self.occupied_window()?;
        Ok(())
    }
}

/// Decode and validate a JSON array of appointment records.
///
/// Malformed `startTime` values fail decoding, and each decoded record is
/// checked with [`Appointment::validate`].
///
/// # Errors
/// Returns `SlotError::Json` for undecodable input (including malformed
/// wall-clock times) and `SlotError::InvalidAppointment` for records that
/// decode but break an invariant.
pub fn parse_appointments(json: &str) -> Result<Vec<Appointment>> {
    let appointments: Vec<Appointment> = serde_json::from_str(json)?;
    for appointment in &appointments {
        appointment.validate()?;
    }
    Ok(appointments)
}

/// Payload for creating an appointment. The repository assigns the id and
/// timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub client_phone: String,
    #[serde(default)]
    pub client_email: Option<String>,
    pub barber_id: String,
    #[serde(default)]
    pub barber_name: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub service_id: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "wall_clock")]
    pub start_time: NaiveTime,
    pub duration: u32,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Partial update of an appointment. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentPatch {
    pub status: Option<AppointmentStatus>,
    pub date: Option<NaiveDate>,
    #[serde(with = "optional_wall_clock")]
    pub start_time: Option<NaiveTime>,
    pub duration: Option<u32>,
    pub service: Option<String>,
    pub price: Option<f64>,
    pub notes: Option<String>,
}

impl AppointmentPatch {
    /// A patch that only changes the status.
    pub fn status(status: AppointmentStatus) -> Self {
        AppointmentPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Apply the patch in place and stamp `updated_at`.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidAppointment` if the patched record would
    /// fail [`Appointment::validate`], such as a zero duration; the
    /// appointment is left unchanged in that case.
    pub fn apply(&self, appointment: &mut Appointment, now: DateTime<Utc>) -> Result<()> {
        let mut patched = appointment.clone();
        if let Some(status) = self.status {
            patched.status = status;
        }
        if let Some(date) = self.date {
            patched.date = date;
        }
        if let Some(start_time) = self.start_time {
            patched.start_time = start_time;
        }
        if let Some(duration) = self.duration {
            patched.duration = duration;
        }
        if let Some(service) = &self.service {
            patched.service = service.clone();
        }
        if let Some(price) = self.price {
            patched.price = price;
        }
        if let Some(notes) = &self.notes {
            patched.notes = Some(notes.clone());
        }
        patched.validate()?;

        patched.updated_at = Some(now);
        *appointment = patched;
        Ok(())
    }
}

mod optional_wall_clock {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        time: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match time {
            Some(t) => crate::clock::wall_clock::serialize(t, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| crate::clock::parse_wall_clock(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}
