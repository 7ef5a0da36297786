//! The public booking flow: date, time, service, contact details, confirmation.
//!
//! Slots shown at the time step are computed with the barber's default
//! service, because the client has not picked one yet. Once a service is
//! chosen the slots are recomputed with its real duration, and a time that
//! no longer fits sends the flow back to the time step. Submission checks
//! the slot once more against a fresh snapshot from the repository.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentStatus, NewAppointment};
use crate::calendar::bookable_dates;
use crate::clock::format_wall_clock;
use crate::config::{BarberProfile, Service, ShopSettings};
use crate::error::{Result, SlotError};
use crate::repository::AppointmentRepository;
use crate::slots::{SlotEngine, TimeSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStep {
    Date,
    Time,
    Service,
    Client,
    Confirm,
}

/// What the client types into the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// State of one anonymous visitor's booking.
#[derive(Debug, Clone)]
pub struct BookingFlow<'a> {
    settings: &'a ShopSettings,
    barber: &'a BarberProfile,
    engine: SlotEngine,
    step: BookingStep,
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    service: Option<&'a Service>,
    contact: Option<ContactDetails>,
    appointment_id: Option<String>,
}

impl<'a> BookingFlow<'a> {
    /// Start a booking with `barber_id`.
    ///
    /// # Errors
    /// Returns `SlotError::NotFound` if the barber is unknown or has no
    /// services to book.
    pub fn new(settings: &'a ShopSettings, barber_id: &str) -> Result<Self> {
        let barber = settings.barber(barber_id)?;
        settings.default_service(barber_id)?;
        Ok(BookingFlow {
            settings,
            barber,
            engine: settings.engine_for(barber_id)?,
            step: BookingStep::Date,
            date: None,
            time: None,
            service: None,
            contact: None,
            appointment_id: None,
        })
    }

    pub fn step(&self) -> BookingStep {
        self.step
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn service(&self) -> Option<&'a Service> {
        self.service
    }

    pub fn contact(&self) -> Option<&ContactDetails> {
        self.contact.as_ref()
    }

    /// The id of the created appointment, once submitted.
    pub fn appointment_id(&self) -> Option<&str> {
        self.appointment_id.as_deref()
    }

    /// Dates offered on the date step, starting at `today`.
    pub fn bookable_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        bookable_dates(
            today,
            self.settings.advance_booking_days,
            &self.barber.working_days,
        )
    }

    /// Duration used for slot computation: the chosen service, or the
    /// barber's default service before one is chosen.
    fn duration_minutes(&self) -> Result<i64> {
        let service = match self.service {
            Some(service) => service,
            None => self.settings.default_service(&self.barber.id)?,
        };
        Ok(i64::from(service.duration))
    }

    /// # Errors
    /// Returns `SlotError::InvalidDate` if the barber does not work that weekday.
    pub fn select_date(&mut self, date: NaiveDate) -> Result<()> {
        if !self.barber.working_days.contains(&date.weekday()) {
            warn!(%date, barber_id = %self.barber.id, "rejected non-working day");
            return Err(SlotError::InvalidDate(format!(
                "{} is not a working day for {}",
                date, self.barber.name
            )));
        }
        self.date = Some(date);
        self.time = None;
        self.step = BookingStep::Time;
        Ok(())
    }

    /// The slot grid for the selected date.
    ///
    /// # Errors
    /// Returns `SlotError::IncompleteBooking` if no date is selected.
    pub fn time_slots(&self, appointments: &[Appointment]) -> Result<Vec<TimeSlot>> {
        let date = self.date.ok_or(SlotError::IncompleteBooking("date"))?;
        self.engine
            .compute_slots(date, &self.barber.id, self.duration_minutes()?, appointments)
    }

    fn is_free(&self, time: NaiveTime, appointments: &[Appointment]) -> Result<bool> {
        Ok(self
            .time_slots(appointments)?
            .iter()
            .any(|slot| slot.time == time && slot.available))
    }

    /// Pick a start time from the current slot grid.
    ///
    /// # Errors
    /// Returns `SlotError::IncompleteBooking` without a date,
    /// `SlotError::InvalidTime` for a time off the grid, and
    /// `SlotError::SlotUnavailable` for an occupied slot.
    pub fn select_time(&mut self, time: NaiveTime, appointments: &[Appointment]) -> Result<()> {
        let date = self.date.ok_or(SlotError::IncompleteBooking("date"))?;
        if !self.engine.grid().contains(time) {
            return Err(SlotError::InvalidTime(format_wall_clock(time)));
        }
        if !self.is_free(time, appointments)? {
            warn!(%date, time = %format_wall_clock(time), "rejected occupied slot");
            return Err(SlotError::SlotUnavailable { date, time });
        }

        self.time = Some(time);
        self.step = if self.service.is_some() {
            BookingStep::Client
        } else {
            BookingStep::Service
        };
        Ok(())
    }

    /// Pick the service and re-check the selected time with its duration.
    ///
    /// # Errors
    /// Returns `SlotError::NotFound` for a service this barber does not
    /// offer, `SlotError::IncompleteBooking` without a time, and
    /// `SlotError::SlotUnavailable` if the selected time no longer fits. In
    /// the last case the service is kept, the time is cleared and the flow
    /// returns to [`BookingStep::Time`].
    pub fn select_service(&mut self, service_id: &str, appointments: &[Appointment]) -> Result<()> {
        let service = self
            .settings
            .services_for(&self.barber.id)
            .into_iter()
            .find(|s| s.id == service_id)
            .ok_or_else(|| SlotError::NotFound(format!("service {}", service_id)))?;
        let date = self.date.ok_or(SlotError::IncompleteBooking("date"))?;
        let time = self.time.ok_or(SlotError::IncompleteBooking("time"))?;

        self.service = Some(service);
        if !self.is_free(time, appointments)? {
            warn!(
                service_id,
                time = %format_wall_clock(time),
                "selected time does not fit the chosen service"
            );
            self.time = None;
            self.step = BookingStep::Time;
            return Err(SlotError::SlotUnavailable { date, time });
        }
        self.step = BookingStep::Client;
        Ok(())
    }

    /// # Errors
    /// Returns `SlotError::InvalidContact` if the name or phone is blank.
    pub fn enter_contact(&mut self, contact: ContactDetails) -> Result<()> {
        if contact.name.trim().is_empty() {
            return Err(SlotError::InvalidContact("name is required".to_string()));
        }
        if contact.phone.trim().is_empty() {
            return Err(SlotError::InvalidContact("phone is required".to_string()));
        }
        self.contact = Some(contact);
        Ok(())
    }

    /// Create the appointment. Re-reads the barber's appointments first so a
    /// slot taken since it was selected is not double booked.
    ///
    /// Submitting twice returns the id of the first submission.
    ///
    /// # Errors
    /// Returns `SlotError::IncompleteBooking` for a missing selection,
    /// `SlotError::SlotUnavailable` if the slot was taken in the meantime
    /// (the flow returns to [`BookingStep::Time`]), and any repository error.
    pub fn submit<R: AppointmentRepository + ?Sized>(&mut self, repository: &mut R) -> Result<String> {
        if let Some(id) = &self.appointment_id {
            return Ok(id.clone());
        }

        let date = self.date.ok_or(SlotError::IncompleteBooking("date"))?;
        let time = self.time.ok_or(SlotError::IncompleteBooking("time"))?;
        let service = self.service.ok_or(SlotError::IncompleteBooking("service"))?;
        let contact = self
            .contact
            .clone()
            .ok_or(SlotError::IncompleteBooking("contact details"))?;

        let current = repository.list(&self.barber.id)?;
        if !self.is_free(time, &current)? {
            warn!(%date, time = %format_wall_clock(time), "slot taken before submission");
            self.time = None;
            self.step = BookingStep::Time;
            return Err(SlotError::SlotUnavailable { date, time });
        }

        let new = NewAppointment {
            client_id: format!("guest-{}", Uuid::new_v4()),
            client_name: contact.name,
            client_phone: contact.phone,
            client_email: contact.email.filter(|e| !e.trim().is_empty()),
            barber_id: self.barber.id.clone(),
            barber_name: self.barber.name.clone(),
            service: service.name.clone(),
            service_id: Some(service.id.clone()),
            date,
            start_time: time,
            duration: service.duration,
            price: service.price,
            status: AppointmentStatus::Pending,
            notes: None,
        };
        let id = repository.create(new)?;

        info!(%id, %date, time = %format_wall_clock(time), service = %service.name, "booking submitted");
        self.appointment_id = Some(id.clone());
        self.step = BookingStep::Confirm;
        Ok(id)
    }
}
