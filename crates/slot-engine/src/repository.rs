//! Appointment storage capability.
//!
//! The engine never talks to a concrete store. Callers hand it snapshots
//! obtained through [`AppointmentRepository`], and writes go back through
//! the same trait. [`InMemoryRepository`] backs tests and the CLI.

use std::sync::mpsc::{self, Receiver, Sender};

use chrono::Utc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
use crate::error::{Result, SlotError};

/// Read/write access to appointment records.
pub trait AppointmentRepository {
    /// All appointments of a barber, ordered by date then start time.
    fn list(&self, provider_id: &str) -> Result<Vec<Appointment>>;

    /// All appointments booked by a client, ordered by date then start time.
    fn list_for_client(&self, client_id: &str) -> Result<Vec<Appointment>>;

    fn get(&self, id: &str) -> Result<Appointment>;

    /// Store a new appointment and return its id.
    fn create(&mut self, new: NewAppointment) -> Result<String>;

    fn update(&mut self, id: &str, patch: AppointmentPatch) -> Result<()>;

    /// Mark an appointment cancelled. Its slot frees up on the next snapshot.
    fn cancel(&mut self, id: &str) -> Result<()> {
        self.update(id, AppointmentPatch::status(AppointmentStatus::Cancelled))
    }
}

/// Vector-backed repository that pushes a full snapshot to its subscribers
/// after every write.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    appointments: Vec<Appointment>,
    subscribers: Vec<Sender<Vec<Appointment>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the repository with existing records, validating each one.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidAppointment` for the first invalid record.
    pub fn with_appointments(appointments: Vec<Appointment>) -> Result<Self> {
        for appointment in &appointments {
            appointment.validate()?;
        }
        Ok(InMemoryRepository {
            appointments,
            subscribers: Vec::new(),
        })
    }

    /// Every stored appointment, in insertion order.
    pub fn snapshot(&self) -> Vec<Appointment> {
        self.appointments.clone()
    }

    /// Receive a snapshot of all appointments after each subsequent write.
    pub fn subscribe(&mut self) -> Receiver<Vec<Appointment>> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self) {
        let snapshot = self.snapshot();
        // A failed send means the receiver was dropped.
        self.subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        debug!(subscribers = self.subscribers.len(), "published snapshot");
    }

    fn sorted(mut appointments: Vec<Appointment>) -> Vec<Appointment> {
        appointments.sort_by_key(|a| (a.date, a.start_time));
        appointments
    }
}

impl AppointmentRepository for InMemoryRepository {
    fn list(&self, provider_id: &str) -> Result<Vec<Appointment>> {
        Ok(Self::sorted(
            self.appointments
                .iter()
                .filter(|a| a.barber_id == provider_id)
                .cloned()
                .collect(),
        ))
    }

    fn list_for_client(&self, client_id: &str) -> Result<Vec<Appointment>> {
        Ok(Self::sorted(
            self.appointments
                .iter()
                .filter(|a| a.client_id == client_id)
                .cloned()
                .collect(),
        ))
    }

    fn get(&self, id: &str) -> Result<Appointment> {
        self.appointments
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| SlotError::NotFound(format!("appointment {}", id)))
    }

    fn create(&mut self, new: NewAppointment) -> Result<String> {
        let id = Uuid::new_v4().to_string();
        let appointment = Appointment::from_new(id.clone(), new, Utc::now());
        appointment.validate()?;

        info!(
            id = %appointment.id,
            barber_id = %appointment.barber_id,
            date = %appointment.date,
            start_time = %appointment.start_time,
            "created appointment"
        );
        self.appointments.push(appointment);
        self.publish();
        Ok(id)
    }

    fn update(&mut self, id: &str, patch: AppointmentPatch) -> Result<()> {
        let appointment = self
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| SlotError::NotFound(format!("appointment {}", id)))?;
        patch.apply(appointment, Utc::now())?;

        info!(id, status = ?appointment.status, "updated appointment");
        self.publish();
        Ok(())
    }
}
