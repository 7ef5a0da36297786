//! # slot-engine
//!
//! Deterministic appointment slot availability for barbershop booking.
//!
//! Given a day, a barber, a service duration and the barber's existing
//! appointments, the engine produces the day's fixed-granularity slot grid
//! with every slot marked available or occupied, and the occupying
//! appointment attached. Everything around it (calendar grouping, the
//! repository capability, sessions, shop settings, the public booking flow)
//! consumes or feeds that one computation.
//!
//! ## Quick start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use slot_engine::{compute_slots, parse_appointments};
//!
//! let appointments = parse_appointments(r#"[{
//!     "id": "a1", "barberId": "barber1", "date": "2024-06-10",
//!     "startTime": "14:00", "duration": 60, "status": "confirmed"
//! }]"#).unwrap();
//!
//! let day = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
//! let slots = compute_slots(day, "barber1", 30, &appointments).unwrap();
//!
//! assert_eq!(slots.len(), 20);
//! let two_pm = slots.iter().find(|s| s.time.to_string() == "14:00:00").unwrap();
//! assert!(!two_pm.available);
//! assert_eq!(two_pm.appointment_id.as_deref(), Some("a1"));
//! ```
//!
//! ## Modules
//!
//! - [`slots`]: the slot availability engine and overlap rules
//! - [`grid`]: business hours and slot granularity
//! - [`appointment`]: appointment records, validation, patches
//! - [`clock`]: strict `"HH:MM"` wall-clock parsing
//! - [`calendar`]: per-day grouping, month views, bookable dates, list filters
//! - [`repository`]: appointment storage capability and in-memory store
//! - [`session`]: explicit signed-in identity
//! - [`config`]: shop settings loaded from TOML
//! - [`booking`]: the public booking flow
//! - [`error`]: Error types

pub mod appointment;
pub mod booking;
pub mod calendar;
pub mod clock;
pub mod config;
pub mod error;
pub mod grid;
pub mod repository;
pub mod session;
pub mod slots;

pub use appointment::{parse_appointments, Appointment, AppointmentPatch, AppointmentStatus, NewAppointment};
pub use booking::{BookingFlow, BookingStep, ContactDetails};
pub use calendar::{appointments_on, bookable_dates, filter_appointments, month_view, CalendarDay};
pub use config::{BarberProfile, Service, ShopSettings};
pub use error::SlotError;
pub use grid::SlotGrid;
pub use repository::{AppointmentRepository, InMemoryRepository};
pub use session::{Role, Session, User};
pub use slots::{available_times, compute_slots, OverlapRule, SlotEngine, TimeSlot};
