//! Shop settings: barbers, their business hours, and the service catalogue.
//!
//! Loaded from TOML. Every field has a default, so an empty document yields
//! the stock single-barber shop:
//!
//! ```toml
//! name = "Barbearia"
//! timezone = "America/Sao_Paulo"
//! advance_booking_days = 30
//! overlap_rule = "start-within"
//!
//! [[barbers]]
//! id = "barber1"
//! name = "João Barbearia"
//! working_days = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
//! hours = { open = "08:00", close = "18:00", slot_minutes = 30 }
//!
//! [[services]]
//! id = "1"
//! name = "Corte"
//! duration = 30
//! price = 25.0
//! barber_id = "barber1"
//! ```

use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::grid::SlotGrid;
use crate::slots::{OverlapRule, SlotEngine};

const DEFAULT_BARBER_ID: &str = "barber1";

/// A bookable service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    /// Length in minutes.
    pub duration: u32,
    pub price: f64,
    pub barber_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A barber and the hours they take bookings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarberProfile {
    pub id: String,
    pub name: String,
    #[serde(default = "default_working_days")]
    pub working_days: Vec<Weekday>,
    #[serde(default)]
    pub hours: SlotGrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopSettings {
    pub name: String,
    /// IANA timezone the shop's wall-clock times refer to.
    pub timezone: String,
    /// How many days ahead the public booking page offers.
    pub advance_booking_days: u32,
    pub overlap_rule: OverlapRule,
    pub barbers: Vec<BarberProfile>,
    pub services: Vec<Service>,
}

impl Default for ShopSettings {
    fn default() -> Self {
        let service = |id: &str, name: &str, duration: u32, price: f64| Service {
            id: id.to_string(),
            name: name.to_string(),
            duration,
            price,
            barber_id: DEFAULT_BARBER_ID.to_string(),
            description: None,
        };

        ShopSettings {
            name: "Barbearia".to_string(),
            timezone: "America/Sao_Paulo".to_string(),
            advance_booking_days: 30,
            overlap_rule: OverlapRule::default(),
            barbers: vec![BarberProfile {
                id: DEFAULT_BARBER_ID.to_string(),
                name: "João Barbearia".to_string(),
                working_days: default_working_days(),
                hours: SlotGrid::default(),
            }],
            services: vec![
                service("1", "Corte", 30, 25.0),
                service("2", "Barba", 30, 20.0),
                service("3", "Corte + Barba", 60, 40.0),
                service("4", "Sobrancelha", 15, 15.0),
            ],
        }
    }
}

fn default_working_days() -> Vec<Weekday> {
    vec![
        Weekday::Mon,
        Weekday::Tue,
        Weekday::Wed,
        Weekday::Thu,
        Weekday::Fri,
        Weekday::Sat,
    ]
}

impl ShopSettings {
    /// Parse and validate settings from a TOML document.
    ///
    /// # Errors
    /// Returns `SlotError::Toml` for malformed TOML (including invalid grids
    /// and times) and `SlotError::Config`/`SlotError::InvalidTimezone` for
    /// documents that parse but fail [`ShopSettings::validate`].
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let settings: ShopSettings = toml::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a TOML file.
    ///
    /// # Errors
    /// Returns `SlotError::Config` if the file cannot be read, otherwise as
    /// [`ShopSettings::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SlotError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)
    }

    /// Check cross-field consistency.
    ///
    /// # Errors
    /// Returns `SlotError::InvalidTimezone` for an unknown IANA name and
    /// `SlotError::Config` for missing barbers or services, duplicate ids,
    /// barbers without working days, zero-length services, or services that
    /// reference an unknown barber.
    pub fn validate(&self) -> Result<()> {
        self.timezone()?;

        if self.barbers.is_empty() {
            return Err(SlotError::Config("no barbers configured".to_string()));
        }
        let mut barber_ids = HashSet::new();
        for barber in &self.barbers {
            if !barber_ids.insert(barber.id.as_str()) {
                return Err(SlotError::Config(format!("duplicate barber id '{}'", barber.id)));
            }
            if barber.working_days.is_empty() {
                return Err(SlotError::Config(format!(
                    "barber '{}' has no working days",
                    barber.id
                )));
            }
        }

        if self.services.is_empty() {
            return Err(SlotError::Config("no services configured".to_string()));
        }
        let mut service_ids = HashSet::new();
        for service in &self.services {
            if !service_ids.insert(service.id.as_str()) {
                return Err(SlotError::Config(format!(
                    "duplicate service id '{}'",
                    service.id
                )));
            }
            if service.duration == 0 {
                return Err(SlotError::Config(format!(
                    "service '{}' has zero duration",
                    service.id
                )));
            }
            if !barber_ids.contains(service.barber_id.as_str()) {
                return Err(SlotError::Config(format!(
                    "service '{}' references unknown barber '{}'",
                    service.id, service.barber_id
                )));
            }
        }
        Ok(())
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| SlotError::InvalidTimezone(self.timezone.clone()))
    }

    /// The current calendar date in the shop's timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }

    pub fn barber(&self, id: &str) -> Result<&BarberProfile> {
        self.barbers
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| SlotError::NotFound(format!("barber {}", id)))
    }

    /// The barber used when none is specified: the first one configured.
    pub fn default_barber(&self) -> Result<&BarberProfile> {
        self.barbers
            .first()
            .ok_or_else(|| SlotError::Config("no barbers configured".to_string()))
    }

    pub fn service(&self, id: &str) -> Result<&Service> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| SlotError::NotFound(format!("service {}", id)))
    }

    pub fn services_for(&self, barber_id: &str) -> Vec<&Service> {
        self.services
            .iter()
            .filter(|s| s.barber_id == barber_id)
            .collect()
    }

    /// The service preselected for a barber: the first one in the catalogue.
    pub fn default_service(&self, barber_id: &str) -> Result<&Service> {
        self.services_for(barber_id)
            .into_iter()
            .next()
            .ok_or_else(|| SlotError::NotFound(format!("services for barber {}", barber_id)))
    }

    /// A slot engine using the barber's hours and the shop's overlap rule.
    pub fn engine_for(&self, barber_id: &str) -> Result<SlotEngine> {
        let barber = self.barber(barber_id)?;
        Ok(SlotEngine::new(barber.hours, self.overlap_rule))
    }
}
