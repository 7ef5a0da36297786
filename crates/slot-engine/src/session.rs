//! Signed-in identity, passed explicitly to whatever needs it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::appointment::Appointment;
use crate::error::Result;
use crate::repository::AppointmentRepository;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Barber,
    Client,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
    pub role: Role,
}

/// A user's session, from sign-in until [`Session::end`].
#[derive(Debug, Clone)]
pub struct Session {
    user: User,
    started_at: DateTime<Utc>,
}

impl Session {
    pub fn start(user: User) -> Self {
        info!(user_id = %user.id, role = ?user.role, "session started");
        Session {
            user,
            started_at: Utc::now(),
        }
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn is_barber(&self) -> bool {
        self.user.role == Role::Barber
    }

    /// The appointments this user may see: a barber's own calendar, or a
    /// client's own bookings.
    pub fn visible_appointments<R: AppointmentRepository + ?Sized>(
        &self,
        repository: &R,
    ) -> Result<Vec<Appointment>> {
        match self.user.role {
            Role::Barber => repository.list(&self.user.id),
            Role::Client => repository.list_for_client(&self.user.id),
        }
    }

    /// Sign out. Returns the user that was signed in.
    pub fn end(self) -> User {
        info!(
            user_id = %self.user.id,
            duration_secs = (Utc::now() - self.started_at).num_seconds(),
            "session ended"
        );
        self.user
    }
}
