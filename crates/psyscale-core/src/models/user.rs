use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Professional,
    Patient,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Professional => "professional",
            Role::Patient => "patient",
        }
    }
}

/// Login account. Never exported to TypeScript because it carries the
/// password hash; the API exposes [`crate::models::Role`] and ids only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    /// Patient or professional record this login belongs to. Admins have none.
    pub account_id: Option<Uuid>,
    #[serde(default)]
    pub force_password_reset: bool,
    #[serde(default)]
    pub failed_attempts: u32,
    #[serde(default)]
    pub locked_at: Option<jiff::Timestamp>,
    #[serde(default)]
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_professional(&self) -> bool {
        self.role == Role::Professional
    }

    pub fn is_patient(&self) -> bool {
        self.role == Role::Patient
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self, now: jiff::Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    /// Also clears any lockout left from before the deletion.
    pub fn restore(&mut self, now: jiff::Timestamp) {
        self.deleted_at = None;
        self.failed_attempts = 0;
        self.locked_at = None;
        self.updated_at = now;
    }
}
