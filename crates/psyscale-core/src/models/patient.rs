use jiff::ToSpan;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_cpf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Date,
    pub started_at: Option<Date>,
    pub email: String,
    pub cpf: String,
    pub rg: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Patient {
    /// Age in full years on `today`. A birthday not yet reached this year
    /// does not count; a 29 February birthday counts on 28 February.
    pub fn age_on(&self, today: Date) -> i16 {
        age_between(self.birthday, today)
    }

    pub fn first_name(&self) -> &str {
        self.full_name.split_whitespace().next().unwrap_or("")
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self, now: jiff::Timestamp) {
        self.deleted_at = Some(now);
        self.updated_at = now;
    }

    pub fn restore(&mut self, now: jiff::Timestamp) {
        self.deleted_at = None;
        self.updated_at = now;
    }

    /// Replace the editable fields with a validated input.
    pub fn apply(&mut self, input: NewPatient, now: jiff::Timestamp) {
        self.full_name = input.full_name;
        self.gender = input.gender;
        self.birthday = input.birthday;
        self.started_at = input.started_at;
        self.email = input.email;
        self.cpf = input.cpf;
        self.rg = input.rg;
        self.phone = input.phone;
        self.address = input.address;
        self.updated_at = now;
    }
}

pub(crate) fn age_between(birthday: Date, today: Date) -> i16 {
    let mut age = today.year() - birthday.year();
    if today < birthday.saturating_add(age.years()) {
        age -= 1;
    }
    age
}

/// Create/update payload for a patient.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct NewPatient {
    #[validate(length(min = 5, message = "full_name must have at least 5 characters"))]
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Date,
    #[serde(default)]
    pub started_at: Option<Date>,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,
    #[serde(default)]
    pub rg: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewPatient {
    pub fn into_patient(self, now: jiff::Timestamp) -> Patient {
        Patient {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            gender: self.gender,
            birthday: self.birthday,
            started_at: self.started_at,
            email: self.email,
            cpf: self.cpf,
            rg: self.rg,
            phone: self.phone,
            address: self.address,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
