use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;
use validator::Validate;

use super::patient::{Gender, age_between};
use crate::validation::validate_cpf;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Professional {
    pub id: Uuid,
    pub full_name: String,
    pub gender: Option<Gender>,
    pub birthday: Option<Date>,
    pub email: String,
    pub cpf: String,
    /// Council registration number (CRP, CRM).
    pub professional_id: Option<String>,
    pub rg: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub deleted_at: Option<jiff::Timestamp>,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

impl Professional {
    pub fn age_on(&self, today: Date) -> Option<i16> {
        self.birthday.map(|b| age_between(b, today))
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

    pub fn apply(&mut self, input: NewProfessional, now: jiff::Timestamp) {
        self.full_name = input.full_name;
        self.gender = input.gender;
        self.birthday = input.birthday;
        self.email = input.email;
        self.cpf = input.cpf;
        self.professional_id = input.professional_id;
        self.rg = input.rg;
        self.phone = input.phone;
        self.address = input.address;
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, TS)]
#[ts(export)]
pub struct NewProfessional {
    #[validate(length(min = 5, message = "full_name must have at least 5 characters"))]
    pub full_name: String,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub birthday: Option<Date>,
    #[validate(email(message = "email is invalid"))]
    pub email: String,
    #[validate(custom(function = "validate_cpf"))]
    pub cpf: String,
    #[serde(default)]
    pub professional_id: Option<String>,
    #[serde(default)]
    pub rg: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

impl NewProfessional {
    pub fn into_professional(self, now: jiff::Timestamp) -> Professional {
        Professional {
            id: Uuid::new_v4(),
            full_name: self.full_name,
            gender: self.gender,
            birthday: self.birthday,
            email: self.email,
            cpf: self.cpf,
            professional_id: self.professional_id,
            rg: self.rg,
            phone: self.phone,
            address: self.address,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}
