//! Logins created alongside patient and professional records.

use psyscale_core::models::{Role, User};
use rand::Rng;
use rand::distr::Alphanumeric;
use uuid::Uuid;

use crate::error::AuthError;
use crate::password::hash_password;

/// A new user together with the plaintext password shown once to staff.
#[derive(Debug, Clone)]
pub struct GeneratedLogin {
    pub user: User,
    pub password: String,
}

/// Patients start with the first six digits of their CPF.
pub fn patient_initial_password(cpf: &str) -> String {
    cpf.chars().filter(char::is_ascii_digit).take(6).collect()
}

/// Professionals get six random alphanumerics.
pub fn professional_initial_password() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect()
}

pub fn new_user(
    email: &str,
    role: Role,
    account_id: Option<Uuid>,
    password: &str,
    force_password_reset: bool,
    now: jiff::Timestamp,
) -> Result<User, AuthError> {
    Ok(User {
        id: Uuid::new_v4(),
        email: email.trim().to_lowercase(),
        password_hash: hash_password(password)?,
        role,
        account_id,
        force_password_reset,
        failed_attempts: 0,
        locked_at: None,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    })
}

pub fn patient_login(
    email: &str,
    patient_id: Uuid,
    cpf: &str,
    now: jiff::Timestamp,
) -> Result<GeneratedLogin, AuthError> {
    let password = patient_initial_password(cpf);
    let user = new_user(email, Role::Patient, Some(patient_id), &password, false, now)?;
    Ok(GeneratedLogin { user, password })
}

pub fn professional_login(
    email: &str,
    professional_id: Uuid,
    now: jiff::Timestamp,
) -> Result<GeneratedLogin, AuthError> {
    let password = professional_initial_password();
    let user = new_user(
        email,
        Role::Professional,
        Some(professional_id),
        &password,
        true,
        now,
    )?;
    Ok(GeneratedLogin { user, password })
}
