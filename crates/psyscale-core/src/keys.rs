//! Object-store key conventions.
//!
//! Pure string functions. These define the canonical layout of records in
//! the Psyscale bucket (or the in-memory store used by tests).

use uuid::Uuid;

pub const PATIENTS_PREFIX: &str = "patients/";
pub const PROFESSIONALS_PREFIX: &str = "professionals/";
pub const USERS_PREFIX: &str = "users/";
pub const SCALES_PREFIX: &str = "scales/";
pub const SCALE_REQUESTS_PREFIX: &str = "scale_requests/";
pub const SCALE_RESPONSES_PREFIX: &str = "scale_responses/";

pub fn patient(id: Uuid) -> String {
    format!("{PATIENTS_PREFIX}{id}.json")
}

pub fn professional(id: Uuid) -> String {
    format!("{PROFESSIONALS_PREFIX}{id}.json")
}

pub fn user(id: Uuid) -> String {
    format!("{USERS_PREFIX}{id}.json")
}

/// Scales are keyed by their code (`SRS2SR`, `PSA`, ...), not by id.
pub fn scale(code: &str) -> String {
    format!("{SCALES_PREFIX}{code}.json")
}

pub fn scale_request(id: Uuid) -> String {
    format!("{SCALE_REQUESTS_PREFIX}{id}.json")
}

pub fn scale_response(id: Uuid) -> String {
    format!("{SCALE_RESPONSES_PREFIX}{id}.json")
}
