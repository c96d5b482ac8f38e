//! Who may do what. Every check takes the acting [`User`] and, where the
//! answer depends on it, the record being acted on.
//!
//! Admins may do everything except edit a stored response. "Staff" means an
//! admin or a professional linked to a professional record.

use psyscale_core::models::{Patient, ScaleRequest, ScaleResponse, User};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Index,
    Show,
    Create,
    Update,
    Destroy,
    Cancel,
    Respond,
    Interpretation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dashboard {
    Main,
    Professionals,
    Patients,
}

pub fn is_staff(user: &User) -> bool {
    user.is_admin() || (user.is_professional() && user.account_id.is_some())
}

/// Patient record this user logs in as, if any.
pub fn own_patient_id(user: &User) -> Option<Uuid> {
    user.is_patient().then_some(user.account_id).flatten()
}

fn owns(user: &User, patient_id: Uuid) -> bool {
    own_patient_id(user) == Some(patient_id)
}

pub fn dashboard(user: &User, which: Dashboard) -> bool {
    match which {
        Dashboard::Main => true,
        Dashboard::Professionals => user.is_admin() || user.is_professional(),
        Dashboard::Patients => user.is_patient(),
    }
}

pub fn patient(user: &User, action: Action, record: Option<&Patient>) -> bool {
    match action {
        Action::Index | Action::Create | Action::Destroy => is_staff(user),
        Action::Show | Action::Update => {
            is_staff(user) || record.is_some_and(|p| owns(user, p.id))
        }
        _ => false,
    }
}

/// Staff see every patient; a patient sees only themself.
pub fn scope_patients(user: &User, patients: Vec<Patient>) -> Vec<Patient> {
    if is_staff(user) {
        return patients;
    }
    patients.into_iter().filter(|p| owns(user, p.id)).collect()
}

pub fn professional(user: &User, action: Action) -> bool {
    match action {
        Action::Index | Action::Show | Action::Create | Action::Update | Action::Destroy => {
            is_staff(user)
        }
        _ => false,
    }
}

pub fn scale(user: &User, action: Action) -> bool {
    match action {
        Action::Index | Action::Show => user.is_admin() || user.is_professional(),
        Action::Create | Action::Update | Action::Destroy => user.is_admin(),
        _ => false,
    }
}

/// `has_response` tells whether a response was already stored for the request.
pub fn scale_request(
    user: &User,
    action: Action,
    record: Option<&ScaleRequest>,
    has_response: bool,
) -> bool {
    let staff = user.is_admin() || user.is_professional();
    match action {
        Action::Index => staff || user.is_patient(),
        Action::Show => staff || record.is_some_and(|r| owns(user, r.patient_id)),
        Action::Create | Action::Update | Action::Destroy | Action::Cancel => staff,
        Action::Respond => {
            let Some(r) = record else {
                return false;
            };
            if !r.is_pending() || has_response {
                return false;
            }
            staff || owns(user, r.patient_id)
        }
        Action::Interpretation => false,
    }
}

/// Staff see every request; a patient sees only their own.
pub fn scope_scale_requests(user: &User, requests: Vec<ScaleRequest>) -> Vec<ScaleRequest> {
    if user.is_admin() || user.is_professional() {
        return requests;
    }
    requests
        .into_iter()
        .filter(|r| owns(user, r.patient_id))
        .collect()
}

pub fn scale_response(user: &User, action: Action, record: Option<&ScaleResponse>) -> bool {
    let staff = user.is_admin() || user.is_professional();
    match action {
        Action::Index | Action::Interpretation | Action::Destroy => staff,
        Action::Show | Action::Create => {
            staff || record.is_some_and(|r| owns(user, r.patient_id))
        }
        _ => false,
    }
}

/// SRS-2 interpretation page: admins, the professional who made the request,
/// or the patient who answered.
pub fn srs2_interpretation(user: &User, response: &ScaleResponse, request: &ScaleRequest) -> bool {
    if user.is_admin() {
        return true;
    }
    if user.is_professional() {
        return user.account_id == Some(request.professional_id);
    }
    owns(user, response.patient_id)
}
