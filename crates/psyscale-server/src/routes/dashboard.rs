use axum::extract::State;
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Dashboard};
use psyscale_core::models::{Patient, ScaleRequest};
use serde::Serialize;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::authorize;
use crate::routes::scale_requests::{RequestWithResponse, attach_responses, split_by_status};
use crate::state::AppState;

#[derive(Serialize)]
pub struct DashboardTarget {
    pub redirect: &'static str,
}

/// Which dashboard the caller lands on.
pub async fn show(Extension(auth): Extension<AuthUser>) -> Result<Json<DashboardTarget>, ApiError> {
    let user = &auth.user;
    authorize(policy::dashboard(user, Dashboard::Main))?;

    if user.is_admin() || user.is_professional() {
        Ok(Json(DashboardTarget {
            redirect: "/dashboard/professionals",
        }))
    } else if policy::own_patient_id(user).is_some() {
        Ok(Json(DashboardTarget {
            redirect: "/dashboard/patients",
        }))
    } else {
        Err(ApiError::Forbidden("Conta sem perfil associado.".to_string()))
    }
}

#[derive(Serialize)]
pub struct ProfessionalsDashboard {
    pub patients: Vec<Patient>,
    pub pending_requests: usize,
}

pub async fn professionals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfessionalsDashboard>, ApiError> {
    authorize(policy::dashboard(&auth.user, Dashboard::Professionals))?;

    let mut patients = repo::patients(state.store()).await?;
    patients.sort_by(|a, b| a.full_name.cmp(&b.full_name));

    let pending_requests = policy::scope_scale_requests(
        &auth.user,
        repo::scale_requests(state.store()).await?,
    )
    .iter()
    .filter(|r| r.is_pending())
    .count();

    Ok(Json(ProfessionalsDashboard {
        patients,
        pending_requests,
    }))
}

#[derive(Serialize)]
pub struct PatientsDashboard {
    pub patient: Patient,
    pub pending_requests: Vec<ScaleRequest>,
    pub completed_requests: Vec<RequestWithResponse>,
}

pub async fn patients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<PatientsDashboard>, ApiError> {
    authorize(policy::dashboard(&auth.user, Dashboard::Patients))?;
    let patient_id = policy::own_patient_id(&auth.user)
        .ok_or_else(|| ApiError::Forbidden("Acesso restrito a pacientes.".to_string()))?;

    let patient = repo::patient(state.store(), patient_id).await?;
    let requests: Vec<ScaleRequest> = repo::scale_requests(state.store())
        .await?
        .into_iter()
        .filter(|r| r.patient_id == patient.id)
        .collect();
    let (pending_requests, completed_requests) = split_by_status(requests);
    let completed_requests = attach_responses(state.store(), completed_requests).await?;

    Ok(Json(PatientsDashboard {
        patient,
        pending_requests,
        completed_requests,
    }))
}
