use std::cmp::Ordering;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use jiff::Timestamp;
use psyscale_auth::credentials;
use psyscale_auth::policy::{self, Action};
use psyscale_core::models::{NewPatient, Patient, ScaleRequest};
use psyscale_core::validation;
use psyscale_storage::records;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::scale_requests::{RequestWithResponse, attach_responses, split_by_status};
use crate::routes::{authorize, now};
use crate::state::AppState;

const SEARCH_LIMIT: usize = 10;

#[derive(Debug, Serialize)]
pub struct PatientListItem {
    #[serde(flatten)]
    pub patient: Patient,
    pub pending_requests: usize,
    pub latest_pending_at: Option<Timestamp>,
}

/// Patients with pending requests first, most recent pending request first;
/// the rest by name.
pub fn order_patients(patients: Vec<Patient>, requests: &[ScaleRequest]) -> Vec<PatientListItem> {
    let mut items: Vec<PatientListItem> = patients
        .into_iter()
        .map(|patient| {
            let pending = requests
                .iter()
                .filter(|r| r.patient_id == patient.id && r.is_pending());
            let (count, latest) = pending.fold((0, None), |(n, latest), r| {
                (n + 1, latest.max(Some(r.requested_at)))
            });
            PatientListItem {
                patient,
                pending_requests: count,
                latest_pending_at: latest,
            }
        })
        .collect();

    items.sort_by(|a, b| match (a.latest_pending_at, b.latest_pending_at) {
        (Some(x), Some(y)) => y
            .cmp(&x)
            .then_with(|| a.patient.full_name.cmp(&b.patient.full_name)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.patient.full_name.cmp(&b.patient.full_name),
    });
    items
}

pub async fn list_patients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PatientListItem>>, ApiError> {
    authorize(policy::patient(&auth.user, Action::Index, None))?;

    let patients = policy::scope_patients(&auth.user, repo::patients(state.store()).await?);
    let requests = repo::scale_requests(state.store()).await?;
    Ok(Json(order_patients(patients, &requests)))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SearchHit {
    pub id: Uuid,
    pub text: String,
    pub email: String,
}

/// Case-insensitive substring match on the name, at most ten, by name.
pub fn search(patients: Vec<Patient>, query: Option<&str>) -> Vec<SearchHit> {
    let needle = query.map(str::trim).unwrap_or_default().to_lowercase();
    let mut matches: Vec<Patient> = patients
        .into_iter()
        .filter(|p| needle.is_empty() || p.full_name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    matches
        .into_iter()
        .take(SEARCH_LIMIT)
        .map(|p| SearchHit {
            id: p.id,
            text: p.full_name,
            email: p.email,
        })
        .collect()
}

pub async fn search_patients(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<SearchHit>>, ApiError> {
    authorize(policy::patient(&auth.user, Action::Index, None))?;

    let patients = policy::scope_patients(&auth.user, repo::patients(state.store()).await?);
    Ok(Json(search(patients, query.q.as_deref())))
}

#[derive(Serialize)]
pub struct PatientDetail {
    #[serde(flatten)]
    pub patient: Patient,
    pub pending_requests: Vec<ScaleRequest>,
    pub completed_requests: Vec<RequestWithResponse>,
}

pub async fn get_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientDetail>, ApiError> {
    let patient = repo::patient(state.store(), id).await?;
    authorize(policy::patient(&auth.user, Action::Show, Some(&patient)))?;

    let requests: Vec<ScaleRequest> = repo::scale_requests(state.store())
        .await?
        .into_iter()
        .filter(|r| r.patient_id == patient.id)
        .collect();
    let (pending_requests, completed) = split_by_status(requests);

    Ok(Json(PatientDetail {
        patient,
        pending_requests,
        completed_requests: attach_responses(state.store(), completed).await?,
    }))
}

#[derive(Serialize)]
pub struct CreatedPatient {
    pub patient: Patient,
    /// Initial password of the patient's login, shown once.
    pub initial_password: String,
}

pub async fn create_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<NewPatient>,
) -> Result<(StatusCode, Json<CreatedPatient>), ApiError> {
    authorize(policy::patient(&auth.user, Action::Create, None))?;
    validation::check(&input)?;

    if repo::user_by_email(state.store(), &input.email).await?.is_some() {
        return Err(ApiError::Conflict("e-mail já cadastrado".to_string()));
    }

    let now = now();
    let patient = input.into_patient(now);
    let login = credentials::patient_login(&patient.email, patient.id, &patient.cpf, now)?;

    records::save(state.store(), &patient).await?;
    records::save(state.store(), &login.user).await?;

    tracing::info!(patient_id = %patient.id, "patient created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedPatient {
            patient,
            initial_password: login.password,
        }),
    ))
}

pub async fn update_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewPatient>,
) -> Result<Json<Patient>, ApiError> {
    let mut patient = repo::patient(state.store(), id).await?;
    authorize(policy::patient(&auth.user, Action::Update, Some(&patient)))?;
    validation::check(&input)?;

    let now = now();
    let email_changed = !input.email.trim().eq_ignore_ascii_case(&patient.email);
    if email_changed {
        if let Some(other) = repo::user_by_email(state.store(), &input.email).await? {
            if other.account_id != Some(patient.id) {
                return Err(ApiError::Conflict("e-mail já cadastrado".to_string()));
            }
        }
    }

    patient.apply(input, now);
    records::save(state.store(), &patient).await?;

    // Keep the login on the same address as the record.
    if email_changed {
        if let Some(mut user) = repo::user_by_account(state.store(), patient.id).await? {
            user.email = patient.email.trim().to_lowercase();
            user.updated_at = now;
            records::save(state.store(), &user).await?;
        }
    }

    Ok(Json(patient))
}

pub async fn delete_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut patient = repo::patient(state.store(), id).await?;
    authorize(policy::patient(&auth.user, Action::Destroy, Some(&patient)))?;

    let now = now();
    patient.soft_delete(now);
    records::save(state.store(), &patient).await?;
    repo::delete_login(state.store(), patient.id, now).await?;

    tracing::info!(patient_id = %patient.id, "patient deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_patient(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Patient>, ApiError> {
    let mut patient = repo::patient_with_deleted(state.store(), id).await?;
    authorize(policy::patient(&auth.user, Action::Update, Some(&patient)))?;

    let now = now();
    repo::restore_login(state.store(), patient.id, now).await?;
    patient.restore(now);
    records::save(state.store(), &patient).await?;
    Ok(Json(patient))
}
