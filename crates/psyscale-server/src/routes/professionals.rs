use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use psyscale_auth::credentials;
use psyscale_auth::policy::{self, Action};
use psyscale_core::models::{NewProfessional, Professional, RequestStatus, ScaleRequest};
use psyscale_core::validation;
use psyscale_storage::records;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::{authorize, now};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfessionalWithCounts {
    #[serde(flatten)]
    pub professional: Professional,
    pub pending_requests: usize,
    pub completed_requests: usize,
}

fn with_counts(professional: Professional, requests: &[ScaleRequest]) -> ProfessionalWithCounts {
    let count = |status: RequestStatus| {
        requests
            .iter()
            .filter(|r| r.professional_id == professional.id && r.status == status)
            .count()
    };
    ProfessionalWithCounts {
        pending_requests: count(RequestStatus::Pending),
        completed_requests: count(RequestStatus::Completed),
        professional,
    }
}

pub async fn list_professionals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ProfessionalWithCounts>>, ApiError> {
    authorize(policy::professional(&auth.user, Action::Index))?;

    let mut professionals = repo::professionals(state.store()).await?;
    professionals.sort_by(|a, b| a.full_name.cmp(&b.full_name));
    let requests = repo::scale_requests(state.store()).await?;

    Ok(Json(
        professionals
            .into_iter()
            .map(|p| with_counts(p, &requests))
            .collect(),
    ))
}

pub async fn get_professional(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProfessionalWithCounts>, ApiError> {
    authorize(policy::professional(&auth.user, Action::Show))?;

    let professional = repo::professional(state.store(), id).await?;
    let requests = repo::scale_requests(state.store()).await?;
    Ok(Json(with_counts(professional, &requests)))
}

#[derive(Serialize)]
pub struct CreatedProfessional {
    pub professional: Professional,
    /// Temporary password; the professional must replace it on first login.
    pub initial_password: String,
}

pub async fn create_professional(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(input): Json<NewProfessional>,
) -> Result<(StatusCode, Json<CreatedProfessional>), ApiError> {
    authorize(policy::professional(&auth.user, Action::Create))?;
    validation::check(&input)?;

    if repo::user_by_email(state.store(), &input.email).await?.is_some() {
        return Err(ApiError::Conflict("e-mail já cadastrado".to_string()));
    }

    let now = now();
    let professional = input.into_professional(now);
    let login = credentials::professional_login(&professional.email, professional.id, now)?;

    records::save(state.store(), &professional).await?;
    records::save(state.store(), &login.user).await?;

    tracing::info!(professional_id = %professional.id, "professional created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedProfessional {
            professional,
            initial_password: login.password,
        }),
    ))
}

pub async fn update_professional(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewProfessional>,
) -> Result<Json<Professional>, ApiError> {
    authorize(policy::professional(&auth.user, Action::Update))?;
    validation::check(&input)?;

    let mut professional = repo::professional(state.store(), id).await?;
    let now = now();
    let email_changed = !input.email.trim().eq_ignore_ascii_case(&professional.email);
    if email_changed {
        if let Some(other) = repo::user_by_email(state.store(), &input.email).await? {
            if other.account_id != Some(professional.id) {
                return Err(ApiError::Conflict("e-mail já cadastrado".to_string()));
            }
        }
    }

    professional.apply(input, now);
    records::save(state.store(), &professional).await?;

    if email_changed {
        if let Some(mut user) = repo::user_by_account(state.store(), professional.id).await? {
            user.email = professional.email.trim().to_lowercase();
            user.updated_at = now;
            records::save(state.store(), &user).await?;
        }
    }

    Ok(Json(professional))
}

pub async fn delete_professional(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authorize(policy::professional(&auth.user, Action::Destroy))?;

    let mut professional = repo::professional(state.store(), id).await?;
    let now = now();
    professional.soft_delete(now);
    records::save(state.store(), &professional).await?;
    repo::delete_login(state.store(), professional.id, now).await?;
    for request in repo::scale_requests(state.store()).await? {
        if request.professional_id == professional.id {
            repo::delete_request(state.store(), request, now).await?;
        }
    }

    tracing::info!(professional_id = %professional.id, "professional deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn restore_professional(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<Professional>, ApiError> {
    authorize(policy::professional(&auth.user, Action::Update))?;

    let mut professional = repo::professional_with_deleted(state.store(), id).await?;
    let now = now();
    repo::restore_login(state.store(), professional.id, now).await?;
    professional.restore(now);
    records::save(state.store(), &professional).await?;
    Ok(Json(professional))
}
