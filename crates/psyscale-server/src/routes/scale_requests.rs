use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Action};
use psyscale_core::error::CoreError;
use psyscale_core::models::{RequestStatus, ScaleRequest};
use psyscale_storage::ObjectStore;
use psyscale_storage::records;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::{authorize, now};
use crate::state::AppState;

const DUPLICATE_PENDING: &str = "Não é possível criar esta solicitação. Verifique se o paciente \
                                 já não possui uma solicitação ativa desta escala.";

#[derive(Debug, Clone, Serialize)]
pub struct RequestWithResponse {
    #[serde(flatten)]
    pub request: ScaleRequest,
    pub response_id: Option<Uuid>,
}

/// Pair each request with the id of its stored response, if any.
pub(crate) async fn attach_responses(
    store: &dyn ObjectStore,
    requests: Vec<ScaleRequest>,
) -> Result<Vec<RequestWithResponse>, ApiError> {
    let responses = repo::scale_responses(store).await?;
    Ok(requests
        .into_iter()
        .map(|request| {
            let response_id = responses
                .iter()
                .find(|r| r.scale_request_id == request.id)
                .map(|r| r.id);
            RequestWithResponse {
                request,
                response_id,
            }
        })
        .collect())
}

/// Pending requests newest first and completed requests oldest first.
/// Cancelled and expired requests are dropped.
pub(crate) fn split_by_status(
    requests: Vec<ScaleRequest>,
) -> (Vec<ScaleRequest>, Vec<ScaleRequest>) {
    let (mut pending, mut completed): (Vec<_>, Vec<_>) = requests
        .into_iter()
        .filter(|r| matches!(r.status, RequestStatus::Pending | RequestStatus::Completed))
        .partition(ScaleRequest::is_pending);
    pending.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));
    completed.sort_by_key(|r| r.requested_at);
    (pending, completed)
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<RequestStatus>,
}

#[derive(Serialize)]
pub struct RequestList {
    pub status: RequestStatus,
    pub requests: Vec<RequestWithResponse>,
    pub pending_count: usize,
    pub completed_count: usize,
    pub cancelled_count: usize,
}

pub async fn list_requests(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RequestList>, ApiError> {
    authorize(policy::scale_request(&auth.user, Action::Index, None, false))?;

    let visible = policy::scope_scale_requests(&auth.user, repo::scale_requests(state.store()).await?);
    let count = |status: RequestStatus| visible.iter().filter(|r| r.status == status).count();
    let pending_count = count(RequestStatus::Pending);
    let completed_count = count(RequestStatus::Completed);
    let cancelled_count = count(RequestStatus::Cancelled);

    let status = query.status.unwrap_or(RequestStatus::Pending);
    let mut requests: Vec<ScaleRequest> =
        visible.into_iter().filter(|r| r.status == status).collect();
    requests.sort_by(|a, b| b.requested_at.cmp(&a.requested_at));

    Ok(Json(RequestList {
        status,
        requests: attach_responses(state.store(), requests).await?,
        pending_count,
        completed_count,
        cancelled_count,
    }))
}

#[derive(Deserialize)]
pub struct NewScaleRequest {
    pub patient_id: Uuid,
    pub scale_code: String,
    #[serde(default)]
    pub notes: Option<String>,
}

pub async fn create_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<NewScaleRequest>,
) -> Result<(StatusCode, Json<ScaleRequest>), ApiError> {
    let user = &auth.user;
    authorize(policy::scale_request(user, Action::Create, None, false))?;

    // The requesting professional is the caller's own record.
    let professional_id = user
        .account_id
        .filter(|_| user.is_professional())
        .ok_or_else(|| {
            ApiError::UnprocessableEntity(
                "somente profissionais podem solicitar escalas".to_string(),
            )
        })?;
    repo::professional(state.store(), professional_id).await?;

    let patient = repo::patient(state.store(), body.patient_id)
        .await
        .map_err(|_| ApiError::UnprocessableEntity("paciente não encontrado".to_string()))?;
    let scale = repo::scale(state.store(), &body.scale_code)
        .await
        .ok()
        .filter(|s| s.is_active)
        .ok_or_else(|| ApiError::UnprocessableEntity("escala não encontrada".to_string()))?;

    let duplicate = repo::scale_requests(state.store())
        .await?
        .iter()
        .any(|r| r.patient_id == patient.id && r.scale_code == scale.code && r.is_pending());
    if duplicate {
        tracing::warn!(
            patient_id = %patient.id,
            scale = %scale.code,
            "duplicate pending scale request rejected"
        );
        return Err(ApiError::Conflict(DUPLICATE_PENDING.to_string()));
    }

    let notes = body.notes.filter(|n| !n.trim().is_empty());
    let request = ScaleRequest::new(
        patient.id,
        professional_id,
        scale.id,
        scale.code.clone(),
        notes,
        now(),
    );
    records::save(state.store(), &request).await?;

    tracing::info!(
        request_id = %request.id,
        patient_id = %patient.id,
        scale = %scale.code,
        "scale request created"
    );
    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn get_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestWithResponse>, ApiError> {
    let request = repo::scale_request(state.store(), id).await?;
    authorize(policy::scale_request(&auth.user, Action::Show, Some(&request), false))?;

    let response_id = repo::response_for_request(state.store(), id)
        .await?
        .map(|r| r.id);
    Ok(Json(RequestWithResponse {
        request,
        response_id,
    }))
}

pub async fn delete_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let request = repo::scale_request(state.store(), id).await?;
    authorize(policy::scale_request(&auth.user, Action::Destroy, Some(&request), false))?;

    repo::delete_request(state.store(), request, now()).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn cancel_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScaleRequest>, ApiError> {
    let mut request = repo::scale_request(state.store(), id).await?;
    authorize(policy::scale_request(&auth.user, Action::Cancel, Some(&request), false))?;

    if !request.cancel(now()) {
        return Err(CoreError::InvalidTransition(request.status.to_string()).into());
    }
    records::save(state.store(), &request).await?;

    tracing::info!(request_id = %request.id, "scale request cancelled");
    Ok(Json(request))
}
