use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Action};
use psyscale_core::models::{
    Answers, PsychometricScale, ScaleItem, ScaleRequest, ScaleResponse, User,
};
use psyscale_instruments::scoring::ScoringContext;
use psyscale_instruments::{instrument_for, validate_response};
use psyscale_storage::records;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::{authorize, now, today};
use crate::state::AppState;

pub async fn list_responses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<ScaleResponse>>, ApiError> {
    authorize(policy::scale_response(&auth.user, Action::Index, None))?;

    let mut responses = repo::scale_responses(state.store()).await?;
    responses.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
    Ok(Json(responses))
}

/// Request and scale for an answer submission, if the request can still be
/// answered by `user`. Callers who cannot see the request get 403 before
/// its state is revealed.
async fn respondable(
    state: &AppState,
    user: &User,
    request_id: Uuid,
) -> Result<(ScaleRequest, PsychometricScale), ApiError> {
    let request = repo::scale_request(state.store(), request_id).await?;
    authorize(policy::scale_request(user, Action::Show, Some(&request), false))?;

    let has_response = repo::response_for_request(state.store(), request_id)
        .await?
        .is_some();

    if has_response {
        return Err(ApiError::Conflict("esta escala já foi respondida".to_string()));
    }
    if !request.can_be_completed() {
        return Err(ApiError::Conflict(
            "esta solicitação não está mais pendente".to_string(),
        ));
    }
    authorize(policy::scale_request(
        user,
        Action::Respond,
        Some(&request),
        has_response,
    ))?;

    let scale = repo::scale(state.store(), &request.scale_code).await?;
    Ok((request, scale))
}

#[derive(Serialize)]
pub struct ResponseForm {
    pub request: ScaleRequest,
    pub scale_code: String,
    pub scale_name: String,
    pub instructions: Option<String>,
    /// Hetero-report forms also ask who answered.
    pub requires_relator: bool,
    pub items: Vec<ScaleItem>,
}

pub async fn response_form(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
) -> Result<Json<ResponseForm>, ApiError> {
    let (request, scale) = respondable(&state, &auth.user, request_id).await?;
    let requires_relator = instrument_for(&scale)?.requires_relator();

    Ok(Json(ResponseForm {
        request,
        requires_relator,
        items: scale.ordered_items().into_iter().cloned().collect(),
        scale_code: scale.code,
        scale_name: scale.name,
        instructions: scale.description,
    }))
}

#[derive(Deserialize)]
pub struct SubmitResponse {
    #[serde(default)]
    pub answers: Answers,
    #[serde(default)]
    pub relator_name: Option<String>,
    #[serde(default)]
    pub relator_relationship: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Validate, score and store a submission, completing its request.
pub async fn create_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(request_id): Path<Uuid>,
    Json(body): Json<SubmitResponse>,
) -> Result<(StatusCode, Json<ScaleResponse>), ApiError> {
    let _submission = state.submissions.lock().await;
    let (mut request, scale) = respondable(&state, &auth.user, request_id).await?;

    // Blank values count as unanswered.
    let answers: Answers = body
        .answers
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .collect();
    let relator_name = present(body.relator_name);
    let relator_relationship = present(body.relator_relationship);

    validate_response(
        &scale,
        &answers,
        relator_name.as_deref(),
        relator_relationship.as_deref(),
    )?;

    let patient = repo::patient(state.store(), request.patient_id).await?;
    let now = now();
    let ctx = ScoringContext {
        patient: Some(&patient),
        today: today(),
        computed_at: now,
        norms: &state.norms,
    };
    let results = instrument_for(&scale)?.score(&answers, &ctx);

    let response = ScaleResponse {
        id: Uuid::new_v4(),
        scale_request_id: request.id,
        patient_id: patient.id,
        scale_id: scale.id,
        scale_code: scale.code.clone(),
        answers,
        total_score: Some(results.total_score()),
        interpretation: Some(results.headline()),
        results,
        relator_name,
        relator_relationship,
        completed_at: now,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };
    authorize(policy::scale_response(
        &auth.user,
        Action::Create,
        Some(&response),
    ))?;

    records::save(state.store(), &response).await?;
    request.complete(now);
    records::save(state.store(), &request).await?;

    tracing::info!(
        response_id = %response.id,
        request_id = %request.id,
        scale = %response.scale_code,
        total_score = response.total_score,
        "scale response stored"
    );
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn get_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScaleResponse>, ApiError> {
    let response = repo::scale_response(state.store(), id).await?;
    authorize(policy::scale_response(&auth.user, Action::Show, Some(&response)))?;
    Ok(Json(response))
}

pub async fn delete_response(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let mut response = repo::scale_response(state.store(), id).await?;
    authorize(policy::scale_response(&auth.user, Action::Destroy, Some(&response)))?;

    response.soft_delete(now());
    records::save(state.store(), &response).await?;
    Ok(StatusCode::NO_CONTENT)
}
