use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Action};
use psyscale_core::keys;
use psyscale_core::models::{Patient, ScaleRequest, ScaleResponse, User};
use psyscale_export::docx::generate_docx;
use psyscale_export::render::ReportFormat;
use psyscale_instruments::interpretation::{self, InterpretationReport};
use psyscale_storage::records;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::{authorize, today};
use crate::state::AppState;

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// SRS-2 interpretations are open to the requesting professional only;
/// other scales follow the response policy.
fn may_interpret(user: &User, response: &ScaleResponse, request: Option<&ScaleRequest>) -> bool {
    match request {
        Some(request) if response.is_srs2() => {
            policy::srs2_interpretation(user, response, request)
        }
        _ => policy::scale_response(user, Action::Interpretation, Some(response)),
    }
}

async fn build(
    state: &AppState,
    user: &User,
    response_id: Uuid,
) -> Result<(InterpretationReport, Patient), ApiError> {
    let response = repo::scale_response(state.store(), response_id).await?;
    if !interpretation::supports(&response.scale_code) {
        return Err(ApiError::UnprocessableEntity(format!(
            "interpretação não disponível para a escala {}",
            response.scale_code
        )));
    }

    // A deleted request still identifies who asked for the response.
    let request = records::load_optional::<ScaleRequest>(
        state.store(),
        &keys::scale_request(response.scale_request_id),
    )
    .await?;
    authorize(may_interpret(user, &response, request.as_ref()))?;

    let patient = repo::patient_with_deleted(state.store(), response.patient_id).await?;
    let history: Vec<ScaleResponse> = repo::scale_responses(state.store())
        .await?
        .into_iter()
        .filter(|r| r.patient_id == patient.id && r.id != response.id)
        .collect();

    let report = interpretation::generate(&response, &patient, &history)?;
    Ok((report, patient))
}

pub async fn get_interpretation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterpretationReport>, ApiError> {
    let (report, _) = build(&state, &auth.user, id).await?;
    Ok(Json(report))
}

pub async fn get_report_html(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let (report, patient) = build(&state, &auth.user, id).await?;
    let html = state
        .renderer
        .render(&report, &patient, today(), ReportFormat::Html)?;
    Ok(Html(html))
}

pub async fn get_report_docx(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (report, patient) = build(&state, &auth.user, id).await?;
    let markdown = state
        .renderer
        .render(&report, &patient, today(), ReportFormat::Markdown)?;
    let bytes = generate_docx(&markdown, &state.docx_styles)?;

    let scale_type = match report {
        InterpretationReport::Srs2 { .. } => "srs2",
        InterpretationReport::Psa { .. } => "psa",
    };
    tracing::info!(response_id = %id, size = bytes.len(), "docx report exported");

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{scale_type}-{id}.docx\""),
            ),
        ],
        bytes,
    )
        .into_response())
}
