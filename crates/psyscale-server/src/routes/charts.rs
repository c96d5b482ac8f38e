use axum::extract::{Path, State};
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Action};
use psyscale_core::models::{ScaleRequest, ScaleResponse};
use psyscale_instruments::charts::srs2::{ReportInfo, Srs2ComparisonChart};
use psyscale_instruments::charts::{ChartData, psa};
use serde::Serialize;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::authorize;
use crate::state::AppState;

const NOT_ENOUGH_DATA: &str = "Não há dados suficientes para gerar o gráfico de comparação. \
                               É necessário ter pelo menos um autorrelato e um heterorrelato \
                               SRS-2 concluídos.";

#[derive(Serialize)]
pub struct Srs2Chart {
    pub chart: ChartData<Option<i32>>,
    pub report_info: ReportInfo,
}

/// Latest self vs. hetero SRS-2 comparison for a patient.
pub async fn srs2_comparison(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Srs2Chart>, ApiError> {
    let patient = repo::patient(state.store(), patient_id).await?;
    authorize(policy::patient(&auth.user, Action::Show, Some(&patient)))?;

    let requests: Vec<ScaleRequest> = repo::scale_requests(state.store())
        .await?
        .into_iter()
        .filter(|r| r.patient_id == patient.id)
        .collect();
    let responses: Vec<ScaleResponse> = repo::scale_responses(state.store())
        .await?
        .into_iter()
        .filter(|r| r.patient_id == patient.id)
        .collect();

    let chart = Srs2ComparisonChart::latest(&patient, &requests, &responses);
    if !chart.has_data() {
        return Err(ApiError::UnprocessableEntity(NOT_ENOUGH_DATA.to_string()));
    }

    Ok(Json(Srs2Chart {
        chart: chart.chart_data(),
        report_info: chart.report_info(),
    }))
}

/// Category averages of one PSA response against the reference line.
pub async fn psa_radar(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(response_id): Path<Uuid>,
) -> Result<Json<ChartData<f64>>, ApiError> {
    let response = repo::scale_response(state.store(), response_id).await?;
    authorize(policy::scale_response(&auth.user, Action::Show, Some(&response)))?;

    let results = response.results.as_psa().ok_or_else(|| {
        ApiError::UnprocessableEntity("a resposta não pertence a uma escala PSA".to_string())
    })?;
    Ok(Json(psa::radar(results)))
}
