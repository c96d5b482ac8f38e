use axum::extract::{Path, State};
use axum::{Extension, Json};
use psyscale_auth::policy::{self, Action};
use psyscale_core::models::PsychometricScale;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::authorize;
use crate::state::AppState;

/// Active scales ordered by name.
pub async fn list_scales(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<PsychometricScale>>, ApiError> {
    authorize(policy::scale(&auth.user, Action::Index))?;

    let mut scales: Vec<PsychometricScale> = repo::scales(state.store())
        .await?
        .into_iter()
        .filter(|s| s.is_active)
        .collect();
    scales.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(scales))
}

pub async fn get_scale(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(code): Path<String>,
) -> Result<Json<PsychometricScale>, ApiError> {
    authorize(policy::scale(&auth.user, Action::Show))?;
    Ok(Json(repo::scale(state.store(), &code).await?))
}
