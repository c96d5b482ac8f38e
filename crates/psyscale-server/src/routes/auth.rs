use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use jiff::Timestamp;
use psyscale_auth::error::AuthError;
use psyscale_auth::{jwt, lockout, password};
use psyscale_core::models::Role;
use psyscale_storage::records;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::repo;
use crate::routes::now;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: Timestamp,
    pub user_id: Uuid,
    pub role: Role,
    pub account_id: Option<Uuid>,
    pub force_password_reset: bool,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Some(mut user) = repo::user_by_email(state.store(), &body.email).await? else {
        return Err(AuthError::InvalidCredentials.into());
    };

    let now = now();
    let outcome = lockout::attempt_login(&mut user, &body.password, &state.lockout, now);
    // Counter and lock changes are kept whether or not the attempt succeeded.
    records::save(state.store(), &user).await?;
    if let Err(e) = outcome {
        tracing::info!(user_id = %user.id, error = %e, "login rejected");
        return Err(e.into());
    }

    let token = jwt::issue_token(&user, &state.jwt, now)?;
    tracing::info!(user_id = %user.id, role = user.role.as_str(), "login");

    Ok(Json(LoginResponse {
        token,
        expires_at: now + jiff::SignedDuration::from_mins(state.jwt.ttl_minutes),
        user_id: user.id,
        role: user.role,
        account_id: user.account_id,
        force_password_reset: user.force_password_reset,
    }))
}

#[derive(Deserialize)]
pub struct ChangePassword {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<ChangePassword>,
) -> Result<StatusCode, ApiError> {
    let mut user = auth.user;

    if !password::verify_password(&body.current_password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }
    password::validate_password_strength(&body.new_password)?;

    user.password_hash = password::hash_password(&body.new_password)?;
    user.force_password_reset = false;
    user.updated_at = now();
    records::save(state.store(), &user).await?;

    tracing::info!(user_id = %user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}
