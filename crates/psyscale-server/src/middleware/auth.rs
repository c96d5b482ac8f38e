use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use psyscale_auth::jwt;
use psyscale_core::keys;
use psyscale_core::models::User;
use psyscale_storage::records;

use crate::error::ApiError;
use crate::state::AppState;

/// Only route open to a user who must still replace their initial password.
pub const PASSWORD_CHANGE_PATH: &str = "/auth/password";

/// Authenticated user loaded from the session token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user: User,
}

/// JWT validation middleware.
///
/// Extracts the `Authorization: Bearer <token>` header, validates the token
/// and loads the user it names. Deleted or locked accounts are rejected even
/// with a valid token. On success, inserts [`AuthUser`] into request
/// extensions for handlers to use.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("missing bearer token".to_string()))?;

    let claims = jwt::validate_token(token, &state.jwt)?;

    let user = records::load_optional::<User>(state.store(), &keys::user(claims.sub))
        .await?
        .filter(|u| u.deleted_at.is_none())
        .ok_or_else(|| ApiError::Unauthorized("unknown user".to_string()))?;

    if state.lockout.is_locked(&user, jiff::Timestamp::now()) {
        return Err(ApiError::Unauthorized("account locked".to_string()));
    }

    req.extensions_mut().insert(AuthUser { user });

    Ok(next.run(req).await)
}

/// Blocks everything but the password change for users flagged with
/// `force_password_reset`. Runs after [`require_auth`].
pub async fn enforce_password_reset(req: Request, next: Next) -> Result<Response, ApiError> {
    let must_reset = req
        .extensions()
        .get::<AuthUser>()
        .is_some_and(|a| a.user.force_password_reset);

    if must_reset && req.uri().path() != PASSWORD_CHANGE_PATH {
        return Err(ApiError::Forbidden(
            "é necessário redefinir a senha antes de continuar".to_string(),
        ));
    }

    Ok(next.run(req).await)
}
