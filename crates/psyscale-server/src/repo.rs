//! Record lookups shared by the route handlers. Soft-deleted records are
//! treated as missing unless a function says otherwise. Also the writes that
//! keep linked records in step.

use jiff::Timestamp;
use psyscale_core::keys;
use psyscale_core::models::{
    Patient, Professional, PsychometricScale, ScaleRequest, ScaleResponse, User,
};
use psyscale_storage::ObjectStore;
use psyscale_storage::records::{self, Record};
use uuid::Uuid;

use crate::error::ApiError;

async fn find<T: Record>(
    store: &dyn ObjectStore,
    key: &str,
    what: &str,
    is_deleted: impl Fn(&T) -> bool,
) -> Result<T, ApiError> {
    records::load_optional::<T>(store, key)
        .await?
        .filter(|r| !is_deleted(r))
        .ok_or_else(|| ApiError::NotFound(format!("{what} não encontrado")))
}

pub async fn patient(store: &dyn ObjectStore, id: Uuid) -> Result<Patient, ApiError> {
    find(store, &keys::patient(id), "paciente", Patient::is_deleted).await
}

/// Includes soft-deleted patients, for restore.
pub async fn patient_with_deleted(store: &dyn ObjectStore, id: Uuid) -> Result<Patient, ApiError> {
    find(store, &keys::patient(id), "paciente", |_: &Patient| false).await
}

pub async fn professional(store: &dyn ObjectStore, id: Uuid) -> Result<Professional, ApiError> {
    find(
        store,
        &keys::professional(id),
        "profissional",
        Professional::is_deleted,
    )
    .await
}

pub async fn professional_with_deleted(
    store: &dyn ObjectStore,
    id: Uuid,
) -> Result<Professional, ApiError> {
    find(store, &keys::professional(id), "profissional", |_: &Professional| false).await
}

pub async fn scale(store: &dyn ObjectStore, code: &str) -> Result<PsychometricScale, ApiError> {
    find(store, &keys::scale(code), "escala", |s: &PsychometricScale| {
        s.deleted_at.is_some()
    })
    .await
}

pub async fn scale_request(store: &dyn ObjectStore, id: Uuid) -> Result<ScaleRequest, ApiError> {
    find(
        store,
        &keys::scale_request(id),
        "solicitação",
        ScaleRequest::is_deleted,
    )
    .await
}

pub async fn scale_response(store: &dyn ObjectStore, id: Uuid) -> Result<ScaleResponse, ApiError> {
    find(
        store,
        &keys::scale_response(id),
        "resposta",
        ScaleResponse::is_deleted,
    )
    .await
}

pub async fn patients(store: &dyn ObjectStore) -> Result<Vec<Patient>, ApiError> {
    let mut all: Vec<Patient> = records::load_all(store).await?;
    all.retain(|p| !p.is_deleted());
    Ok(all)
}

pub async fn professionals(store: &dyn ObjectStore) -> Result<Vec<Professional>, ApiError> {
    let mut all: Vec<Professional> = records::load_all(store).await?;
    all.retain(|p| !p.is_deleted());
    Ok(all)
}

pub async fn scales(store: &dyn ObjectStore) -> Result<Vec<PsychometricScale>, ApiError> {
    let mut all: Vec<PsychometricScale> = records::load_all(store).await?;
    all.retain(|s| s.deleted_at.is_none());
    Ok(all)
}

pub async fn scale_requests(store: &dyn ObjectStore) -> Result<Vec<ScaleRequest>, ApiError> {
    let mut all: Vec<ScaleRequest> = records::load_all(store).await?;
    all.retain(|r| !r.is_deleted());
    Ok(all)
}

pub async fn scale_responses(store: &dyn ObjectStore) -> Result<Vec<ScaleResponse>, ApiError> {
    let mut all: Vec<ScaleResponse> = records::load_all(store).await?;
    all.retain(|r| !r.is_deleted());
    Ok(all)
}

/// The stored response for a request, if it was answered.
pub async fn response_for_request(
    store: &dyn ObjectStore,
    request_id: Uuid,
) -> Result<Option<ScaleResponse>, ApiError> {
    Ok(scale_responses(store)
        .await?
        .into_iter()
        .find(|r| r.scale_request_id == request_id))
}

/// Emails are stored lowercased; deleted logins never match.
pub async fn user_by_email(store: &dyn ObjectStore, email: &str) -> Result<Option<User>, ApiError> {
    let email = email.trim().to_lowercase();
    let users: Vec<User> = records::load_all(store).await?;
    Ok(users
        .into_iter()
        .find(|u| u.deleted_at.is_none() && u.email == email))
}

pub async fn user_by_account(
    store: &dyn ObjectStore,
    account_id: Uuid,
) -> Result<Option<User>, ApiError> {
    let users: Vec<User> = records::load_all(store).await?;
    Ok(users
        .into_iter()
        .find(|u| u.deleted_at.is_none() && u.account_id == Some(account_id)))
}

/// Soft-delete the login of a patient or professional record.
pub async fn delete_login(
    store: &dyn ObjectStore,
    account_id: Uuid,
    now: Timestamp,
) -> Result<(), ApiError> {
    if let Some(mut user) = user_by_account(store, account_id).await? {
        user.soft_delete(now);
        records::save(store, &user).await?;
        tracing::info!(user_id = %user.id, %account_id, "login deleted with its account");
    }
    Ok(())
}

/// Bring back the most recently deleted login of a restored record. Fails
/// with a conflict when its email now belongs to another live login.
pub async fn restore_login(
    store: &dyn ObjectStore,
    account_id: Uuid,
    now: Timestamp,
) -> Result<(), ApiError> {
    let users: Vec<User> = records::load_all(store).await?;
    let linked: Vec<&User> = users
        .iter()
        .filter(|u| u.account_id == Some(account_id))
        .collect();
    if linked.iter().any(|u| !u.is_deleted()) {
        return Ok(());
    }
    let Some(user) = linked.into_iter().max_by_key(|u| u.deleted_at) else {
        return Ok(());
    };

    if users
        .iter()
        .any(|u| !u.is_deleted() && u.id != user.id && u.email == user.email)
    {
        return Err(ApiError::Conflict(
            "o e-mail deste cadastro já pertence a outro acesso".to_string(),
        ));
    }

    let mut user = user.clone();
    user.restore(now);
    records::save(store, &user).await?;
    tracing::info!(user_id = %user.id, %account_id, "login restored with its account");
    Ok(())
}

/// Soft-delete a request together with its response, if it was answered.
pub async fn delete_request(
    store: &dyn ObjectStore,
    mut request: ScaleRequest,
    now: Timestamp,
) -> Result<(), ApiError> {
    if let Some(mut response) = response_for_request(store, request.id).await? {
        response.soft_delete(now);
        records::save(store, &response).await?;
    }
    request.soft_delete(now);
    records::save(store, &request).await?;
    Ok(())
}
