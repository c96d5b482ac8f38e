//! Typed JSON records on top of an [`ObjectStore`].
//!
//! Each record type knows its key prefix and its own key (see
//! [`psyscale_core::keys`]). Listing a prefix loads every record under it.

use psyscale_core::keys;
use psyscale_core::models::{
    Patient, Professional, PsychometricScale, ScaleRequest, ScaleResponse, User,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ObjectStore;
use crate::error::StorageError;

pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const PREFIX: &'static str;

    fn key(&self) -> String;
}

impl Record for Patient {
    const PREFIX: &'static str = keys::PATIENTS_PREFIX;

    fn key(&self) -> String {
        keys::patient(self.id)
    }
}

impl Record for Professional {
    const PREFIX: &'static str = keys::PROFESSIONALS_PREFIX;

    fn key(&self) -> String {
        keys::professional(self.id)
    }
}

impl Record for User {
    const PREFIX: &'static str = keys::USERS_PREFIX;

    fn key(&self) -> String {
        keys::user(self.id)
    }
}

impl Record for PsychometricScale {
    const PREFIX: &'static str = keys::SCALES_PREFIX;

    fn key(&self) -> String {
        keys::scale(&self.code)
    }
}

impl Record for ScaleRequest {
    const PREFIX: &'static str = keys::SCALE_REQUESTS_PREFIX;

    fn key(&self) -> String {
        keys::scale_request(self.id)
    }
}

impl Record for ScaleResponse {
    const PREFIX: &'static str = keys::SCALE_RESPONSES_PREFIX;

    fn key(&self) -> String {
        keys::scale_response(self.id)
    }
}

/// Load and deserialize one record.
pub async fn load<T: Record>(store: &dyn ObjectStore, key: &str) -> Result<T, StorageError> {
    let body = store.get(key).await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`load`], but a missing key is `Ok(None)`.
pub async fn load_optional<T: Record>(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match load(store, key).await {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Every record of type `T`, in key order.
pub async fn load_all<T: Record>(store: &dyn ObjectStore) -> Result<Vec<T>, StorageError> {
    let keys = store.list(T::PREFIX).await?;
    let mut records = Vec::with_capacity(keys.len());
    for key in keys.iter().filter(|k| k.ends_with(".json")) {
        match load(store, key).await {
            Ok(record) => records.push(record),
            // Deleted between list and get.
            Err(e) if e.is_not_found() => {
                tracing::warn!(key = %key, "record vanished while listing");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(records)
}

/// Serialize and write a record under its own key.
pub async fn save<T: Record>(store: &dyn ObjectStore, record: &T) -> Result<(), StorageError> {
    let body = serde_json::to_vec_pretty(record)?;
    store
        .put(&record.key(), body, Some("application/json"))
        .await
}

/// Hard delete. Domain records are soft-deleted instead; this is for
/// bootstrap cleanup and tests.
pub async fn remove<T: Record>(store: &dyn ObjectStore, record: &T) -> Result<(), StorageError> {
    store.delete(&record.key()).await
}
