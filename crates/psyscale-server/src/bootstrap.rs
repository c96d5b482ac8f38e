//! Startup seeding: the admin login and the scale catalog.

use std::path::Path;

use eyre::WrapErr;
use jiff::Timestamp;
use psyscale_auth::credentials;
use psyscale_core::keys;
use psyscale_core::models::{PsychometricScale, Role, User};
use psyscale_instruments::all_instruments;
use psyscale_storage::ObjectStore;
use psyscale_storage::records;

/// Create the admin login unless a user with `email` exists. Without a
/// password nothing is created.
pub async fn seed_admin(
    store: &dyn ObjectStore,
    email: &str,
    password: Option<&str>,
    now: Timestamp,
) -> eyre::Result<bool> {
    let normalized = email.trim().to_lowercase();
    let users: Vec<User> = records::load_all(store).await?;
    if users.iter().any(|u| u.email == normalized) {
        return Ok(false);
    }
    let Some(password) = password else {
        tracing::warn!(email, "no admin password configured; admin login not created");
        return Ok(false);
    };

    let user = credentials::new_user(email, Role::Admin, None, password, false, now)?;
    records::save(store, &user).await?;
    tracing::info!(user_id = %user.id, "admin login created");
    Ok(true)
}

/// Store the built-in scales that are not stored yet, then every definition
/// found as `*.json` in `overrides_dir`. Override files replace stored
/// scales with the same code, e.g. to supply the licensed item texts.
/// Returns how many scales were written.
pub async fn seed_scales(
    store: &dyn ObjectStore,
    overrides_dir: &Path,
    now: Timestamp,
) -> eyre::Result<usize> {
    let mut written = 0;

    for instrument in all_instruments() {
        let key = keys::scale(instrument.code());
        if records::load_optional::<PsychometricScale>(store, &key)
            .await?
            .is_none()
        {
            records::save(store, &instrument.definition(now)).await?;
            written += 1;
        }
    }

    for scale in read_overrides(overrides_dir).await? {
        tracing::info!(scale = %scale.code, items = scale.items.len(), "scale definition loaded");
        records::save(store, &scale).await?;
        written += 1;
    }

    Ok(written)
}

async fn read_overrides(dir: &Path) -> eyre::Result<Vec<PsychometricScale>> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).wrap_err_with(|| format!("reading {}", dir.display())),
    };

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut scales = Vec::with_capacity(paths.len());
    for path in paths {
        let body = tokio::fs::read(&path)
            .await
            .wrap_err_with(|| format!("reading {}", path.display()))?;
        let scale: PsychometricScale = serde_json::from_slice(&body)
            .wrap_err_with(|| format!("parsing {}", path.display()))?;
        scales.push(scale);
    }
    Ok(scales)
}
