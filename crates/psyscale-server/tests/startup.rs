use std::collections::HashMap;
use std::fs;

use jiff::{SignedDuration, Timestamp};
use psyscale_core::keys;
use psyscale_core::models::{PsychometricScale, User};
use psyscale_server::bootstrap::{seed_admin, seed_scales};
use psyscale_server::config::{ServerConfig, StorageBackend};
use psyscale_storage::records;
use psyscale_storage::{MemoryStore, ObjectStore};

fn config(vars: &[(&str, &str)]) -> eyre::Result<ServerConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(|name| vars.get(name).cloned())
}

#[test]
fn defaults_apply_when_unset() {
    let config = config(&[("PSYSCALE_JWT_SECRET", "s3cret")]).unwrap();
    assert_eq!(config.bind_addr.to_string(), "0.0.0.0:3000");
    assert_eq!(config.storage, StorageBackend::Memory);
    assert_eq!(config.norms_dir(), std::path::Path::new("data/norms"));
    assert_eq!(config.jwt().ttl_minutes, 480);
    assert_eq!(config.lockout().max_attempts, 5);
    assert_eq!(config.lockout().unlock_after, SignedDuration::from_hours(1));
    assert_eq!(config.admin_email, "admin@admin.com");
    assert!(config.admin_password.is_none());
}

#[test]
fn overrides_are_parsed() {
    let config = config(&[
        ("PSYSCALE_JWT_SECRET", "s3cret"),
        ("PSYSCALE_BIND", "127.0.0.1:8080"),
        ("PSYSCALE_STORAGE", "s3"),
        ("PSYSCALE_BUCKET", "clinic-records"),
        ("PSYSCALE_MAX_LOGIN_ATTEMPTS", "10"),
        ("PSYSCALE_UNLOCK_AFTER_MINUTES", "15"),
        ("PSYSCALE_ADMIN_PASSWORD", "   "),
    ])
    .unwrap();
    assert_eq!(config.bind_addr.port(), 8080);
    assert_eq!(
        config.storage,
        StorageBackend::S3 {
            bucket: "clinic-records".to_string()
        }
    );
    assert_eq!(config.lockout().max_attempts, 10);
    assert_eq!(config.lockout().unlock_after, SignedDuration::from_mins(15));
    // Blank counts as unset.
    assert!(config.admin_password.is_none());
}

#[test]
fn invalid_settings_are_rejected() {
    assert!(config(&[]).is_err());
    assert!(config(&[("PSYSCALE_JWT_SECRET", "x"), ("PSYSCALE_STORAGE", "disk")]).is_err());
    assert!(config(&[("PSYSCALE_JWT_SECRET", "x"), ("PSYSCALE_BIND", "nowhere")]).is_err());
    assert!(
        config(&[
            ("PSYSCALE_JWT_SECRET", "x"),
            ("PSYSCALE_MAX_LOGIN_ATTEMPTS", "many")
        ])
        .is_err()
    );
}

#[tokio::test]
async fn admin_is_seeded_once_and_only_with_a_password() {
    let store = MemoryStore::new();
    let now = Timestamp::now();

    assert!(!seed_admin(&store, "admin@admin.com", None, now).await.unwrap());
    assert!(store.is_empty().await);

    assert!(
        seed_admin(&store, "Admin@Admin.com", Some("pw-123456"), now)
            .await
            .unwrap()
    );
    assert!(
        !seed_admin(&store, "admin@admin.com", Some("other"), now)
            .await
            .unwrap()
    );

    let users: Vec<User> = records::load_all(&store).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email, "admin@admin.com");
    assert!(users[0].is_admin());
}

#[tokio::test]
async fn catalog_is_seeded_without_replacing_stored_scales() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let now = Timestamp::now();

    assert_eq!(seed_scales(&store, dir.path(), now).await.unwrap(), 5);
    let psa: PsychometricScale = records::load(&store, &keys::scale("PSA")).await.unwrap();

    assert_eq!(seed_scales(&store, dir.path(), now).await.unwrap(), 0);
    let again: PsychometricScale = records::load(&store, &keys::scale("PSA")).await.unwrap();
    assert_eq!(psa.id, again.id);
}

#[tokio::test]
async fn override_files_replace_definitions() {
    let store = MemoryStore::new();
    let dir = tempfile::tempdir().unwrap();
    let now = Timestamp::now();
    seed_scales(&store, dir.path(), now).await.unwrap();

    let mut bdi: PsychometricScale = records::load(&store, &keys::scale("BDI")).await.unwrap();
    bdi.items[0].question_text = "Tristeza".to_string();
    fs::write(dir.path().join("bdi.json"), serde_json::to_vec(&bdi).unwrap()).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    assert_eq!(seed_scales(&store, dir.path(), now).await.unwrap(), 1);
    let stored: PsychometricScale = records::load(&store, &keys::scale("BDI")).await.unwrap();
    assert_eq!(stored.items[0].question_text, "Tristeza");

    fs::write(dir.path().join("broken.json"), "{").unwrap();
    assert!(seed_scales(&store, dir.path(), now).await.is_err());

    let keys = store.list(keys::SCALES_PREFIX).await.unwrap();
    assert_eq!(keys.len(), 5);
}
