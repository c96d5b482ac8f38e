use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use eyre::{WrapErr, eyre};
use jiff::SignedDuration;
use psyscale_auth::jwt::JwtConfig;
use psyscale_auth::lockout::LockoutPolicy;

const DEFAULT_BIND: &str = "0.0.0.0:3000";
const DEFAULT_BUCKET: &str = "psyscale";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_ADMIN_EMAIL: &str = "admin@admin.com";
const DEFAULT_JWT_TTL_MINUTES: i64 = 480;

/// Where records live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process memory; everything is lost on restart.
    Memory,
    S3 { bucket: String },
}

/// Runtime settings, read once at startup from `PSYSCALE_*` variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub storage: StorageBackend,
    /// Holds `norms/` (SRS-2 CSV tables) and `scales/` (scale definitions).
    pub data_dir: PathBuf,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub max_login_attempts: u32,
    pub unlock_after_minutes: i64,
    pub admin_email: String,
    /// No admin is seeded without one.
    pub admin_password: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = var("PSYSCALE_BIND")
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .parse()
            .wrap_err("PSYSCALE_BIND is not a socket address")?;

        let storage = match var("PSYSCALE_STORAGE").as_deref() {
            None | Some("memory") => StorageBackend::Memory,
            Some("s3") => StorageBackend::S3 {
                bucket: var("PSYSCALE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            },
            Some(other) => return Err(eyre!("unknown PSYSCALE_STORAGE backend: {other}")),
        };

        let jwt_secret = var("PSYSCALE_JWT_SECRET")
            .ok_or_else(|| eyre!("PSYSCALE_JWT_SECRET must be set"))?;

        let defaults = LockoutPolicy::default();

        Ok(Self {
            bind_addr,
            storage,
            data_dir: var("PSYSCALE_DATA_DIR")
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            jwt_secret,
            jwt_ttl_minutes: parse_or(var("PSYSCALE_JWT_TTL_MINUTES"), DEFAULT_JWT_TTL_MINUTES)
                .wrap_err("PSYSCALE_JWT_TTL_MINUTES")?,
            max_login_attempts: parse_or(
                var("PSYSCALE_MAX_LOGIN_ATTEMPTS"),
                defaults.max_attempts,
            )
            .wrap_err("PSYSCALE_MAX_LOGIN_ATTEMPTS")?,
            unlock_after_minutes: parse_or(
                var("PSYSCALE_UNLOCK_AFTER_MINUTES"),
                defaults.unlock_after.as_secs() / 60,
            )
            .wrap_err("PSYSCALE_UNLOCK_AFTER_MINUTES")?,
            admin_email: var("PSYSCALE_ADMIN_EMAIL")
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
            admin_password: var("PSYSCALE_ADMIN_PASSWORD"),
        })
    }

    pub fn norms_dir(&self) -> PathBuf {
        self.data_dir.join("norms")
    }

    pub fn scales_dir(&self) -> PathBuf {
        self.data_dir.join("scales")
    }

    pub fn jwt(&self) -> JwtConfig {
        JwtConfig {
            secret: self.jwt_secret.clone(),
            ttl_minutes: self.jwt_ttl_minutes,
        }
    }

    pub fn lockout(&self) -> LockoutPolicy {
        LockoutPolicy {
            max_attempts: self.max_login_attempts,
            unlock_after: SignedDuration::from_mins(self.unlock_after_minutes),
        }
    }
}

fn parse_or<T>(value: Option<String>, default: T) -> eyre::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(v) => Ok(v.trim().parse()?),
        None => Ok(default),
    }
}
