use std::sync::Arc;

use psyscale_auth::jwt::JwtConfig;
use psyscale_auth::lockout::LockoutPolicy;
use psyscale_export::error::ExportError;
use psyscale_export::render::ReportRenderer;
use psyscale_export::styles::DocumentStyles;
use psyscale_instruments::lookup::NormTables;
use psyscale_storage::ObjectStore;
use tokio::sync::Mutex;

/// Shared application state, injected into all route handlers via Axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub norms: Arc<NormTables>,
    pub renderer: Arc<ReportRenderer>,
    pub docx_styles: Arc<DocumentStyles>,
    pub jwt: JwtConfig,
    pub lockout: LockoutPolicy,
    /// Held from the pending check until a submitted response is stored, so
    /// a request is answered at most once.
    pub submissions: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        norms: NormTables,
        jwt: JwtConfig,
        lockout: LockoutPolicy,
    ) -> Result<Self, ExportError> {
        Ok(Self {
            store,
            norms: Arc::new(norms),
            renderer: Arc::new(ReportRenderer::new()?),
            docx_styles: Arc::new(DocumentStyles::default()),
            jwt,
            lockout,
            submissions: Arc::new(Mutex::new(())),
        })
    }

    pub fn store(&self) -> &dyn ObjectStore {
        self.store.as_ref()
    }
}
