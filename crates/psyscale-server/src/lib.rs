//! psyscale-server
//!
//! HTTP API over the Psyscale records: patients, professionals, scale
//! requests and responses, interpretations, reports and chart data.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod middleware;
pub mod repo;
pub mod routes;
pub mod state;

use axum::Router;
use axum::middleware as axum_mw;
use axum::routing::{get, patch, post, put};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

pub use config::ServerConfig;
pub use state::AppState;

/// The full router. Everything but `/health` and `/auth/login` requires a
/// bearer token.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let protected = Router::new()
        .route("/auth/password", put(routes::auth::change_password))
        // Dashboards
        .route("/dashboard", get(routes::dashboard::show))
        .route("/dashboard/professionals", get(routes::dashboard::professionals))
        .route("/dashboard/patients", get(routes::dashboard::patients))
        // Patients
        .route(
            "/patients",
            get(routes::patients::list_patients).post(routes::patients::create_patient),
        )
        .route("/patients/search", get(routes::patients::search_patients))
        .route(
            "/patients/{id}",
            get(routes::patients::get_patient)
                .put(routes::patients::update_patient)
                .delete(routes::patients::delete_patient),
        )
        .route("/patients/{id}/restore", patch(routes::patients::restore_patient))
        .route("/patients/{id}/charts/srs2", get(routes::charts::srs2_comparison))
        // Professionals
        .route(
            "/professionals",
            get(routes::professionals::list_professionals)
                .post(routes::professionals::create_professional),
        )
        .route(
            "/professionals/{id}",
            get(routes::professionals::get_professional)
                .put(routes::professionals::update_professional)
                .delete(routes::professionals::delete_professional),
        )
        .route(
            "/professionals/{id}/restore",
            patch(routes::professionals::restore_professional),
        )
        // Scales
        .route("/scales", get(routes::scales::list_scales))
        .route("/scales/{code}", get(routes::scales::get_scale))
        // Scale requests
        .route(
            "/scale_requests",
            get(routes::scale_requests::list_requests)
                .post(routes::scale_requests::create_request),
        )
        .route(
            "/scale_requests/{id}",
            get(routes::scale_requests::get_request)
                .delete(routes::scale_requests::delete_request),
        )
        .route(
            "/scale_requests/{id}/cancel",
            patch(routes::scale_requests::cancel_request),
        )
        .route(
            "/scale_requests/{id}/response_form",
            get(routes::scale_responses::response_form),
        )
        .route(
            "/scale_requests/{id}/responses",
            post(routes::scale_responses::create_response),
        )
        // Scale responses
        .route("/scale_responses", get(routes::scale_responses::list_responses))
        .route(
            "/scale_responses/{id}",
            get(routes::scale_responses::get_response)
                .delete(routes::scale_responses::delete_response),
        )
        .route(
            "/scale_responses/{id}/interpretation",
            get(routes::interpretation::get_interpretation),
        )
        .route(
            "/scale_responses/{id}/report",
            get(routes::interpretation::get_report_html),
        )
        .route(
            "/scale_responses/{id}/report.docx",
            get(routes::interpretation::get_report_docx),
        )
        .route("/scale_responses/{id}/charts/psa", get(routes::charts::psa_radar))
        .route_layer(axum_mw::from_fn(middleware::auth::enforce_password_reset))
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        // Health (no auth)
        .route("/health", get(routes::health::health_check))
        .route("/auth/login", post(routes::auth::login))
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(axum_mw::from_fn(middleware::audit::audit_log))
                .layer(cors),
        )
        .with_state(state)
}
