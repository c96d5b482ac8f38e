#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use jiff::{SignedDuration, Timestamp};
use psyscale_auth::jwt::JwtConfig;
use psyscale_auth::lockout::LockoutPolicy;
use psyscale_instruments::lookup::NormTables;
use psyscale_server::{AppState, app, bootstrap};
use psyscale_storage::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@admin.com";
pub const ADMIN_PASSWORD: &str = "admin-secret";
pub const MAX_ATTEMPTS: u32 = 3;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub async fn spawn() -> TestApp {
    let state = AppState::new(
        Arc::new(MemoryStore::new()),
        NormTables::empty(),
        JwtConfig {
            secret: "test-secret".to_string(),
            ttl_minutes: 60,
        },
        LockoutPolicy {
            max_attempts: MAX_ATTEMPTS,
            unlock_after: SignedDuration::from_mins(30),
        },
    )
    .unwrap();

    let now = Timestamp::now();
    bootstrap::seed_admin(state.store(), ADMIN_EMAIL, Some(ADMIN_PASSWORD), now)
        .await
        .unwrap();
    bootstrap::seed_scales(state.store(), Path::new("/nonexistent/scales"), now)
        .await
        .unwrap();

    TestApp {
        router: app(state.clone()),
        state,
    }
}

impl TestApp {
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Bytes) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, bytes)
    }

    /// JSON body, `Null` when empty, a string when not JSON.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, _, bytes) = self.raw(method, uri, token, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.call(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.call(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    pub async fn token(&self, email: &str, password: &str) -> String {
        let (status, body) = self.login(email, password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    pub async fn admin_token(&self) -> String {
        self.token(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Create a professional as admin and finish their first-login password
    /// change. Returns the professional id and a usable token.
    pub async fn professional(&self, name: &str, email: &str, cpf: &str) -> (String, String) {
        let admin = self.admin_token().await;
        let (status, body) = self
            .post(
                "/professionals",
                &admin,
                json!({
                    "full_name": name,
                    "email": email,
                    "cpf": cpf,
                    "professional_id": "CRP 06/12345",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["professional"]["id"].as_str().unwrap().to_string();
        let initial = body["initial_password"].as_str().unwrap().to_string();

        let token = self.token(email, &initial).await;
        let (status, _) = self
            .call(
                Method::PUT,
                "/auth/password",
                Some(&token),
                Some(json!({ "current_password": initial, "new_password": "nova-senha" })),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        (id, self.token(email, "nova-senha").await)
    }

    /// Create a patient with the given token. Returns the patient id.
    pub async fn patient(
        &self,
        token: &str,
        name: &str,
        email: &str,
        cpf: &str,
        gender: &str,
    ) -> String {
        let (status, body) = self
            .post(
                "/patients",
                token,
                json!({
                    "full_name": name,
                    "gender": gender,
                    "birthday": "1995-03-10",
                    "email": email,
                    "cpf": cpf,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["patient"]["id"].as_str().unwrap().to_string()
    }

    pub async fn request_scale(&self, token: &str, patient_id: &str, code: &str) -> String {
        let (status, body) = self
            .post(
                "/scale_requests",
                token,
                json!({ "patient_id": patient_id, "scale_code": code }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_str().unwrap().to_string()
    }
}

/// `item_1..=item_count` all set to `value`.
pub fn uniform_answers(item_count: u16, value: &str) -> Value {
    let answers: serde_json::Map<String, Value> = (1..=item_count)
        .map(|n| (format!("item_{n}"), Value::String(value.to_string())))
        .collect();
    Value::Object(answers)
}
