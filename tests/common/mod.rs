// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use guardian_alert::config::Config;
use guardian_alert::db::MemoryStore;
use guardian_alert::routes::create_router;
use guardian_alert::services::{AlertService, MockSmsSender, SmsSender};
use guardian_alert::AppState;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const SENDER_NUMBER: &str = "+15550009999";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Router plus handles on its in-memory collaborators.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub store: Arc<MemoryStore>,
    pub sms: Arc<MockSmsSender>,
}

/// Create a test app with an in-memory store and a recording SMS sender.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    build_app(true)
}

/// Create a test app with no SMS provider configured.
#[allow(dead_code)]
pub fn create_test_app_without_provider() -> TestApp {
    build_app(false)
}

#[allow(dead_code)]
fn build_app(with_provider: bool) -> TestApp {
    let config = Config::test_default();
    let store = Arc::new(MemoryStore::new());
    let sms = Arc::new(MockSmsSender::new());

    let sender: Option<Arc<dyn SmsSender>> = if with_provider {
        Some(sms.clone())
    } else {
        None
    };

    let alert_service = AlertService::new(
        store.clone(),
        sender,
        Some(SENDER_NUMBER.to_string()),
        config.sms_send_timeout,
    );

    let state = Arc::new(AppState {
        config,
        store: store.clone(),
        alert_service,
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        store,
        sms,
    }
}

/// Send a request and decode the JSON response body.
#[allow(dead_code)]
pub async fn call(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, json)
}

/// Registration body with sensible defaults.
#[allow(dead_code)]
pub fn registration(phone: &str, father_phone: &str) -> Value {
    json!({
        "name": "Asha",
        "phone": phone,
        "fatherName": "Ravi",
        "fatherPhone": father_phone,
        "password": "secret123"
    })
}

/// Register a user and log in, returning the session token and login body.
#[allow(dead_code)]
pub async fn register_and_login(app: &TestApp, phone: &str, father_phone: &str) -> (String, Value) {
    let (status, _) = call(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(registration(phone, father_phone)),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = call(
        app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"phone": phone, "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap().to_string();
    (token, body)
}

/// Mint a token with arbitrary timing (for expiry tests).
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8], iat: usize, exp: usize) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims<'a> {
        sub: &'a str,
        exp: usize,
        iat: usize,
    }

    encode(
        &Header::new(Algorithm::HS256),
        &Claims {
            sub: user_id,
            exp,
            iat,
        },
        &EncodingKey::from_secret(signing_key),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn now_secs() -> usize {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize
}
