// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Registration, login, profile and contact tests against the full router.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

mod common;
use common::{call, create_test_app, register_and_login, registration};

// ─── Registration ────────────────────────────────────────────

#[tokio::test]
async fn test_register_success() {
    let app = create_test_app();

    let (status, body) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(registration("9000000001", "9000000002")),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Registration successful. Please login.");
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_phone_conflicts() {
    let app = create_test_app();

    let mut statuses = Vec::new();
    for father_phone in ["9000000002", "9000000003"] {
        let (status, body) = call(
            &app,
            "POST",
            "/api/auth/register",
            None,
            Some(registration("9000000001", father_phone)),
        )
        .await;
        if status == StatusCode::CONFLICT {
            assert_eq!(body["message"], "User with this mobile number already exists");
        }
        statuses.push(status);
    }

    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_register_duplicate_phone_trimmed() {
    let app = create_test_app();

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(registration("9000000001", "9000000002")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = call(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(registration("  9000000001 ", "9000000002")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_register_race_has_single_winner() {
    let app = create_test_app();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let router = app.router.clone();
            tokio::spawn(async move {
                let body = registration("9000000001", &format!("90000000{:02}", i));
                router
                    .oneshot(
                        Request::builder()
                            .method("POST")
                            .uri("/api/auth/register")
                            .header(header::CONTENT_TYPE, "application/json")
                            .body(Body::from(body.to_string()))
                            .unwrap(),
                    )
                    .await
                    .unwrap()
                    .status()
            })
        })
        .collect();

    let mut created = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::CONFLICT => conflicts += 1,
            other => panic!("unexpected status {other}"),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn test_register_short_password_never_stored() {
    let app = create_test_app();
    let mut body = registration("9000000001", "9000000002");
    body["password"] = json!("12345");

    let (status, response) = call(&app, "POST", "/api/auth/register", None, Some(body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Password must be at least 6 characters");
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = create_test_app();

    for field in ["name", "phone", "fatherName", "fatherPhone", "password"] {
        let mut body = registration("9000000001", "9000000002");
        body.as_object_mut().unwrap().remove(field);

        let (status, response) = call(&app, "POST", "/api/auth/register", None, Some(body)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "missing {field}");
        assert_eq!(response["message"], "All fields are required");
    }

    let mut blank = registration("9000000001", "9000000002");
    blank["fatherPhone"] = json!("   ");
    let (status, _) = call(&app, "POST", "/api/auth/register", None, Some(blank)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(app.store.is_empty());
}

#[tokio::test]
async fn test_register_malformed_json_is_json_400() {
    let app = create_test_app();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/register")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"name\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"], "bad_request");
}

// ─── Login & Profile ─────────────────────────────────────────

#[tokio::test]
async fn test_login_then_me_returns_same_identity() {
    let app = create_test_app();
    let (token, login) = register_and_login(&app, "9000000001", "9000000002").await;

    assert_eq!(login["user"]["phone"], "9000000001");
    assert_eq!(login["user"]["fatherPhone"], "9000000002");
    assert_eq!(login["user"]["emergencyContacts"], json!([]));

    let (status, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["id"], login["user"]["id"]);
    assert_eq!(me["user"]["phone"], "9000000001");
    assert_eq!(me["user"]["name"], "Asha");
}

#[tokio::test]
async fn test_credentials_never_in_responses() {
    let app = create_test_app();
    let (token, login) = register_and_login(&app, "9000000001", "9000000002").await;
    let (_, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;

    for body in [&login, &me] {
        let text = body.to_string();
        assert!(!text.contains("passwordHash"));
        assert!(!text.contains("argon2"));
        assert!(!text.contains("secret123"));
    }
}

#[tokio::test]
async fn test_login_wrong_password_and_unknown_phone() {
    let app = create_test_app();
    register_and_login(&app, "9000000001", "9000000002").await;

    for body in [
        json!({"phone": "9000000001", "password": "wrong-password"}),
        json!({"phone": "9999999999", "password": "secret123"}),
    ] {
        let (status, response) = call(&app, "POST", "/api/auth/login", None, Some(body)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["message"], "Invalid credentials");
        assert!(response.get("token").is_none());
    }
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = create_test_app();

    let (status, response) = call(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"phone": "9000000001"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["message"], "Mobile number and password are required");
}

// ─── Contacts ────────────────────────────────────────────────

#[tokio::test]
async fn test_add_contacts_in_order() {
    let app = create_test_app();
    let (token, _) = register_and_login(&app, "9000000001", "9000000002").await;

    for (name, phone) in [("Aunt", "9000000003"), ("Brother", "9000000004")] {
        let (status, body) = call(
            &app,
            "POST",
            "/api/auth/contacts",
            Some(&token),
            Some(json!({"name": name, "phone": phone})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Contact added");
    }

    let (_, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(
        me["user"]["emergencyContacts"],
        json!([
            {"name": "Aunt", "phone": "9000000003"},
            {"name": "Brother", "phone": "9000000004"}
        ])
    );
}

#[tokio::test]
async fn test_add_contact_requires_both_fields() {
    let app = create_test_app();
    let (token, _) = register_and_login(&app, "9000000001", "9000000002").await;

    for body in [
        json!({"name": "Aunt"}),
        json!({"phone": "9000000003"}),
        json!({"name": "Aunt", "phone": "  "}),
    ] {
        let (status, response) =
            call(&app, "POST", "/api/auth/contacts", Some(&token), Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response["message"], "Contact name and phone are required");
    }

    let (_, me) = call(&app, "GET", "/api/auth/me", Some(&token), None).await;
    assert_eq!(me["user"]["emergencyContacts"], json!([]));
}
