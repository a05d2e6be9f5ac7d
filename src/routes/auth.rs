// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account routes: registration, login, profile and emergency contacts.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError, ValidationErrors};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::{EmergencyContact, User, UserProfile};
use crate::routes::extract::AppJson;
use crate::services::password::{hash_password_async, verify_password_async};
use crate::time_utils::now_rfc3339;
use crate::AppState;

const MIN_PASSWORD_CHARS: usize = 6;

/// Routes that need no session.
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

/// Routes that require a session (auth layer applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/auth/contacts", post(add_contact))
}

/// Plain acknowledgement body.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MessageResponse {
    pub message: String,
}

/// Map validation failures to a single client message. Any missing field
/// wins over other problems.
fn check<T: Validate>(request: &T, missing_message: &str) -> Result<()> {
    request.validate().map_err(|errors: ValidationErrors| {
        let field_errors = errors.field_errors();
        let mut all = field_errors.values().flat_map(|errs| errs.iter());

        if all.clone().any(|e| e.code == "required") {
            return AppError::BadRequest(missing_message.to_string());
        }

        let message = all
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| "Invalid request".to_string());
        AppError::BadRequest(message)
    })
}

fn password_length(password: &str) -> std::result::Result<(), ValidationError> {
    if !password.is_empty() && password.chars().count() < MIN_PASSWORD_CHARS {
        let mut err = ValidationError::new("password_length");
        err.message = Some(
            format!("Password must be at least {} characters", MIN_PASSWORD_CHARS).into(),
        );
        return Err(err);
    }
    Ok(())
}

// ─── Registration ────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub father_name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub father_phone: String,
    #[serde(default)]
    #[validate(
        length(min = 1, code = "required"),
        custom(function = "password_length")
    )]
    pub password: String,
}

impl RegisterRequest {
    /// Trim surrounding whitespace from every field except the password.
    fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            father_name: self.father_name.trim().to_string(),
            father_phone: self.father_phone.trim().to_string(),
            password: self.password,
        }
    }
}

/// Create an account. Rejected requests never reach the store.
async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>)> {
    let request = request.normalized();
    check(&request, "All fields are required")?;

    // Cheap early conflict before hashing; the store enforces it atomically.
    if state.store.find_user_by_phone(&request.phone).await?.is_some() {
        return Err(crate::db::duplicate_phone());
    }

    let password_hash = hash_password_async(request.password).await?;
    let now = now_rfc3339();

    let user = User {
        id: uuid::Uuid::new_v4().to_string(),
        name: request.name,
        phone: request.phone,
        father_name: request.father_name,
        father_phone: request.father_phone,
        password_hash,
        emergency_contacts: Vec::new(),
        created_at: now.clone(),
        updated_at: now,
    };

    state.store.create_user(&user).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registration successful. Please login.".to_string(),
        }),
    ))
}

// ─── Login ───────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub phone: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Exchange phone + password for a session token.
///
/// Unknown phone and wrong password are indistinguishable to the client.
async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(mut request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.phone = request.phone.trim().to_string();
    check(&request, "Mobile number and password are required")?;

    let user = state
        .store
        .find_user_by_phone(&request.phone)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !verify_password_async(request.password, user.password_hash.clone()).await? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    let token = create_jwt(&user.id, &state.config.jwt_signing_key)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

// ─── Profile ─────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ProfileResponse {
    pub user: UserProfile,
}

/// Get current user profile (always re-read from the store).
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ProfileResponse>> {
    let user = state
        .store
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse { user: user.into() }))
}

// ─── Emergency Contacts ──────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ContactRequest {
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(min = 1, code = "required"))]
    pub phone: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ContactsResponse {
    pub message: String,
    pub contacts: Vec<EmergencyContact>,
}

/// Append an emergency contact.
async fn add_contact(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    AppJson(request): AppJson<ContactRequest>,
) -> Result<(StatusCode, Json<ContactsResponse>)> {
    let request = ContactRequest {
        name: request.name.trim().to_string(),
        phone: request.phone.trim().to_string(),
    };
    check(&request, "Contact name and phone are required")?;

    let contacts = state
        .store
        .add_emergency_contact(
            &auth.user_id,
            EmergencyContact {
                name: request.name,
                phone: request.phone,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ContactsResponse {
            message: "Contact added".to_string(),
            contacts,
        }),
    ))
}
