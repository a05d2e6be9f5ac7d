// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency trigger route.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{AlertRequest, RecipientOutcome};
use crate::routes::extract::AppJson;
use crate::AppState;
use axum::{extract::State, routing::post, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Emergency routes (require authentication via JWT).
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/emergency/trigger", post(trigger))
}

/// Result of an emergency trigger.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TriggerResponse {
    pub message: String,
    pub recipients: usize,
    pub sent: usize,
    pub failed: usize,
    pub results: Vec<RecipientOutcome>,
}

/// Send the emergency SMS to the guardian and every emergency contact.
async fn trigger(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    AppJson(request): AppJson<AlertRequest>,
) -> Result<Json<TriggerResponse>> {
    tracing::info!(user_id = %auth.user_id, "Emergency trigger received");

    let report = state.alert_service.trigger(&auth.user_id, &request).await?;

    let message = if report.is_partial_failure() {
        format!(
            "Emergency SMS sent to {} of {} contacts",
            report.sent,
            report.attempted()
        )
    } else {
        "Emergency SMS sent to contacts".to_string()
    };

    Ok(Json(TriggerResponse {
        message,
        recipients: report.attempted(),
        sent: report.sent,
        failed: report.failed,
        results: report.results,
    }))
}
