// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency alert request and dispatch report models.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const LOCATION_REQUIRED: &str = "Location data is required";

/// Body of an emergency trigger. Fields stay loose until validated so that a
/// missing field is reported as a validation error rather than a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    #[serde(default)]
    pub latitude: Option<Value>,
    #[serde(default)]
    pub longitude: Option<Value>,
    #[serde(default)]
    pub maps_link: Option<String>,
}

/// A validated location.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub maps_link: String,
}

impl AlertRequest {
    /// Validate the request into a [`Location`].
    ///
    /// Coordinates may be JSON numbers or numeric strings.
    pub fn validate(&self) -> Result<Location, AppError> {
        let maps_link = self
            .maps_link
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::BadRequest(LOCATION_REQUIRED.to_string()))?;

        let latitude = coordinate(self.latitude.as_ref())?;
        let longitude = coordinate(self.longitude.as_ref())?;

        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(AppError::BadRequest(
                "Latitude or longitude out of range".to_string(),
            ));
        }

        Ok(Location {
            latitude,
            longitude,
            maps_link: maps_link.to_string(),
        })
    }
}

fn coordinate(value: Option<&Value>) -> Result<f64, AppError> {
    let invalid = || AppError::BadRequest("Latitude and longitude must be numbers".to_string());

    let parsed = match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.trim().is_empty() => None,
        Some(Value::String(s)) => Some(s.trim().parse::<f64>().map_err(|_| invalid())?),
        Some(Value::Number(n)) => Some(n.as_f64().ok_or_else(invalid)?),
        Some(_) => return Err(invalid()),
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Err(invalid()),
        None => Err(AppError::BadRequest(LOCATION_REQUIRED.to_string())),
    }
}

// ─── Dispatch Report ─────────────────────────────────────────

/// Outcome of a single send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Per-recipient result of an alert dispatch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct RecipientOutcome {
    pub recipient: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// Provider message ID, when the provider accepted the message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

/// Result of sending one alert to every recipient.
///
/// Results are kept in recipient order regardless of completion order.
#[derive(Debug, Clone, Default)]
pub struct DispatchReport {
    pub results: Vec<RecipientOutcome>,
    /// Number of recipients the provider accepted.
    pub sent: usize,
    /// Number of recipients that failed or timed out.
    pub failed: usize,
}

impl DispatchReport {
    pub fn from_outcomes(results: Vec<RecipientOutcome>) -> Self {
        let sent = results
            .iter()
            .filter(|r| r.status == DeliveryStatus::Sent)
            .count();
        let failed = results.len() - sent;
        Self {
            results,
            sent,
            failed,
        }
    }

    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    /// Returns true if every recipient was reached (vacuously true when empty).
    pub fn is_complete_success(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if recipients were attempted and none were reached.
    pub fn is_complete_failure(&self) -> bool {
        self.sent == 0 && self.failed > 0
    }

    /// Returns true if some recipients were reached and some were not.
    pub fn is_partial_failure(&self) -> bool {
        self.sent > 0 && self.failed > 0
    }
}
