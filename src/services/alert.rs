// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Emergency alert service.
//!
//! Handles the trigger workflow:
//! 1. Check the SMS provider is configured
//! 2. Validate the reported location
//! 3. Load the user
//! 4. Check the sender number is configured
//! 5. Resolve recipients (guardian first, then emergency contacts)
//! 6. Format the alert message
//! 7. Send to every recipient concurrently and collect per-recipient results

use crate::db::UserStore;
use crate::error::{AppError, Result};
use crate::models::{AlertRequest, DeliveryStatus, DispatchReport, RecipientOutcome, User};
use crate::services::sms::{SmsError, SmsSender};
use crate::time_utils::mask_phone;
use futures_util::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Ordered recipient list for a user: guardian phone, then each emergency
/// contact in stored order. Blank entries are skipped.
pub fn resolve_recipients(user: &User) -> Vec<String> {
    std::iter::once(user.father_phone.as_str())
        .chain(user.emergency_contacts.iter().map(|c| c.phone.as_str()))
        .map(str::trim)
        .filter(|phone| !phone.is_empty())
        .map(str::to_string)
        .collect()
}

/// Alert text sent to every recipient.
pub fn format_alert_message(name: &str, maps_link: &str) -> String {
    format!(
        "EMERGENCY ALERT!\nYour daughter {} may be in danger.\nLocation: {}\nPlease contact immediately.",
        name, maps_link
    )
}

/// Sends one message to many recipients.
///
/// Every send is bounded by its own timeout, and a failure for one recipient
/// never affects the others.
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: Arc<dyn SmsSender>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(sender: Arc<dyn SmsSender>, send_timeout: Duration) -> Self {
        Self {
            sender,
            send_timeout,
        }
    }

    /// Send `body` to all `recipients` and wait for every send to settle.
    pub async fn dispatch(&self, from: &str, recipients: &[String], body: &str) -> DispatchReport {
        let sends = recipients.iter().map(|to| self.send_one(from, to, body));
        DispatchReport::from_outcomes(join_all(sends).await)
    }

    async fn send_one(&self, from: &str, to: &str, body: &str) -> RecipientOutcome {
        let result = tokio::time::timeout(self.send_timeout, self.sender.send(from, to, body))
            .await
            .unwrap_or(Err(SmsError::Timeout(self.send_timeout)));

        match result {
            Ok(receipt) => {
                tracing::debug!(
                    recipient = %mask_phone(to),
                    message_id = %receipt.message_id,
                    provider_status = %receipt.status,
                    "Alert SMS accepted"
                );
                RecipientOutcome {
                    recipient: to.to_string(),
                    status: DeliveryStatus::Sent,
                    error_detail: None,
                    message_id: Some(receipt.message_id),
                }
            }
            Err(e) => {
                tracing::warn!(
                    recipient = %mask_phone(to),
                    error = %e,
                    "Alert SMS failed"
                );
                RecipientOutcome {
                    recipient: to.to_string(),
                    status: DeliveryStatus::Failed,
                    error_detail: Some(e.to_string()),
                    message_id: None,
                }
            }
        }
    }
}

/// Entry point for emergency triggers.
pub struct AlertService {
    store: Arc<dyn UserStore>,
    dispatcher: Option<NotificationDispatcher>,
    from_number: Option<String>,
}

impl AlertService {
    /// `sender` is `None` when no SMS provider is configured; triggers then
    /// fail before any other work.
    pub fn new(
        store: Arc<dyn UserStore>,
        sender: Option<Arc<dyn SmsSender>>,
        from_number: Option<String>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher: sender.map(|s| NotificationDispatcher::new(s, send_timeout)),
            from_number,
        }
    }

    /// Run the trigger workflow for an authenticated user.
    ///
    /// Returns the dispatch report when at least one recipient was reached
    /// or there was nobody to reach. Fails with
    /// [`AppError::DeliveryFailed`] when every attempted send failed.
    pub async fn trigger(&self, user_id: &str, request: &AlertRequest) -> Result<DispatchReport> {
        // 1. Provider
        let dispatcher = self.dispatcher.as_ref().ok_or_else(|| {
            AppError::ProviderUnavailable("SMS provider is not configured on the server".to_string())
        })?;

        // 2. Location
        let location = request.validate()?;

        // 3. User
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        // 4. Sender number
        let from = self.from_number.as_deref().ok_or_else(|| {
            AppError::ProviderUnavailable("SMS sender number not configured".to_string())
        })?;

        // 5. Recipients
        let recipients = resolve_recipients(&user);
        if recipients.is_empty() {
            tracing::warn!(user_id, "Emergency triggered but user has no contacts to notify");
        }

        // 6. Message
        let body = format_alert_message(&user.name, &location.maps_link);

        tracing::info!(
            user_id,
            recipients = recipients.len(),
            latitude = location.latitude,
            longitude = location.longitude,
            "Dispatching emergency alert"
        );

        // 7. Dispatch
        let report = dispatcher.dispatch(from, &recipients, &body).await;

        tracing::info!(
            user_id,
            sent = report.sent,
            failed = report.failed,
            "Emergency alert dispatch finished"
        );

        if report.is_complete_failure() {
            return Err(AppError::DeliveryFailed(report));
        }

        Ok(report)
    }
}
