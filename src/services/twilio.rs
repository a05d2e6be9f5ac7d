// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Twilio Messages API client.
//!
//! POST {base}/2010-04-01/Accounts/{sid}/Messages.json
//! Basic auth (account SID, auth token), form fields To/From/Body.

use super::sms::{SmsError, SmsReceipt, SmsSender};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;

const TWILIO_API_BASE: &str = "https://api.twilio.com";

/// Twilio REST client.
#[derive(Clone)]
pub struct TwilioClient {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
}

/// Accepted message resource (subset).
#[derive(Debug, Deserialize)]
struct MessageResource {
    sid: String,
    #[serde(default)]
    status: Option<String>,
}

/// Twilio error body.
#[derive(Debug, Deserialize)]
struct TwilioErrorBody {
    #[serde(default)]
    code: Option<u32>,
    #[serde(default)]
    message: Option<String>,
}

impl TwilioClient {
    pub fn new(account_sid: String, auth_token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: TWILIO_API_BASE.to_string(),
            account_sid,
            auth_token,
        }
    }

    /// Point the client at a different API host (local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url,
            urlencoding::encode(&self.account_sid)
        )
    }
}

#[async_trait]
impl SmsSender for TwilioClient {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[("To", to), ("From", from), ("Body", body)])
            .send()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SmsError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(error_from_response(status, &text));
        }

        let message: MessageResource = serde_json::from_str(&text)
            .map_err(|e| SmsError::Transport(format!("Unexpected Twilio response: {}", e)))?;

        Ok(SmsReceipt {
            message_id: message.sid,
            status: message.status.unwrap_or_else(|| "queued".to_string()),
        })
    }
}

/// Map a non-success Twilio response to an [`SmsError`].
fn error_from_response(status: StatusCode, body: &str) -> SmsError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            tracing::warn!("Twilio rate limit hit (429)");
            SmsError::RateLimited
        }
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SmsError::Unauthorized,
        _ => {
            let message = match serde_json::from_str::<TwilioErrorBody>(body) {
                Ok(TwilioErrorBody {
                    code: Some(code),
                    message: Some(msg),
                }) => format!("{} (code {})", msg, code),
                Ok(TwilioErrorBody {
                    message: Some(msg), ..
                }) => msg,
                _ => body.to_string(),
            };
            SmsError::Rejected {
                status: status.as_u16(),
                message,
            }
        }
    }
}
