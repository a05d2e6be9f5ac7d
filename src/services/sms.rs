// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Outbound SMS capability.
//!
//! The alert dispatcher only sees [`SmsSender`]; the Twilio client and the
//! mock used by tests both implement it.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;
use std::time::Duration;

/// Provider acknowledgement for an accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsReceipt {
    /// Provider message ID
    pub message_id: String,
    /// Provider status at acceptance time (e.g. "queued")
    pub status: String,
}

/// Why a single send failed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SmsError {
    /// Provider refused the message (bad number, unverified recipient, ...)
    #[error("provider rejected message (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("provider rate limit hit")]
    RateLimited,

    #[error("provider authentication failed")]
    Unauthorized,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Capability to send one SMS.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SmsReceipt, SmsError>;
}

/// A message recorded by [`MockSmsSender`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub from: String,
    pub to: String,
    pub body: String,
}

/// In-process sender that records every attempt (for tests and dry runs).
///
/// Recipients can be configured to fail or to hang so partial-failure and
/// timeout behavior can be exercised without a provider.
#[derive(Default)]
pub struct MockSmsSender {
    attempts: Mutex<Vec<SentMessage>>,
    fail_numbers: Mutex<HashSet<String>>,
    hang_numbers: Mutex<HashSet<String>>,
}

impl MockSmsSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sends to these numbers are rejected.
    pub fn set_fail_numbers<I, S>(&self, numbers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.fail_numbers.lock().unwrap_or_else(|e| e.into_inner());
        guard.clear();
        guard.extend(numbers.into_iter().map(Into::into));
    }

    /// Sends to these numbers never complete.
    pub fn set_hang_numbers<I, S>(&self, numbers: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = self.hang_numbers.lock().unwrap_or_else(|e| e.into_inner());
        guard.clear();
        guard.extend(numbers.into_iter().map(Into::into));
    }

    /// Every send attempted so far, in call order.
    pub fn attempts(&self) -> Vec<SentMessage> {
        self.attempts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Recipients of every attempted send, in call order.
    pub fn attempted_recipients(&self) -> Vec<String> {
        self.attempts().into_iter().map(|m| m.to).collect()
    }
}

#[async_trait]
impl SmsSender for MockSmsSender {
    async fn send(&self, from: &str, to: &str, body: &str) -> Result<SmsReceipt, SmsError> {
        let attempt_no = {
            let mut attempts = self.attempts.lock().unwrap_or_else(|e| e.into_inner());
            attempts.push(SentMessage {
                from: from.to_string(),
                to: to.to_string(),
                body: body.to_string(),
            });
            attempts.len()
        };

        let hangs = self
            .hang_numbers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(to);
        if hangs {
            std::future::pending::<()>().await;
        }

        let fails = self
            .fail_numbers
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(to);
        if fails {
            return Err(SmsError::Rejected {
                status: 400,
                message: format!("The 'To' number {} is not a valid phone number.", to),
            });
        }

        Ok(SmsReceipt {
            message_id: format!("SM{:032}", attempt_no),
            status: "queued".to_string(),
        })
    }
}
