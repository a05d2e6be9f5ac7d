// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod alert;
pub mod password;
pub mod sms;
pub mod twilio;

pub use alert::{AlertService, NotificationDispatcher};
pub use sms::{MockSmsSender, SmsError, SmsReceipt, SmsSender};
pub use twilio::TwilioClient;
