// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod alert;
pub mod user;

pub use alert::{AlertRequest, DeliveryStatus, DispatchReport, Location, RecipientOutcome};
pub use user::{EmergencyContact, User, UserProfile};
