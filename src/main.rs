// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Guardian Alert API Server
//!
//! Registers users with a guardian contact and sends emergency SMS alerts
//! to the guardian and every emergency contact.

use guardian_alert::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, UserStore},
    services::{AlertService, SmsSender, TwilioClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging()?;

    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Guardian Alert API");

    // User store
    let store: Arc<dyn UserStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory user store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // SMS provider (optional; triggers fail with a configuration error without it)
    let sender: Option<Arc<dyn SmsSender>> = match config.twilio_credentials() {
        Some((sid, token)) => {
            tracing::info!("Twilio SMS provider configured");
            Some(Arc::new(TwilioClient::new(sid.to_string(), token.to_string())))
        }
        None => {
            tracing::warn!("Twilio credentials not set; emergency alerts are disabled");
            None
        }
    };
    if config.twilio_phone_number.is_none() {
        tracing::warn!("TWILIO_PHONE_NUMBER not set; emergency alerts are disabled");
    }

    let alert_service = AlertService::new(
        store.clone(),
        sender,
        config.twilio_phone_number.clone(),
        config.sms_send_timeout,
    );

    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        alert_service,
    });

    let app = guardian_alert::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("guardian_alert=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();

    Ok(())
}
