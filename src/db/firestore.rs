// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed user store.
//!
//! Layout:
//! - `users/{id}`: user records
//! - `user_phones/{phone}`: uniqueness claims pointing at the owning user

use super::{collections, duplicate_phone, UserStore};
use crate::error::AppError;
use crate::models::{EmergencyContact, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use firestore::errors::{BackoffError, FirestoreError};
use serde::{Deserialize, Serialize};

/// Claim document reserving a phone number for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PhoneClaim {
    user_id: String,
    claimed_at: String,
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Document IDs may not contain '/', and phone numbers often carry '+'.
    fn phone_doc_id(phone: &str) -> String {
        urlencoding::encode(phone).into_owned()
    }

    async fn release_phone(&self, phone: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::USER_PHONES)
            .document_id(Self::phone_doc_id(phone))
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[async_trait]
impl UserStore for FirestoreDb {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        let client = self.get_client()?;

        let claim = PhoneClaim {
            user_id: user.id.clone(),
            claimed_at: user.created_at.clone(),
        };

        // Create-only write: a second claim for the same phone fails with
        // ALREADY_EXISTS, which Firestore reports as a data conflict.
        let claimed: Result<PhoneClaim, FirestoreError> = client
            .fluent()
            .insert()
            .into(collections::USER_PHONES)
            .document_id(Self::phone_doc_id(&user.phone))
            .object(&claim)
            .execute()
            .await;

        match claimed {
            Ok(_) => {}
            Err(FirestoreError::DataConflictError(_)) => return Err(duplicate_phone()),
            Err(e) => return Err(AppError::Database(format!("Failed to claim phone: {}", e))),
        }

        let written: Result<User, FirestoreError> = client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&user.id)
            .object(user)
            .execute()
            .await;

        if let Err(e) = written {
            // Free the number so the user can retry registration.
            if let Err(release_err) = self.release_phone(&user.phone).await {
                tracing::error!(
                    user_id = %user.id,
                    error = %release_err,
                    "Failed to release phone claim after user write failure"
                );
            }
            return Err(AppError::Database(format!("Failed to write user: {}", e)));
        }

        tracing::info!(user_id = %user.id, "User created");
        Ok(())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let claim: Option<PhoneClaim> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USER_PHONES)
            .obj()
            .one(Self::phone_doc_id(phone))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        match claim {
            Some(claim) => self.get_user(&claim.user_id).await,
            None => Ok(None),
        }
    }

    async fn add_emergency_contact(
        &self,
        user_id: &str,
        contact: EmergencyContact,
    ) -> Result<Option<Vec<EmergencyContact>>, AppError> {
        let client = self.get_client()?;

        // The read goes through the transaction's consistency selector, so a
        // concurrent append aborts the commit and the closure is retried.
        let contacts = client
            .run_transaction(|db, transaction| {
                let user_id = user_id.to_string();
                let contact = contact.clone();
                Box::pin(async move {
                    let current: Option<User> = db
                        .fluent()
                        .select()
                        .by_id_in(collections::USERS)
                        .obj()
                        .one(&user_id)
                        .await?;

                    let Some(mut user) = current else {
                        return Ok(None);
                    };

                    user.emergency_contacts.push(contact);
                    user.updated_at = now_rfc3339();

                    db.fluent()
                        .update()
                        .in_col(collections::USERS)
                        .document_id(&user.id)
                        .object(&user)
                        .add_to_transaction(transaction)?;

                    Ok::<_, BackoffError<FirestoreError>>(Some(user.emergency_contacts))
                })
            })
            .await
            .map_err(|e| AppError::Database(format!("Failed to add emergency contact: {}", e)))?;

        if let Some(contacts) = &contacts {
            tracing::info!(
                user_id,
                contacts = contacts.len(),
                "Emergency contact added"
            );
        }

        Ok(contacts)
    }
}
