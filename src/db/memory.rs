// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process user store for local development and tests.

use super::{duplicate_phone, UserStore};
use crate::error::AppError;
use crate::models::{EmergencyContact, User};
use crate::time_utils::now_rfc3339;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// User store backed by concurrent maps. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<String, User>,
    /// phone -> user ID
    phones: DashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: &User) -> Result<(), AppError> {
        // Holding the phone entry while inserting makes the claim and the
        // insert a single step for concurrent registrations.
        match self.phones.entry(user.phone.clone()) {
            Entry::Occupied(_) => Err(duplicate_phone()),
            Entry::Vacant(slot) => {
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(())
            }
        }
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.get(user_id).map(|u| u.clone()))
    }

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        let Some(user_id) = self.phones.get(phone).map(|id| id.clone()) else {
            return Ok(None);
        };
        self.get_user(&user_id).await
    }

    async fn add_emergency_contact(
        &self,
        user_id: &str,
        contact: EmergencyContact,
    ) -> Result<Option<Vec<EmergencyContact>>, AppError> {
        Ok(self.users.get_mut(user_id).map(|mut user| {
            user.emergency_contacts.push(contact);
            user.updated_at = now_rfc3339();
            user.emergency_contacts.clone()
        }))
    }
}
