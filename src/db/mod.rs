//! User store: the port handlers and services depend on, plus adapters
//! for Firestore and an in-process map.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{EmergencyContact, User};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Phone uniqueness claims (keyed by encoded phone number)
    pub const USER_PHONES: &str = "user_phones";
}

/// Persistence for user records.
///
/// Implementations guarantee that at most one user exists per phone number,
/// even when registrations race.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`AppError::Conflict`] if the phone is taken.
    async fn create_user(&self, user: &User) -> Result<(), AppError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn find_user_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;

    /// Append a contact and return the updated list, or `None` if the user
    /// does not exist.
    async fn add_emergency_contact(
        &self,
        user_id: &str,
        contact: EmergencyContact,
    ) -> Result<Option<Vec<EmergencyContact>>, AppError>;
}

pub(crate) fn duplicate_phone() -> AppError {
    AppError::Conflict("User with this mobile number already exists".to_string())
}
