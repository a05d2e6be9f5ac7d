//! User model for storage and API.

use serde::{Deserialize, Deserializer, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User record stored in the user store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Server-assigned ID (also used as document ID)
    pub id: String,
    pub name: String,
    /// Primary mobile number; unique, used to log in
    pub phone: String,
    pub father_name: String,
    /// Guardian phone, always notified first
    #[serde(default, deserialize_with = "null_as_empty")]
    pub father_phone: String,
    /// Argon2 PHC string
    pub password_hash: String,
    /// Extra recipients in insertion order
    #[serde(default)]
    pub emergency_contacts: Vec<EmergencyContact>,
    /// When the user registered (RFC 3339)
    pub created_at: String,
    /// Last profile change (RFC 3339)
    pub updated_at: String,
}

/// An additional person to notify, owned by its user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EmergencyContact {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub phone: String,
}

/// Stored records may carry null or missing phone fields; read them as empty
/// so recipient resolution can skip them.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// User profile as returned to clients (no credential fields).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub father_name: String,
    pub father_phone: String,
    pub emergency_contacts: Vec<EmergencyContact>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            phone: user.phone,
            father_name: user.father_name,
            father_phone: user.father_phone,
            emergency_contacts: user.emergency_contacts,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
