use chrono::{DateTime, Utc};
use common::RecordId;
use document_store::{Document, UniqueKey};
use serde::{Deserialize, Serialize};

/// Constraint keeping email addresses unique across users.
pub const EMAIL_UNIQUE: &str = "users_email_unique";

/// Account role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// Postal address on a user profile. Every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A registered account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub age: i64,
    pub password_hash: String,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub role: Role,
    pub is_active: bool,
    #[serde(default)]
    pub hobbies: Vec<String>,
    /// Content authored by this user.
    #[serde(default)]
    pub posts: Vec<RecordId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for User {
    const COLLECTION: &'static str = "users";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn unique_keys(&self) -> Vec<UniqueKey> {
        vec![UniqueKey::new(EMAIL_UNIQUE, self.email.to_lowercase())]
    }
}

/// The owner fields embedded when a cart is listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: RecordId,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}
