use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

lazy_static! {
    // Display names: any printable text, no control characters.
    pub(crate) static ref NAME_REGEX: regex::Regex = regex::Regex::new(r"^[^\p{Cc}]+$").unwrap();
}

/// A user row as stored in the credential store.
///
/// This type carries the password hash and therefore must never be serialized into a
/// response; convert it into a [`UserProfile`] first.
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public view of a user, as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&UserRecord> for UserProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            created_at: record.created_at,
        }
    }
}

/// Data needed to insert a user. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Payload for `PATCH /api/users/profile`. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(
        length(min = 2, max = 100, message = "Name must be between 2 and 100 characters"),
        regex(path = "NAME_REGEX", message = "Name must not contain control characters")
    )]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

impl UserRecord {
    pub fn new(input: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash: Some(input.password_hash),
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a profile update in place and bumps `updated_at`.
    pub fn apply(&mut self, update: ProfileUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        self.updated_at = Utc::now();
    }
}
