//! User entity and the identity view the token engine consults.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Read-only view of an authenticated principal.
///
/// Verification only consults `is_active`; admin routes consult `is_admin`.
pub trait Identity: Clone + Send + Sync + 'static {
    fn id(&self) -> Uuid;
    fn email(&self) -> &str;
    fn is_active(&self) -> bool;
    fn is_admin(&self) -> bool;
}

/// User entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email
    pub email: String,

    /// bcrypt password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the account may authenticate
    pub is_active: bool,

    /// Whether the account may use admin routes
    pub is_admin: bool,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates an active, non-admin user
    pub fn new(email: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: email.into(),
            password_hash: password_hash.into(),
            is_active: true,
            is_admin: false,
            created_at: Utc::now(),
        }
    }

    pub fn with_admin(mut self, is_admin: bool) -> Self {
        self.is_admin = is_admin;
        self
    }

    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }
}

impl Identity for User {
    fn id(&self) -> Uuid {
        self.id
    }

    fn email(&self) -> &str {
        &self.email
    }

    fn is_active(&self) -> bool {
        self.is_active
    }

    fn is_admin(&self) -> bool {
        self.is_admin
    }
}
