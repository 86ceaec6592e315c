use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use tk_core::domain::entities::user::Identity;

/// Profile of the authenticated user, returned by `GET /me`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
}

impl UserResponse {
    pub fn from_identity<I: Identity>(identity: &I) -> Self {
        Self {
            id: identity.id(),
            email: identity.email().to_owned(),
            is_admin: identity.is_admin(),
            is_active: identity.is_active(),
        }
    }
}

/// Account bootstrap input of the `create-user` command
#[derive(Debug, Clone, Validate)]
pub struct CreateUserRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 5, max = 128))]
    pub password: String,
    pub is_admin: bool,
}
