pub mod api_key;
pub mod magic_link;
pub mod profile;
pub mod rectangle;
pub mod session;

use serde::Serialize;

use crate::domain::types::User;

/// Serialized account shape shared by the auth endpoints.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: uuid::Uuid,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub is_email_verified: bool,
    #[serde(serialize_with = "drawnzones_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name(),
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_email_verified: user.is_email_verified,
            created_at: user.created_at,
        }
    }
}
