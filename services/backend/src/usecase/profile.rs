use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::User;
use crate::error::BackendError;

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, BackendError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(BackendError::NotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    /// Applies only the provided fields. Email is not updatable; a username
    /// owned by a different account is rejected, re-submitting one's own is
    /// fine.
    pub async fn execute(
        &self,
        user: &User,
        input: UpdateProfileInput,
    ) -> Result<User, BackendError> {
        if let Some(ref username) = input.username {
            if let Some(owner) = self.users.find_by_username(username).await? {
                if owner.id != user.id {
                    return Err(BackendError::Validation {
                        field: "username",
                        message: "This username is already taken.".to_owned(),
                    });
                }
            }
        }

        let updated = self
            .users
            .update_profile(
                user.id,
                input.first_name.as_deref(),
                input.last_name.as_deref(),
                input.username.as_deref(),
            )
            .await?;
        Ok(updated)
    }
}
