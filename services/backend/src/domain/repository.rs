#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{ApiKey, AuthToken, MagicLink, Rectangle, User};
use crate::error::BackendError;

/// Repository for account records.
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, BackendError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError>;

    async fn create(&self, user: &User) -> Result<(), BackendError>;

    /// Apply the provided profile fields and bump `updated_at`. Returns the
    /// updated record.
    async fn update_profile(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<User, BackendError>;
}

/// Repository for single-use magic links.
pub trait MagicLinkRepository: Send + Sync {
    /// Mark every unused link owned by `link.user_id` as used, then insert the
    /// new link, in one transaction. At most one valid link exists per user.
    async fn create_fresh(&self, link: &MagicLink) -> Result<(), BackendError>;

    async fn find_by_token(&self, token: Uuid) -> Result<Option<MagicLink>, BackendError>;

    /// Claim the link (conditional on it being unused), flip the owner's
    /// verification flag, and get-or-create the owner's auth token, all in one
    /// transaction. `candidate` is inserted only when the owner has no token
    /// yet; the returned token is whichever key ends up current.
    ///
    /// Returns `Ok(None)` when the conditional claim matches zero rows, i.e.
    /// a concurrent verify already consumed the link.
    async fn consume(
        &self,
        link_id: Uuid,
        candidate: &AuthToken,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<(User, AuthToken)>, BackendError>;
}

/// Repository for bearer auth tokens (one per user).
pub trait AuthTokenRepository: Send + Sync {
    async fn find_by_key(&self, key: &str) -> Result<Option<AuthToken>, BackendError>;

    /// Delete the user's token if one exists. Idempotent.
    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), BackendError>;
}

/// Repository for long-lived API keys.
pub trait ApiKeyRepository: Send + Sync {
    /// Active keys owned by the user, newest first.
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<ApiKey>, BackendError>;

    async fn create(&self, key: &ApiKey) -> Result<(), BackendError>;

    /// Soft-delete (`is_active` false). Returns `true` only when an active key
    /// with this id belongs to the user.
    async fn revoke(&self, user_id: Uuid, key_id: Uuid) -> Result<bool, BackendError>;

    /// Exact-secret lookup over active keys; stamps `last_used_at` on a hit.
    async fn authenticate(&self, secret: &str) -> Result<Option<ApiKey>, BackendError>;
}

/// Repository for named rectangles.
pub trait RectangleRepository: Send + Sync {
    /// The user's rectangles, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rectangle>, BackendError>;

    /// Scoped to the owner: a foreign id reads as absent.
    async fn find_for_user(&self, user_id: Uuid, id: Uuid)
    -> Result<Option<Rectangle>, BackendError>;

    /// Whether the user already owns a rectangle with this name, ignoring
    /// `exclude` (the rectangle being updated).
    async fn exists_by_name(
        &self,
        user_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, BackendError>;

    async fn create(&self, rectangle: &Rectangle) -> Result<(), BackendError>;

    /// Replace name/coordinates. Returns `false` when the id does not belong
    /// to the user.
    async fn update(&self, rectangle: &Rectangle) -> Result<bool, BackendError>;

    /// Returns `false` when the id does not belong to the user.
    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, BackendError>;

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, BackendError>;
}

/// Outbound email collaborator. Single synchronous attempt, boolean result,
/// no retries; implementations log failures and never panic.
pub trait MailerPort: Send + Sync {
    async fn send_magic_link(&self, user: &User, link_url: &str) -> bool;

    async fn send_welcome(&self, user: &User) -> bool;
}
