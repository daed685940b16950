use uuid::Uuid;

use crate::domain::repository::{ApiKeyRepository, AuthTokenRepository, UserRepository};
use crate::domain::types::User;
use crate::error::BackendError;
use crate::identity::Credential;

/// Ordered chain of credential-resolver strategies; the first hit wins.
///
/// 1. API-key store: tried for both bare and `Token `-prefixed values, so
///    keys issued before the scheme prefix existed keep working under it.
///    A hit stamps the key's `last_used_at`.
/// 2. Auth-token store: `Token `-prefixed values only.
///
/// Storage errors propagate; they never fall through to the next strategy.
pub struct ResolveCredentialUseCase<A, T, U>
where
    A: ApiKeyRepository,
    T: AuthTokenRepository,
    U: UserRepository,
{
    pub api_keys: A,
    pub auth_tokens: T,
    pub users: U,
}

impl<A, T, U> ResolveCredentialUseCase<A, T, U>
where
    A: ApiKeyRepository,
    T: AuthTokenRepository,
    U: UserRepository,
{
    pub async fn execute(&self, credential: &Credential) -> Result<User, BackendError> {
        if let Some(api_key) = self.api_keys.authenticate(credential.secret()).await? {
            return self.active_owner(api_key.user_id).await;
        }

        if let Credential::Prefixed(key) = credential {
            if let Some(token) = self.auth_tokens.find_by_key(key).await? {
                return self.active_owner(token.user_id).await;
            }
        }

        Err(BackendError::InvalidCredential)
    }

    /// Inactive owners never resolve; indistinguishable from a bad secret.
    async fn active_owner(&self, user_id: Uuid) -> Result<User, BackendError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(BackendError::InvalidCredential)?;
        if !user.is_active {
            return Err(BackendError::InvalidCredential);
        }
        Ok(user)
    }
}
