use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::ApiKeyRepository;
use crate::domain::types::{ApiKey, User, generate_api_key_secret};
use crate::error::BackendError;

// ── ListApiKeys ──────────────────────────────────────────────────────────────

pub struct ListApiKeysUseCase<A: ApiKeyRepository> {
    pub api_keys: A,
}

impl<A: ApiKeyRepository> ListApiKeysUseCase<A> {
    /// Only active keys are visible; revoked ones stay in storage but never
    /// list.
    pub async fn execute(&self, user: &User) -> Result<Vec<ApiKey>, BackendError> {
        self.api_keys.list_active_by_user(user.id).await
    }
}

// ── CreateApiKey ─────────────────────────────────────────────────────────────

pub struct CreateApiKeyInput {
    pub name: String,
}

pub struct CreateApiKeyUseCase<A: ApiKeyRepository> {
    pub api_keys: A,
}

impl<A: ApiKeyRepository> CreateApiKeyUseCase<A> {
    pub async fn execute(
        &self,
        user: &User,
        input: CreateApiKeyInput,
    ) -> Result<ApiKey, BackendError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(BackendError::Validation {
                field: "name",
                message: "Name cannot be empty".to_owned(),
            });
        }

        let api_key = ApiKey {
            id: Uuid::now_v7(),
            user_id: user.id,
            name: name.to_owned(),
            key: generate_api_key_secret(),
            is_active: true,
            last_used_at: None,
            created_at: Utc::now(),
        };
        self.api_keys.create(&api_key).await?;
        tracing::info!(name = %api_key.name, email = %user.email, "api key created");
        Ok(api_key)
    }
}

// ── RevokeApiKey ─────────────────────────────────────────────────────────────

pub struct RevokeApiKeyUseCase<A: ApiKeyRepository> {
    pub api_keys: A,
}

impl<A: ApiKeyRepository> RevokeApiKeyUseCase<A> {
    /// Soft delete. A foreign or unknown id reads as absent, so cross-tenant
    /// revocation is indistinguishable from a missing key.
    pub async fn execute(&self, user: &User, key_id: Uuid) -> Result<(), BackendError> {
        if !self.api_keys.revoke(user.id, key_id).await? {
            return Err(BackendError::NotFound);
        }
        tracing::info!(%key_id, email = %user.email, "api key revoked");
        Ok(())
    }
}
