use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::ApiKey;
use crate::error::BackendError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::api_key::{
    CreateApiKeyInput, CreateApiKeyUseCase, ListApiKeysUseCase, RevokeApiKeyUseCase,
};

#[derive(Serialize)]
pub struct ApiKeyResponse {
    pub id: Uuid,
    pub name: String,
    pub key: String,
    pub is_active: bool,
    #[serde(serialize_with = "drawnzones_core::serde::opt_to_rfc3339_ms")]
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(serialize_with = "drawnzones_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<ApiKey> for ApiKeyResponse {
    fn from(key: ApiKey) -> Self {
        Self {
            id: key.id,
            name: key.name,
            key: key.key,
            is_active: key.is_active,
            last_used_at: key.last_used_at,
            created_at: key.created_at,
        }
    }
}

// ── GET /api/auth/api-keys ───────────────────────────────────────────────────

pub async fn list_api_keys(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiKeyResponse>>, BackendError> {
    let usecase = ListApiKeysUseCase {
        api_keys: state.api_key_repo(),
    };
    let keys = usecase.execute(&user).await?;
    Ok(Json(keys.into_iter().map(Into::into).collect()))
}

// ── POST /api/auth/api-keys ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateApiKeyRequest {
    pub name: String,
}

pub async fn create_api_key(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<CreateApiKeyRequest>,
) -> Result<(StatusCode, Json<ApiKeyResponse>), BackendError> {
    let usecase = CreateApiKeyUseCase {
        api_keys: state.api_key_repo(),
    };
    let key = usecase
        .execute(&user, CreateApiKeyInput { name: body.name })
        .await?;
    Ok((StatusCode::CREATED, Json(key.into())))
}

// ── DELETE /api/auth/api-keys/{id} ───────────────────────────────────────────

pub async fn delete_api_key(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let usecase = RevokeApiKeyUseCase {
        api_keys: state.api_key_repo(),
    };
    usecase.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
