use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::handlers::UserResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::profile::{GetProfileUseCase, UpdateProfileInput, UpdateProfileUseCase};

// ── GET /api/auth/profile ────────────────────────────────────────────────────

pub async fn get_profile(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, BackendError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(user.id).await?;
    Ok(Json(user.into()))
}

// ── PUT /api/auth/profile ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
}

#[derive(Serialize)]
pub struct UpdateProfileResponse {
    pub message: String,
    pub user: UserResponse,
}

pub async fn update_profile(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, BackendError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let updated = usecase
        .execute(
            &user,
            UpdateProfileInput {
                first_name: body.first_name,
                last_name: body.last_name,
                username: body.username,
            },
        )
        .await?;
    Ok(Json(UpdateProfileResponse {
        message: "Profile updated successfully.".to_owned(),
        user: updated.into(),
    }))
}
