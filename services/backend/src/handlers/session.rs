use axum::{Json, extract::State};
use serde::Serialize;

use crate::error::BackendError;
use crate::handlers::UserResponse;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::magic_link::LogoutUseCase;

// ── POST /api/auth/logout ────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct LogoutResponse {
    pub message: String,
}

pub async fn logout(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<Json<LogoutResponse>, BackendError> {
    let usecase = LogoutUseCase {
        tokens: state.auth_token_repo(),
    };
    usecase.execute(&user).await?;
    Ok(Json(LogoutResponse {
        message: "Successfully logged out.".to_owned(),
    }))
}

// ── GET /api/auth/status ─────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AuthStatusResponse {
    pub authenticated: bool,
    pub user: UserResponse,
}

pub async fn auth_status(Identity(user): Identity) -> Json<AuthStatusResponse> {
    Json(AuthStatusResponse {
        authenticated: true,
        user: user.into(),
    })
}
