use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::HeaderMap,
};
use serde::{Deserialize, Serialize};

use crate::domain::types::MAGIC_LINK_TTL_MINUTES;
use crate::error::BackendError;
use crate::handlers::UserResponse;
use crate::state::AppState;
use crate::usecase::magic_link::{
    RequestMagicLinkInput, RequestMagicLinkUseCase, VerifyMagicLinkInput, VerifyMagicLinkUseCase,
};

/// Client IP: first x-forwarded-for entry when a front proxy reports one,
/// else the peer address.
fn caller_ip(headers: &HeaderMap, peer: SocketAddr) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty());
    match forwarded {
        Some(first) => Some(first.to_owned()),
        None => Some(peer.ip().to_string()),
    }
}

fn caller_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

// ── POST /api/auth/magic-link/send ───────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendMagicLinkRequest {
    pub email: String,
}

#[derive(Serialize)]
pub struct SendMagicLinkResponse {
    pub message: String,
    pub email: String,
    pub expires_in_minutes: i64,
    pub new_user: bool,
}

pub async fn send_magic_link(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<SendMagicLinkRequest>,
) -> Result<Json<SendMagicLinkResponse>, BackendError> {
    let usecase = RequestMagicLinkUseCase {
        users: state.user_repo(),
        links: state.magic_link_repo(),
        mailer: state.mailer(),
        frontend_url: state.frontend_url.clone(),
    };
    let out = usecase
        .execute(RequestMagicLinkInput {
            email: body.email,
            ip_address: caller_ip(&headers, peer),
            user_agent: caller_user_agent(&headers),
        })
        .await?;
    Ok(Json(SendMagicLinkResponse {
        message: "Magic link sent successfully! Check your email.".to_owned(),
        email: out.user.email,
        expires_in_minutes: MAGIC_LINK_TTL_MINUTES,
        new_user: out.new_user,
    }))
}

// ── POST /api/auth/magic-link/verify ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyMagicLinkRequest {
    pub token: String,
}

#[derive(Serialize)]
pub struct VerifyMagicLinkResponse {
    pub message: String,
    pub token: String,
    pub user: UserResponse,
}

pub async fn verify_magic_link(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<VerifyMagicLinkRequest>,
) -> Result<Json<VerifyMagicLinkResponse>, BackendError> {
    let usecase = VerifyMagicLinkUseCase {
        links: state.magic_link_repo(),
    };
    let out = usecase
        .execute(VerifyMagicLinkInput {
            token: body.token,
            ip_address: caller_ip(&headers, peer),
            user_agent: caller_user_agent(&headers),
        })
        .await?;
    Ok(Json(VerifyMagicLinkResponse {
        message: "Successfully authenticated!".to_owned(),
        token: out.token.key,
        user: out.user.into(),
    }))
}
