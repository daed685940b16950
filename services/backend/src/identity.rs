//! Bearer credential classification and the authenticated-user extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::domain::types::User;
use crate::error::BackendError;
use crate::state::AppState;
use crate::usecase::credential::ResolveCredentialUseCase;

/// Classified `Authorization` header value.
///
/// `Bare` is the whole header taken as an opaque API-key secret; `Prefixed`
/// is the value after a `Token ` scheme prefix, which may name either an API
/// key or a bearer auth token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Bare(String),
    Prefixed(String),
}

impl Credential {
    /// `None` for absent, empty, or malformed headers (`Token` with nothing
    /// after it). Malformed is not an error at this layer.
    pub fn parse(header: Option<&str>) -> Option<Self> {
        let value = header?.trim();
        if value.is_empty() {
            return None;
        }
        match value.strip_prefix("Token ") {
            Some(rest) => {
                let rest = rest.trim();
                if rest.is_empty() {
                    None
                } else {
                    Some(Self::Prefixed(rest.to_owned()))
                }
            }
            None if value == "Token" => None,
            None => Some(Self::Bare(value.to_owned())),
        }
    }

    /// The secret to try against the API-key store (both forms carry one).
    pub fn secret(&self) -> &str {
        match self {
            Self::Bare(value) | Self::Prefixed(value) => value,
        }
    }
}

/// Resolved caller identity. Handlers taking `Identity` only run for
/// requests whose credential resolved to an active user.
#[derive(Debug, Clone)]
pub struct Identity(pub User);

impl FromRequestParts<AppState> for Identity {
    type Rejection = BackendError;

    // axum-core 0.5 defines this as `fn -> impl Future + Send` (not `async fn`).
    // In Rust 1.82+ precise capturing, `async fn` captures lifetimes differently,
    // causing E0195. Fix: extract values synchronously, return a 'static async move block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let credential = Credential::parse(
            parts
                .headers
                .get(AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
        );
        let state = state.clone();

        async move {
            let credential = credential.ok_or(BackendError::Unauthorized)?;
            let usecase = ResolveCredentialUseCase {
                api_keys: state.api_key_repo(),
                auth_tokens: state.auth_token_repo(),
                users: state.user_repo(),
            };
            let user = usecase.execute(&credential).await?;
            Ok(Self(user))
        }
    }
}
