use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Backend domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },
    #[error("Invalid magic link token.")]
    LinkNotFound,
    #[error("This magic link has expired. Please request a new one.")]
    LinkExpired,
    #[error("This magic link has already been used.")]
    LinkAlreadyUsed,
    #[error("authentication required")]
    Unauthorized,
    #[error("invalid credential")]
    InvalidCredential,
    #[error("not found")]
    NotFound,
    #[error("Failed to send magic link. Please try again.")]
    EmailDelivery,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl BackendError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION",
            Self::LinkNotFound => "MAGIC_LINK_NOT_FOUND",
            Self::LinkExpired => "MAGIC_LINK_EXPIRED",
            Self::LinkAlreadyUsed => "MAGIC_LINK_USED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::InvalidCredential => "INVALID_CREDENTIAL",
            Self::NotFound => "NOT_FOUND",
            Self::EmailDelivery => "EMAIL_DELIVERY_FAILED",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Field-keyed messages for validation-class errors. Magic-link failures
    /// key under `token` since clients read per-field error lists.
    fn field_errors(&self) -> Option<(&'static str, String)> {
        match self {
            Self::Validation { field, message } => Some((*field, message.clone())),
            Self::LinkNotFound | Self::LinkExpired | Self::LinkAlreadyUsed => {
                Some(("token", self.to_string()))
            }
            _ => None,
        }
    }
}

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation { .. }
            | Self::LinkNotFound
            | Self::LinkExpired
            | Self::LinkAlreadyUsed => StatusCode::BAD_REQUEST,
            Self::Unauthorized | Self::InvalidCredential => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::EmailDelivery | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors; only the anyhow chain of a 500 gets logged.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let mut body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        if let Some((field, message)) = self.field_errors() {
            body["errors"] = serde_json::json!({ field: [message] });
        }
        (status, axum::Json(body)).into_response()
    }
}
