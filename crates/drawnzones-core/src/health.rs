use axum::http::StatusCode;

/// Handler for `GET /healthz` (liveness check).
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// Handler for `GET /readyz` (readiness check; override per service as needed).
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
