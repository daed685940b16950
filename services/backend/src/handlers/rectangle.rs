use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::Rectangle;
use crate::error::BackendError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::rectangle::{
    CreateRectangleInput, CreateRectangleUseCase, DeleteRectangleUseCase, GetRectangleUseCase,
    ListRectanglesUseCase, RectangleStatsUseCase, UpdateRectangleInput, UpdateRectangleUseCase,
};

#[derive(Serialize)]
pub struct RectangleResponse {
    pub id: Uuid,
    pub name: String,
    pub coordinates: serde_json::Value,
    /// `[lng, lat]` diagonal midpoint, or null for malformed coordinates.
    pub center_coordinates: Option<[f64; 2]>,
    #[serde(serialize_with = "drawnzones_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "drawnzones_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Rectangle> for RectangleResponse {
    fn from(rectangle: Rectangle) -> Self {
        Self {
            id: rectangle.id,
            center_coordinates: rectangle.center(),
            name: rectangle.name,
            coordinates: rectangle.coordinates,
            created_at: rectangle.created_at,
            updated_at: rectangle.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct RectangleRequest {
    pub name: String,
    pub coordinates: serde_json::Value,
}

// ── GET /api/rectangles ──────────────────────────────────────────────────────

pub async fn list_rectangles(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<RectangleResponse>>, BackendError> {
    let usecase = ListRectanglesUseCase {
        rectangles: state.rectangle_repo(),
    };
    let rectangles = usecase.execute(&user).await?;
    Ok(Json(rectangles.into_iter().map(Into::into).collect()))
}

// ── POST /api/rectangles ─────────────────────────────────────────────────────

pub async fn create_rectangle(
    Identity(user): Identity,
    State(state): State<AppState>,
    Json(body): Json<RectangleRequest>,
) -> Result<(StatusCode, Json<RectangleResponse>), BackendError> {
    let usecase = CreateRectangleUseCase {
        rectangles: state.rectangle_repo(),
    };
    let rectangle = usecase
        .execute(
            &user,
            CreateRectangleInput {
                name: body.name,
                coordinates: body.coordinates,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(rectangle.into())))
}

// ── GET /api/rectangles/{id} ─────────────────────────────────────────────────

pub async fn get_rectangle(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RectangleResponse>, BackendError> {
    let usecase = GetRectangleUseCase {
        rectangles: state.rectangle_repo(),
    };
    let rectangle = usecase.execute(&user, id).await?;
    Ok(Json(rectangle.into()))
}

// ── PUT /api/rectangles/{id} ─────────────────────────────────────────────────

pub async fn update_rectangle(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<RectangleRequest>,
) -> Result<Json<RectangleResponse>, BackendError> {
    let usecase = UpdateRectangleUseCase {
        rectangles: state.rectangle_repo(),
    };
    let rectangle = usecase
        .execute(
            &user,
            id,
            UpdateRectangleInput {
                name: body.name,
                coordinates: body.coordinates,
            },
        )
        .await?;
    Ok(Json(rectangle.into()))
}

// ── DELETE /api/rectangles/{id} ──────────────────────────────────────────────

pub async fn delete_rectangle(
    Identity(user): Identity,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, BackendError> {
    let usecase = DeleteRectangleUseCase {
        rectangles: state.rectangle_repo(),
    };
    usecase.execute(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /api/rectangles/stats ────────────────────────────────────────────────

#[derive(Serialize)]
pub struct RectangleStatsResponse {
    pub total_rectangles: u64,
    pub recent_rectangles: u64,
}

pub async fn rectangle_stats(
    Identity(user): Identity,
    State(state): State<AppState>,
) -> Result<Json<RectangleStatsResponse>, BackendError> {
    let usecase = RectangleStatsUseCase {
        rectangles: state.rectangle_repo(),
    };
    let stats = usecase.execute(&user).await?;
    Ok(Json(RectangleStatsResponse {
        total_rectangles: stats.total_rectangles,
        recent_rectangles: stats.recent_rectangles,
    }))
}
