use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::RectangleRepository;
use crate::domain::types::{RECENT_RECTANGLES_LIMIT, Rectangle, User};
use crate::error::BackendError;

fn name_error(message: &str) -> BackendError {
    BackendError::Validation {
        field: "name",
        message: message.to_owned(),
    }
}

fn coordinates_error(message: &str) -> BackendError {
    BackendError::Validation {
        field: "coordinates",
        message: message.to_owned(),
    }
}

/// GeoJSON Polygon shape check: object, `type == "Polygon"`, a non-empty
/// `coordinates` array whose first ring has at least 4 coordinate pairs.
/// Vertex ordering is not validated.
pub fn validate_coordinates(value: &serde_json::Value) -> Result<(), BackendError> {
    if !value.is_object() {
        return Err(coordinates_error("Coordinates must be a valid GeoJSON object"));
    }
    if value.get("type").and_then(|t| t.as_str()) != Some("Polygon") {
        return Err(coordinates_error("Coordinates must be a Polygon type"));
    }
    let rings = match value.get("coordinates") {
        None | Some(serde_json::Value::Null) => {
            return Err(coordinates_error("Coordinates must contain coordinates array"));
        }
        Some(rings) => rings,
    };
    let rings = match rings.as_array() {
        Some(rings) if rings.is_empty() => {
            return Err(coordinates_error("Coordinates must contain coordinates array"));
        }
        Some(rings) => rings,
        None => return Err(coordinates_error("Coordinates must be a non-empty array")),
    };
    let first_ring_len = rings[0].as_array().map(Vec::len).unwrap_or(0);
    if first_ring_len < 4 {
        return Err(coordinates_error(
            "Rectangle must have at least 4 coordinate points",
        ));
    }
    Ok(())
}

// ── ListRectangles ───────────────────────────────────────────────────────────

pub struct ListRectanglesUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> ListRectanglesUseCase<R> {
    pub async fn execute(&self, user: &User) -> Result<Vec<Rectangle>, BackendError> {
        self.rectangles.list_by_user(user.id).await
    }
}

// ── CreateRectangle ──────────────────────────────────────────────────────────

pub struct CreateRectangleInput {
    pub name: String,
    pub coordinates: serde_json::Value,
}

pub struct CreateRectangleUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> CreateRectangleUseCase<R> {
    pub async fn execute(
        &self,
        user: &User,
        input: CreateRectangleInput,
    ) -> Result<Rectangle, BackendError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(name_error("Name cannot be empty"));
        }
        if self.rectangles.exists_by_name(user.id, name, None).await? {
            return Err(name_error("You already have a rectangle with this name"));
        }
        validate_coordinates(&input.coordinates)?;

        let now = Utc::now();
        let rectangle = Rectangle {
            id: Uuid::now_v7(),
            user_id: user.id,
            name: name.to_owned(),
            coordinates: input.coordinates,
            created_at: now,
            updated_at: now,
        };
        self.rectangles.create(&rectangle).await?;
        tracing::info!(name = %rectangle.name, email = %user.email, "rectangle created");
        Ok(rectangle)
    }
}

// ── GetRectangle ─────────────────────────────────────────────────────────────

pub struct GetRectangleUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> GetRectangleUseCase<R> {
    /// Foreign ids read as absent; ownership is never leaked.
    pub async fn execute(&self, user: &User, id: Uuid) -> Result<Rectangle, BackendError> {
        self.rectangles
            .find_for_user(user.id, id)
            .await?
            .ok_or(BackendError::NotFound)
    }
}

// ── UpdateRectangle ──────────────────────────────────────────────────────────

pub struct UpdateRectangleInput {
    pub name: String,
    pub coordinates: serde_json::Value,
}

pub struct UpdateRectangleUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> UpdateRectangleUseCase<R> {
    /// Full replace. Existence is checked first (404 before 400), and the
    /// name-uniqueness check excludes the rectangle being updated.
    pub async fn execute(
        &self,
        user: &User,
        id: Uuid,
        input: UpdateRectangleInput,
    ) -> Result<Rectangle, BackendError> {
        let existing = self
            .rectangles
            .find_for_user(user.id, id)
            .await?
            .ok_or(BackendError::NotFound)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(name_error("Name cannot be empty"));
        }
        if self
            .rectangles
            .exists_by_name(user.id, name, Some(id))
            .await?
        {
            return Err(name_error("You already have a rectangle with this name"));
        }
        validate_coordinates(&input.coordinates)?;

        let rectangle = Rectangle {
            id,
            user_id: user.id,
            name: name.to_owned(),
            coordinates: input.coordinates,
            created_at: existing.created_at,
            updated_at: Utc::now(),
        };
        if !self.rectangles.update(&rectangle).await? {
            return Err(BackendError::NotFound);
        }
        tracing::info!(name = %rectangle.name, email = %user.email, "rectangle updated");
        Ok(rectangle)
    }
}

// ── DeleteRectangle ──────────────────────────────────────────────────────────

pub struct DeleteRectangleUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> DeleteRectangleUseCase<R> {
    pub async fn execute(&self, user: &User, id: Uuid) -> Result<(), BackendError> {
        if !self.rectangles.delete(user.id, id).await? {
            return Err(BackendError::NotFound);
        }
        tracing::info!(%id, email = %user.email, "rectangle deleted");
        Ok(())
    }
}

// ── RectangleStats ───────────────────────────────────────────────────────────

#[derive(Debug)]
pub struct RectangleStats {
    pub total_rectangles: u64,
    pub recent_rectangles: u64,
}

pub struct RectangleStatsUseCase<R: RectangleRepository> {
    pub rectangles: R,
}

impl<R: RectangleRepository> RectangleStatsUseCase<R> {
    pub async fn execute(&self, user: &User) -> Result<RectangleStats, BackendError> {
        let total = self.rectangles.count_by_user(user.id).await?;
        Ok(RectangleStats {
            total_rectangles: total,
            recent_rectangles: total.min(RECENT_RECTANGLES_LIMIT),
        })
    }
}
