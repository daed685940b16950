use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use rand::Rng;
use uuid::Uuid;

/// Account record keyed by email.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_email_verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// "{first} {last}" when both are set, else whichever is set, else the email.
    pub fn full_name(&self) -> String {
        match (self.first_name.is_empty(), self.last_name.is_empty()) {
            (false, false) => format!("{} {}", self.first_name, self.last_name),
            (false, true) => self.first_name.clone(),
            (true, false) => self.last_name.clone(),
            (true, true) => self.email.clone(),
        }
    }
}

/// Single-use sign-in token emailed to a user.
#[derive(Debug, Clone)]
pub struct MagicLink {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl MagicLink {
    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// Long-lived programmatic credential. Revoked keys stay in storage with
/// `is_active` false.
#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub key: String,
    pub is_active: bool,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Bearer token issued on magic-link verification, one per user.
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub key: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Named map rectangle owned by one user. `coordinates` holds the raw
/// GeoJSON Polygon.
#[derive(Debug, Clone)]
pub struct Rectangle {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub coordinates: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rectangle {
    /// Midpoint of the diagonal between ring vertices 0 and 2, as [lng, lat].
    ///
    /// Returns `None` when the stored coordinates are absent or malformed.
    /// Vertex ordering beyond the minimum count is not validated; a ring that
    /// does not start at a corner yields a meaningless midpoint.
    pub fn center(&self) -> Option<[f64; 2]> {
        let ring = self.coordinates.get("coordinates")?.get(0)?.as_array()?;
        if ring.len() < 4 {
            return None;
        }
        let corner = |i: usize| -> Option<(f64, f64)> {
            let pair = ring.get(i)?.as_array()?;
            Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
        };
        let (lng1, lat1) = corner(0)?;
        let (lng2, lat2) = corner(2)?;
        Some([(lng1 + lng2) / 2.0, (lat1 + lat2) / 2.0])
    }
}

/// Magic link time-to-live in minutes.
pub const MAGIC_LINK_TTL_MINUTES: i64 = 15;

/// Window size for the "recent" figure in rectangle stats.
pub const RECENT_RECTANGLES_LIMIT: u64 = 5;

/// Generate a bearer-token key: 20 random bytes, hex-encoded (40 chars).
pub fn generate_token_key() -> String {
    let mut bytes = [0u8; 20];
    rand::rng().fill(&mut bytes);
    hex::encode(bytes)
}

/// Generate an API-key secret: 32 random bytes (256 bits), URL-safe
/// base64 without padding (43 chars).
pub fn generate_api_key_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
