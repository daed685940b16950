use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use drawnzones_backend::domain::repository::{
    ApiKeyRepository, AuthTokenRepository, MagicLinkRepository, MailerPort, RectangleRepository,
    UserRepository,
};
use drawnzones_backend::domain::types::{ApiKey, AuthToken, MagicLink, Rectangle, User};
use drawnzones_backend::error::BackendError;

// ── MockBackend ──────────────────────────────────────────────────────────────

/// In-memory store implementing every repository trait. Clones share state,
/// so one instance can back several usecases and still be inspected after
/// execution.
#[derive(Clone, Default)]
pub struct MockBackend {
    pub users: Arc<Mutex<Vec<User>>>,
    pub links: Arc<Mutex<Vec<MagicLink>>>,
    pub tokens: Arc<Mutex<Vec<AuthToken>>>,
    pub api_keys: Arc<Mutex<Vec<ApiKey>>>,
    pub rectangles: Arc<Mutex<Vec<Rectangle>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn with_link(self, link: MagicLink) -> Self {
        self.links.lock().unwrap().push(link);
        self
    }

    pub fn with_token(self, token: AuthToken) -> Self {
        self.tokens.lock().unwrap().push(token);
        self
    }

    pub fn with_api_key(self, key: ApiKey) -> Self {
        self.api_keys.lock().unwrap().push(key);
        self
    }

    pub fn with_rectangle(self, rectangle: Rectangle) -> Self {
        self.rectangles.lock().unwrap().push(rectangle);
        self
    }
}

impl UserRepository for MockBackend {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, BackendError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), BackendError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<User, BackendError> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .expect("update_profile target should exist");
        if let Some(first_name) = first_name {
            user.first_name = first_name.to_owned();
        }
        if let Some(last_name) = last_name {
            user.last_name = last_name.to_owned();
        }
        if let Some(username) = username {
            user.username = username.to_owned();
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }
}

impl MagicLinkRepository for MockBackend {
    async fn create_fresh(&self, link: &MagicLink) -> Result<(), BackendError> {
        let mut links = self.links.lock().unwrap();
        let now = Utc::now();
        for prior in links
            .iter_mut()
            .filter(|l| l.user_id == link.user_id && l.used_at.is_none())
        {
            prior.used_at = Some(now);
        }
        links.push(link.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: Uuid) -> Result<Option<MagicLink>, BackendError> {
        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|l| l.token == token)
            .cloned())
    }

    async fn consume(
        &self,
        link_id: Uuid,
        candidate: &AuthToken,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<(User, AuthToken)>, BackendError> {
        {
            let mut links = self.links.lock().unwrap();
            // Conditional claim: an already-used link means a lost race.
            let Some(link) = links
                .iter_mut()
                .find(|l| l.id == link_id && l.used_at.is_none())
            else {
                return Ok(None);
            };
            link.used_at = Some(Utc::now());
            if let Some(ip_address) = ip_address {
                link.ip_address = Some(ip_address.to_owned());
            }
            if let Some(user_agent) = user_agent {
                link.user_agent = Some(user_agent.to_owned());
            }
        }

        let user = {
            let mut users = self.users.lock().unwrap();
            let user = users
                .iter_mut()
                .find(|u| u.id == candidate.user_id)
                .expect("magic link owner should exist");
            user.is_email_verified = true;
            user.clone()
        };

        let mut tokens = self.tokens.lock().unwrap();
        let token = match tokens.iter().find(|t| t.user_id == candidate.user_id) {
            Some(token) => token.clone(),
            None => {
                tokens.push(candidate.clone());
                candidate.clone()
            }
        };

        Ok(Some((user, token)))
    }
}

impl AuthTokenRepository for MockBackend {
    async fn find_by_key(&self, key: &str) -> Result<Option<AuthToken>, BackendError> {
        Ok(self
            .tokens
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.key == key)
            .cloned())
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), BackendError> {
        self.tokens.lock().unwrap().retain(|t| t.user_id != user_id);
        Ok(())
    }
}

impl ApiKeyRepository for MockBackend {
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<ApiKey>, BackendError> {
        let mut keys: Vec<ApiKey> = self
            .api_keys
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.user_id == user_id && k.is_active)
            .cloned()
            .collect();
        keys.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(keys)
    }

    async fn create(&self, key: &ApiKey) -> Result<(), BackendError> {
        self.api_keys.lock().unwrap().push(key.clone());
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, key_id: Uuid) -> Result<bool, BackendError> {
        let mut keys = self.api_keys.lock().unwrap();
        match keys
            .iter_mut()
            .find(|k| k.id == key_id && k.user_id == user_id && k.is_active)
        {
            Some(key) => {
                key.is_active = false;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn authenticate(&self, secret: &str) -> Result<Option<ApiKey>, BackendError> {
        let mut keys = self.api_keys.lock().unwrap();
        match keys.iter_mut().find(|k| k.key == secret && k.is_active) {
            Some(key) => {
                key.last_used_at = Some(Utc::now());
                Ok(Some(key.clone()))
            }
            None => Ok(None),
        }
    }
}

impl RectangleRepository for MockBackend {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rectangle>, BackendError> {
        let mut rectangles: Vec<Rectangle> = self
            .rectangles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        rectangles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rectangles)
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Rectangle>, BackendError> {
        Ok(self
            .rectangles
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned())
    }

    async fn exists_by_name(
        &self,
        user_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, BackendError> {
        Ok(self
            .rectangles
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.user_id == user_id && r.name == name && Some(r.id) != exclude))
    }

    async fn create(&self, rectangle: &Rectangle) -> Result<(), BackendError> {
        self.rectangles.lock().unwrap().push(rectangle.clone());
        Ok(())
    }

    async fn update(&self, rectangle: &Rectangle) -> Result<bool, BackendError> {
        let mut rectangles = self.rectangles.lock().unwrap();
        match rectangles
            .iter_mut()
            .find(|r| r.id == rectangle.id && r.user_id == rectangle.user_id)
        {
            Some(existing) => {
                existing.name = rectangle.name.clone();
                existing.coordinates = rectangle.coordinates.clone();
                existing.updated_at = rectangle.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, BackendError> {
        let mut rectangles = self.rectangles.lock().unwrap();
        let before = rectangles.len();
        rectangles.retain(|r| !(r.id == id && r.user_id == user_id));
        Ok(rectangles.len() < before)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, BackendError> {
        Ok(self
            .rectangles
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id)
            .count() as u64)
    }
}

// ── MockMailer ───────────────────────────────────────────────────────────────

/// Records every send as `"welcome:<email>"` or `"magic-link:<url>"`.
#[derive(Clone, Default)]
pub struct MockMailer {
    pub sent: Arc<Mutex<Vec<String>>>,
    pub fail_magic_link: bool,
    pub fail_welcome: bool,
}

impl MockMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_magic_link() -> Self {
        Self {
            fail_magic_link: true,
            ..Self::default()
        }
    }

    pub fn sent_handle(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.sent)
    }
}

impl MailerPort for MockMailer {
    async fn send_magic_link(&self, _user: &User, link_url: &str) -> bool {
        self.sent.lock().unwrap().push(format!("magic-link:{link_url}"));
        !self.fail_magic_link
    }

    async fn send_welcome(&self, user: &User) -> bool {
        self.sent.lock().unwrap().push(format!("welcome:{}", user.email));
        !self.fail_welcome
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user(email: &str) -> User {
    User {
        id: Uuid::now_v7(),
        email: email.to_owned(),
        username: email.to_owned(),
        first_name: String::new(),
        last_name: String::new(),
        is_email_verified: false,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

pub fn test_link(user_id: Uuid) -> MagicLink {
    MagicLink {
        id: Uuid::now_v7(),
        user_id,
        token: Uuid::new_v4(),
        expires_at: Utc::now() + Duration::minutes(15),
        used_at: None,
        ip_address: None,
        user_agent: None,
        created_at: Utc::now(),
    }
}

pub fn test_api_key(user_id: Uuid, secret: &str) -> ApiKey {
    ApiKey {
        id: Uuid::now_v7(),
        user_id,
        name: "ci".to_owned(),
        key: secret.to_owned(),
        is_active: true,
        last_used_at: None,
        created_at: Utc::now(),
    }
}

pub fn test_rectangle(user_id: Uuid, name: &str) -> Rectangle {
    Rectangle {
        id: Uuid::now_v7(),
        user_id,
        name: name.to_owned(),
        coordinates: serde_json::json!({
            "type": "Polygon",
            "coordinates": [[
                [-74.006, 40.7128],
                [-74.006, 40.7228],
                [-73.996, 40.7228],
                [-73.996, 40.7128],
                [-74.006, 40.7128]
            ]]
        }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
