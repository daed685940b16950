use sea_orm::DatabaseConnection;

use crate::infra::db::{
    DbApiKeyRepository, DbAuthTokenRepository, DbMagicLinkRepository, DbRectangleRepository,
    DbUserRepository,
};
use crate::infra::mailer::SmtpMailer;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: SmtpMailer,
    /// Base URL magic-link emails point at.
    pub frontend_url: String,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn magic_link_repo(&self) -> DbMagicLinkRepository {
        DbMagicLinkRepository {
            db: self.db.clone(),
        }
    }

    pub fn auth_token_repo(&self) -> DbAuthTokenRepository {
        DbAuthTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn api_key_repo(&self) -> DbApiKeyRepository {
        DbApiKeyRepository {
            db: self.db.clone(),
        }
    }

    pub fn rectangle_repo(&self) -> DbRectangleRepository {
        DbRectangleRepository {
            db: self.db.clone(),
        }
    }

    pub fn mailer(&self) -> SmtpMailer {
        self.mailer.clone()
    }
}
