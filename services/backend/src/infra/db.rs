use anyhow::Context as _;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use drawnzones_backend_schema::{api_keys, auth_tokens, magic_links, rectangles, users};

use crate::domain::repository::{
    ApiKeyRepository, AuthTokenRepository, MagicLinkRepository, RectangleRepository,
    UserRepository,
};
use crate::domain::types::{ApiKey, AuthToken, MagicLink, Rectangle, User};
use crate::error::BackendError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, BackendError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, BackendError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        Ok(model.map(user_from_model))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, BackendError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        Ok(model.map(user_from_model))
    }

    async fn create(&self, user: &User) -> Result<(), BackendError> {
        users::ActiveModel {
            id: Set(user.id),
            email: Set(user.email.clone()),
            username: Set(user.username.clone()),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            is_email_verified: Set(user.is_email_verified),
            is_active: Set(user.is_active),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<User, BackendError> {
        let mut active = users::ActiveModel {
            id: Set(id),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        if let Some(first_name) = first_name {
            active.first_name = Set(first_name.to_owned());
        }
        if let Some(last_name) = last_name {
            active.last_name = Set(last_name.to_owned());
        }
        if let Some(username) = username {
            active.username = Set(username.to_owned());
        }
        let model = active
            .update(&self.db)
            .await
            .context("update user profile")?;
        Ok(user_from_model(model))
    }
}

fn user_from_model(model: users::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        username: model.username,
        first_name: model.first_name,
        last_name: model.last_name,
        is_email_verified: model.is_email_verified,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Magic link repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbMagicLinkRepository {
    pub db: DatabaseConnection,
}

impl MagicLinkRepository for DbMagicLinkRepository {
    async fn create_fresh(&self, link: &MagicLink) -> Result<(), BackendError> {
        let link = link.clone();
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    // Supersede every still-unused link for this user
                    magic_links::Entity::update_many()
                        .col_expr(magic_links::Column::UsedAt, Expr::value(Utc::now()))
                        .filter(magic_links::Column::UserId.eq(link.user_id))
                        .filter(magic_links::Column::UsedAt.is_null())
                        .exec(txn)
                        .await?;

                    magic_links::ActiveModel {
                        id: Set(link.id),
                        user_id: Set(link.user_id),
                        token: Set(link.token),
                        expires_at: Set(link.expires_at),
                        used_at: Set(None),
                        ip_address: Set(link.ip_address.clone()),
                        user_agent: Set(link.user_agent.clone()),
                        created_at: Set(link.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create fresh magic link")?;
        Ok(())
    }

    async fn find_by_token(&self, token: Uuid) -> Result<Option<MagicLink>, BackendError> {
        let model = magic_links::Entity::find()
            .filter(magic_links::Column::Token.eq(token))
            .one(&self.db)
            .await
            .context("find magic link by token")?;
        Ok(model.map(magic_link_from_model))
    }

    async fn consume(
        &self,
        link_id: Uuid,
        candidate: &AuthToken,
        ip_address: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<Option<(User, AuthToken)>, BackendError> {
        let candidate = candidate.clone();
        let ip_address = ip_address.map(str::to_owned);
        let user_agent = user_agent.map(str::to_owned);

        let result = self
            .db
            .transaction::<_, Option<(users::Model, auth_tokens::Model)>, sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    let now = Utc::now();

                    // Conditional claim: the `used_at IS NULL` guard plus the
                    // affected-row check makes exactly one concurrent verify win.
                    let mut claim = magic_links::Entity::update_many()
                        .col_expr(magic_links::Column::UsedAt, Expr::value(now))
                        .filter(magic_links::Column::Id.eq(link_id))
                        .filter(magic_links::Column::UsedAt.is_null());
                    if let Some(ip_address) = ip_address {
                        claim = claim
                            .col_expr(magic_links::Column::IpAddress, Expr::value(ip_address));
                    }
                    if let Some(user_agent) = user_agent {
                        claim = claim
                            .col_expr(magic_links::Column::UserAgent, Expr::value(user_agent));
                    }
                    if claim.exec(txn).await?.rows_affected == 0 {
                        return Ok(None);
                    }

                    let user = users::Entity::find_by_id(candidate.user_id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            sea_orm::DbErr::RecordNotFound("magic link owner".to_owned())
                        })?;
                    // One-way transition, written only on the first verification
                    let user = if user.is_email_verified {
                        user
                    } else {
                        users::ActiveModel {
                            id: Set(user.id),
                            is_email_verified: Set(true),
                            updated_at: Set(now),
                            ..Default::default()
                        }
                        .update(txn)
                        .await?
                    };

                    let token = match auth_tokens::Entity::find()
                        .filter(auth_tokens::Column::UserId.eq(user.id))
                        .one(txn)
                        .await?
                    {
                        Some(token) => token,
                        None => {
                            auth_tokens::ActiveModel {
                                key: Set(candidate.key.clone()),
                                user_id: Set(user.id),
                                created_at: Set(candidate.created_at),
                            }
                            .insert(txn)
                            .await?
                        }
                    };

                    Ok(Some((user, token)))
                })
            })
            .await
            .context("consume magic link")?;

        Ok(result.map(|(user, token)| (user_from_model(user), auth_token_from_model(token))))
    }
}

fn magic_link_from_model(model: magic_links::Model) -> MagicLink {
    MagicLink {
        id: model.id,
        user_id: model.user_id,
        token: model.token,
        expires_at: model.expires_at,
        used_at: model.used_at,
        ip_address: model.ip_address,
        user_agent: model.user_agent,
        created_at: model.created_at,
    }
}

// ── Auth token repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAuthTokenRepository {
    pub db: DatabaseConnection,
}

impl AuthTokenRepository for DbAuthTokenRepository {
    async fn find_by_key(&self, key: &str) -> Result<Option<AuthToken>, BackendError> {
        let model = auth_tokens::Entity::find_by_id(key.to_owned())
            .one(&self.db)
            .await
            .context("find auth token by key")?;
        Ok(model.map(auth_token_from_model))
    }

    async fn delete_for_user(&self, user_id: Uuid) -> Result<(), BackendError> {
        auth_tokens::Entity::delete_many()
            .filter(auth_tokens::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete auth token for user")?;
        Ok(())
    }
}

fn auth_token_from_model(model: auth_tokens::Model) -> AuthToken {
    AuthToken {
        key: model.key,
        user_id: model.user_id,
        created_at: model.created_at,
    }
}

// ── API key repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbApiKeyRepository {
    pub db: DatabaseConnection,
}

impl ApiKeyRepository for DbApiKeyRepository {
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<ApiKey>, BackendError> {
        let models = api_keys::Entity::find()
            .filter(api_keys::Column::UserId.eq(user_id))
            .filter(api_keys::Column::IsActive.eq(true))
            .order_by_desc(api_keys::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list api keys by user")?;
        Ok(models.into_iter().map(api_key_from_model).collect())
    }

    async fn create(&self, key: &ApiKey) -> Result<(), BackendError> {
        api_keys::ActiveModel {
            id: Set(key.id),
            user_id: Set(key.user_id),
            name: Set(key.name.clone()),
            key: Set(key.key.clone()),
            is_active: Set(key.is_active),
            last_used_at: Set(key.last_used_at),
            created_at: Set(key.created_at),
        }
        .insert(&self.db)
        .await
        .context("create api key")?;
        Ok(())
    }

    async fn revoke(&self, user_id: Uuid, key_id: Uuid) -> Result<bool, BackendError> {
        let result = api_keys::Entity::update_many()
            .col_expr(api_keys::Column::IsActive, Expr::value(false))
            .filter(api_keys::Column::Id.eq(key_id))
            .filter(api_keys::Column::UserId.eq(user_id))
            .filter(api_keys::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("revoke api key")?;
        Ok(result.rows_affected > 0)
    }

    async fn authenticate(&self, secret: &str) -> Result<Option<ApiKey>, BackendError> {
        let model = api_keys::Entity::find()
            .filter(api_keys::Column::Key.eq(secret))
            .filter(api_keys::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find api key by secret")?;
        let Some(model) = model else {
            return Ok(None);
        };

        let model = api_keys::ActiveModel {
            id: Set(model.id),
            last_used_at: Set(Some(Utc::now())),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("stamp api key last_used_at")?;
        Ok(Some(api_key_from_model(model)))
    }
}

fn api_key_from_model(model: api_keys::Model) -> ApiKey {
    ApiKey {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        key: model.key,
        is_active: model.is_active,
        last_used_at: model.last_used_at,
        created_at: model.created_at,
    }
}

// ── Rectangle repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbRectangleRepository {
    pub db: DatabaseConnection,
}

impl RectangleRepository for DbRectangleRepository {
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Rectangle>, BackendError> {
        let models = rectangles::Entity::find()
            .filter(rectangles::Column::UserId.eq(user_id))
            .order_by_desc(rectangles::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list rectangles by user")?;
        Ok(models.into_iter().map(rectangle_from_model).collect())
    }

    async fn find_for_user(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Rectangle>, BackendError> {
        let model = rectangles::Entity::find_by_id(id)
            .filter(rectangles::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .context("find rectangle for user")?;
        Ok(model.map(rectangle_from_model))
    }

    async fn exists_by_name(
        &self,
        user_id: Uuid,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, BackendError> {
        let mut query = rectangles::Entity::find()
            .filter(rectangles::Column::UserId.eq(user_id))
            .filter(rectangles::Column::Name.eq(name));
        if let Some(exclude) = exclude {
            query = query.filter(rectangles::Column::Id.ne(exclude));
        }
        let count = query
            .count(&self.db)
            .await
            .context("count rectangles by name")?;
        Ok(count > 0)
    }

    async fn create(&self, rectangle: &Rectangle) -> Result<(), BackendError> {
        rectangles::ActiveModel {
            id: Set(rectangle.id),
            user_id: Set(rectangle.user_id),
            name: Set(rectangle.name.clone()),
            coordinates: Set(rectangle.coordinates.clone()),
            created_at: Set(rectangle.created_at),
            updated_at: Set(rectangle.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create rectangle")?;
        Ok(())
    }

    async fn update(&self, rectangle: &Rectangle) -> Result<bool, BackendError> {
        let result = rectangles::Entity::update_many()
            .col_expr(rectangles::Column::Name, Expr::value(rectangle.name.clone()))
            .col_expr(
                rectangles::Column::Coordinates,
                Expr::value(rectangle.coordinates.clone()),
            )
            .col_expr(
                rectangles::Column::UpdatedAt,
                Expr::value(rectangle.updated_at),
            )
            .filter(rectangles::Column::Id.eq(rectangle.id))
            .filter(rectangles::Column::UserId.eq(rectangle.user_id))
            .exec(&self.db)
            .await
            .context("update rectangle")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<bool, BackendError> {
        let result = rectangles::Entity::delete_many()
            .filter(rectangles::Column::Id.eq(id))
            .filter(rectangles::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete rectangle")?;
        Ok(result.rows_affected > 0)
    }

    async fn count_by_user(&self, user_id: Uuid) -> Result<u64, BackendError> {
        let count = rectangles::Entity::find()
            .filter(rectangles::Column::UserId.eq(user_id))
            .count(&self.db)
            .await
            .context("count rectangles by user")?;
        Ok(count)
    }
}

fn rectangle_from_model(model: rectangles::Model) -> Rectangle {
    Rectangle {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        coordinates: model.coordinates,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}
