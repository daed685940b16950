use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::ValidateEmail;

use crate::domain::repository::{
    AuthTokenRepository, MagicLinkRepository, MailerPort, UserRepository,
};
use crate::domain::types::{AuthToken, MAGIC_LINK_TTL_MINUTES, MagicLink, User, generate_token_key};
use crate::error::BackendError;

/// RFC-shaped syntax plus a dotted domain whose final label is at least two
/// alphabetic characters, so `user@localhost` is rejected.
pub fn is_valid_email(email: &str) -> bool {
    if !email.validate_email() {
        return false;
    }
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

fn invalid_email() -> BackendError {
    BackendError::Validation {
        field: "email",
        message: "Enter a valid email address.".to_owned(),
    }
}

// ── RequestMagicLink ─────────────────────────────────────────────────────────

pub struct RequestMagicLinkInput {
    pub email: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct RequestMagicLinkOutput {
    pub user: User,
    pub link: MagicLink,
    pub new_user: bool,
}

pub struct RequestMagicLinkUseCase<U, M, N>
where
    U: UserRepository,
    M: MagicLinkRepository,
    N: MailerPort,
{
    pub users: U,
    pub links: M,
    pub mailer: N,
    /// Base URL the emailed link points at, e.g. `https://drawnzones.app`.
    pub frontend_url: String,
}

impl<U, M, N> RequestMagicLinkUseCase<U, M, N>
where
    U: UserRepository,
    M: MagicLinkRepository,
    N: MailerPort,
{
    pub async fn execute(
        &self,
        input: RequestMagicLinkInput,
    ) -> Result<RequestMagicLinkOutput, BackendError> {
        // 1. Normalize + validate before touching storage
        let email = input.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(invalid_email());
        }

        // 2. Get-or-create the account. Find-then-insert; the unique index on
        //    email backstops a concurrent first request for the same address.
        let (user, new_user) = match self.users.find_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let now = Utc::now();
                let user = User {
                    id: Uuid::now_v7(),
                    email: email.clone(),
                    username: email.clone(),
                    first_name: String::new(),
                    last_name: String::new(),
                    is_email_verified: false,
                    is_active: true,
                    created_at: now,
                    updated_at: now,
                };
                self.users.create(&user).await?;
                (user, true)
            }
        };

        // 3. Supersede priors + insert, one transaction inside the repository
        let now = Utc::now();
        let link = MagicLink {
            id: Uuid::now_v7(),
            user_id: user.id,
            token: Uuid::new_v4(),
            expires_at: now + Duration::minutes(MAGIC_LINK_TTL_MINUTES),
            used_at: None,
            ip_address: input.ip_address,
            user_agent: input.user_agent,
            created_at: now,
        };
        self.links.create_fresh(&link).await?;

        // 4. Welcome mail for fresh accounts is fire-and-forget
        if new_user && !self.mailer.send_welcome(&user).await {
            tracing::warn!(email = %user.email, "welcome email failed");
        }

        // 5. The link is already committed; delivery failure surfaces as a 500
        //    but never rolls it back.
        let link_url = format!("{}/auth/verify?token={}", self.frontend_url, link.token);
        if !self.mailer.send_magic_link(&user, &link_url).await {
            tracing::warn!(email = %user.email, "magic link email failed");
            return Err(BackendError::EmailDelivery);
        }
        tracing::info!(email = %user.email, new_user, "magic link issued");

        Ok(RequestMagicLinkOutput {
            user,
            link,
            new_user,
        })
    }
}

// ── VerifyMagicLink ──────────────────────────────────────────────────────────

pub struct VerifyMagicLinkInput {
    pub token: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug)]
pub struct VerifyMagicLinkOutput {
    pub user: User,
    pub token: AuthToken,
}

pub struct VerifyMagicLinkUseCase<M: MagicLinkRepository> {
    pub links: M,
}

impl<M: MagicLinkRepository> VerifyMagicLinkUseCase<M> {
    pub async fn execute(
        &self,
        input: VerifyMagicLinkInput,
    ) -> Result<VerifyMagicLinkOutput, BackendError> {
        let token = input
            .token
            .trim()
            .parse::<Uuid>()
            .map_err(|_| BackendError::Validation {
                field: "token",
                message: "Must be a valid UUID.".to_owned(),
            })?;

        let link = self
            .links
            .find_by_token(token)
            .await?
            .ok_or(BackendError::LinkNotFound)?;

        // Used is checked before expired: a consumed link always reports
        // "already used", even once it is also past its expiry.
        if link.is_used() {
            return Err(BackendError::LinkAlreadyUsed);
        }
        if link.is_expired() {
            return Err(BackendError::LinkExpired);
        }

        // The conditional claim inside `consume` is the single winner gate:
        // zero affected rows means another verify got there first.
        let candidate = AuthToken {
            key: generate_token_key(),
            user_id: link.user_id,
            created_at: Utc::now(),
        };
        let (user, token) = self
            .links
            .consume(
                link.id,
                &candidate,
                input.ip_address.as_deref(),
                input.user_agent.as_deref(),
            )
            .await?
            .ok_or(BackendError::LinkAlreadyUsed)?;

        tracing::info!(email = %user.email, "magic link verified");
        Ok(VerifyMagicLinkOutput { user, token })
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutUseCase<T: AuthTokenRepository> {
    pub tokens: T,
}

impl<T: AuthTokenRepository> LogoutUseCase<T> {
    /// Idempotent: succeeds whether or not a token exists.
    pub async fn execute(&self, user: &User) -> Result<(), BackendError> {
        self.tokens.delete_for_user(user.id).await?;
        tracing::info!(email = %user.email, "logged out");
        Ok(())
    }
}
