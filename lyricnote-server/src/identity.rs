//! Caller identity resolution
//!
//! Credentials arrive as `Authorization: Bearer <token>`. The token is handed
//! to an [`IdentityResolver`]; whatever it returns becomes the request's
//! [`Caller`]. A missing header, a malformed header and an unknown token all
//! resolve to an anonymous caller. Whether anonymity is an error is up to the
//! handler: mutations call [`Caller::require`], read paths degrade instead.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Maps a request credential to a stable user id
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` means the credential identifies nobody
    async fn resolve(&self, credential: &str) -> ApiResult<Option<Uuid>>;
}

/// Resolves bearer tokens against the `sessions` table
pub struct SessionResolver {
    db: SqlitePool,
}

impl SessionResolver {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl IdentityResolver for SessionResolver {
    async fn resolve(&self, credential: &str) -> ApiResult<Option<Uuid>> {
        Ok(lyricnote_common::api::lookup_session_user(&self.db, credential).await?)
    }
}

/// The resolved identity of the current request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Option<Uuid>);

impl Caller {
    pub fn anonymous() -> Self {
        Caller(None)
    }

    pub fn user(&self) -> Option<Uuid> {
        self.0
    }

    /// The user id, or `Unauthenticated`
    pub fn require(&self) -> ApiResult<Uuid> {
        self.0.ok_or(ApiError::Unauthenticated)
    }
}

/// Extract the token from an `Authorization: Bearer` header value
fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(Caller::anonymous());
        };

        let user = state.identity.resolve(token).await?;
        if user.is_none() {
            debug!("Bearer token matched no session; treating caller as anonymous");
        }

        Ok(Caller(user))
    }
}
