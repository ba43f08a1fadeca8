use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    directory::DirectoryState,
    session::Session,
};

/// Header set by the frontend while its auth check is still in flight.
pub const SESSION_LOADING_HEADER: &str = "x-session-loading";

/// Local-only header that names a user directly, skipping JWT validation.
pub const DEV_USER_HEADER: &str = "x-user-id";

/// Claims
///
/// The payload expected inside the session JWT.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user id, looked up in the `UserDirectory`.
    pub sub: Uuid,
    /// Expiration Time (exp).
    pub exp: usize,
    /// Issued At (iat).
    pub iat: usize,
}

/// Session Extractor Implementation
///
/// Turns request headers into the session-provider snapshot the gate evaluates.
///
/// Unlike a strict auth extractor this never rejects. A missing, malformed or expired token,
/// or a user the directory does not know, simply yields an unauthenticated session so the
/// shell can fall back to the public site.
///
/// Resolution order:
/// 1. Local bypass via `x-user-id` (only in `Env::Local`).
/// 2. `Authorization: Bearer <jwt>`, validated with the configured secret.
/// 3. Directory lookup of the token's subject.
///
/// `x-session-loading: true` marks the snapshot as loading in every case.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
    DirectoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let directory = DirectoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let is_loading = parts
            .headers
            .get(SESSION_LOADING_HEADER)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.eq_ignore_ascii_case("true"));

        let mut user = None;
        if let Some(id) = dev_bypass_user(parts, &config) {
            user = directory.get_user(id).await;
        }
        // A failed bypass falls through to the token.
        if user.is_none() {
            if let Some(id) = bearer_subject(parts, &config) {
                user = directory.get_user(id).await;
            }
        }

        let session = match user {
            Some(user) => Session::authenticated(user),
            None => Session::anonymous(),
        };

        Ok(session.loading(is_loading))
    }
}

fn dev_bypass_user(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    if config.env != Env::Local {
        return None;
    }
    parts
        .headers
        .get(DEV_USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn bearer_subject(parts: &Parts, config: &AppConfig) -> Option<Uuid> {
    let token = parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))?;

    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Some(data.claims.sub),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected session token");
            None
        }
    }
}
