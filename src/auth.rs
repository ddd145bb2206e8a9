use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, SESSION_TTL_REMEMBER_SECS, SESSION_TTL_SECS},
    credentials::SeedUser,
    error::ApiError,
    models::{BlogPost, Role},
};

/// Name of the session cookie carrying the signed token.
pub const SESSION_COOKIE: &str = "session";

/// Claims
///
/// The payload of a session token. Sessions are stateless: validity is decided
/// by the signature and `exp` alone, never by server-side storage, so any
/// well-formed, unexpired, correctly signed token is trusted.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the username the session was issued for.
    pub sub: String,
    /// The user's stable id from the credential store.
    pub uid: Uuid,
    /// Role captured at login time. A role change requires a fresh login.
    pub role: Role,
    /// Issued At (iat): Unix timestamp of issuance.
    pub iat: i64,
    /// Expiration Time (exp): Unix timestamp after which the token is rejected.
    pub exp: i64,
}

/// IssuedToken
///
/// A freshly signed session token plus the timestamps needed to build the
/// cookie and the login response.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    /// Cookie Max-Age in seconds; always equals `expires_at - issued_at`.
    pub max_age: i64,
}

/// Signs a session token for a seeded user. Lifetime is exactly 7 days with
/// `remember_me`, 24 hours otherwise.
pub fn issue_token(
    user: &SeedUser,
    remember_me: bool,
    secret: &str,
) -> Result<IssuedToken, ApiError> {
    let issued_at = Utc::now().timestamp();
    let ttl = if remember_me {
        SESSION_TTL_REMEMBER_SECS
    } else {
        SESSION_TTL_SECS
    };
    let expires_at = issued_at + ttl;

    let claims = Claims {
        sub: user.username.clone(),
        uid: user.id,
        role: user.role,
        iat: issued_at,
        exp: expires_at,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        tracing::error!("token signing failed: {:?}", e);
        ApiError::ServerError
    })?;

    Ok(IssuedToken {
        token,
        issued_at,
        expires_at,
        max_age: ttl,
    })
}

/// Verifies signature and expiry of a session token. Every failure mode
/// (malformed, bad signature, expired) collapses to `Unauthorized`.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized)
}

/// Builds the Set-Cookie value for a new session. Max-Age matches the token
/// lifetime exactly (604800 or 86400 seconds).
pub fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age={max_age}")
}

/// Builds the Set-Cookie value that clears the session on logout. The token
/// itself is not revoked server-side.
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0")
}

/// AuthUser
///
/// The resolved identity of an authenticated request, attached by the extractor
/// below. Handlers use it for every ownership and role decision.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a
/// function argument in any protected handler. The token is taken from the
/// session cookie first, then from a Bearer header (API clients). No database
/// round trip happens here; the claims carry identity and role.
///
/// Rejection: `ApiError::Unauthorized` (401) on any missing/invalid/expired token.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let token = token_from_cookie(parts)
            .or_else(|| token_from_bearer(parts))
            .ok_or(ApiError::Unauthorized)?;

        let claims = verify_token(&token, &config.jwt_secret)?;

        Ok(AuthUser {
            id: claims.uid,
            username: claims.sub,
            role: claims.role,
        })
    }
}

fn token_from_cookie(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        pair.trim()
            .strip_prefix(SESSION_COOKIE)?
            .strip_prefix('=')
            .map(str::to_string)
    })
}

fn token_from_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

/// Capability predicate for every content mutation: only a contributor may
/// modify a post, and only the post's own author.
pub fn can_modify(user: &AuthUser, post: &BlogPost) -> bool {
    user.role == Role::Contributor && user.id == post.author_id
}
