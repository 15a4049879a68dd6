use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "session";
pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_ROLE: &str = "admin";

/// Claims carried by a session token. Tokens are issued elsewhere and signed
/// with the shared `SESSION_SECRET` (HS256).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub role: String,
    pub exp: usize,
}

/// Extractor for an authenticated session whose role is `admin`.
///
/// Missing or invalid session → 401, valid non-admin session → 403.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let secret = state.auth.session_secret.as_deref().ok_or_else(|| {
            warn!("Admin request rejected: SESSION_SECRET is not configured");
            AppError::Unauthorized
        })?;

        let token = session_token(parts).ok_or(AppError::Unauthorized)?;
        let claims = verify_session(&token, secret)?;

        if claims.role != ADMIN_ROLE {
            warn!("Admin request rejected for {} with role {}", claims.sub, claims.role);
            return Err(AppError::Forbidden);
        }

        Ok(AdminSession(claims))
    }
}

/// Extractor for the static shared secret sent by schedulers in `x-api-key`.
#[derive(Debug, Clone, Copy)]
pub struct ScriptApiKey;

#[async_trait]
impl FromRequestParts<AppState> for ScriptApiKey {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let expected = state.auth.script_api_key.as_deref().ok_or_else(|| {
            warn!("Script request rejected: SCRIPT_API_KEY is not configured");
            AppError::Unauthorized
        })?;

        let provided = parts
            .headers
            .get(API_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        if constant_time_eq(provided.as_bytes(), expected.as_bytes()) {
            Ok(ScriptApiKey)
        } else {
            warn!("Script request rejected: invalid {}", API_KEY_HEADER);
            Err(AppError::Unauthorized)
        }
    }
}

pub fn verify_session(token: &str, secret: &str) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        warn!("Invalid session token: {}", e);
        AppError::Unauthorized
    })
}

/// Bearer token if present, otherwise the session cookie.
fn session_token(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
