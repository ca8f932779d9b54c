//! Optional submitter identity.
//!
//! Accounts are managed elsewhere. Here a signed token is only read, never
//! issued, to attribute a submission to a user. Anything missing or invalid
//! means an anonymous submission.

use axum::http::{header, HeaderMap};
use cookie::Cookie;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

pub const AUTH_COOKIE: &str = "auth-token";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub user_id: String,
    pub exp: usize,
}

/// Returns the `user_id` claim of a valid token, or `None` for anonymous users.
pub fn submitter_id(headers: &HeaderMap, key: Option<&DecodingKey>) -> Option<String> {
    let key = key?;
    let token = extract_token(headers)?;

    match decode::<Claims>(&token, key, &Validation::new(Algorithm::HS256)) {
        Ok(token_data) => Some(token_data.claims.user_id),
        Err(e) => {
            tracing::warn!("Ignoring invalid auth token: {:?}", e);
            None
        }
    }
}

/// Reads the token from `Authorization: Bearer` or the auth cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
    {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| Cookie::parse(pair.trim()).ok())
        .find(|cookie| cookie.name() == AUTH_COOKIE)
        .map(|cookie| cookie.value().to_string())
}
