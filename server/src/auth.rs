// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::errors::AppError;

use anyhow::{Context, Result};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, StatusCode},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Tokens expire this long after issuance; expiry forces a fresh signin.
const TOKEN_LIFETIME_HOURS: i64 = 24;

lazy_static! {
    // Read once per process. The fallback keeps local development and
    // tests working without an environment file.
    static ref JWT_SECRET: String =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string());
}

/// The only claims a token carries: the account id and the expiry.
#[derive(Serialize, Deserialize, Debug)]
struct Claims {
    sub: String,
    exp: usize,
}

/// Signs a bearer token bound to `user_id`.
pub fn issue_token(user_id: i64) -> Result<String> {
    let exp = (Utc::now() + Duration::hours(TOKEN_LIFETIME_HOURS)).timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp,
    };
    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .context("Failed to sign token")
}

/// Verifies signature and expiry, yielding the embedded account id.
pub fn decode_token(token: &str) -> Result<i64> {
    let data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(JWT_SECRET.as_bytes()),
        &Validation::default(),
    )
    .context("Token rejected")?;

    data.claims
        .sub
        .parse::<i64>()
        .context("Token subject is not an account id")
}

/// Hashes a password on the blocking pool so bcrypt never stalls the
/// async reactor.
pub async fn hash_password(password: &str) -> Result<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .context("Hashing task was cancelled")?
        .context("Failed to hash password")
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let password = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .context("Verification task was cancelled")?
        .context("Failed to verify password")
}

/// The authenticated caller, extracted from the `Authorization` header.
///
/// Adding this as a handler argument is all it takes to protect an
/// operation: the request is rejected with 401 before the handler body
/// runs, and the handler receives a plain account id otherwise.
pub struct AuthUser(pub i64);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::new(StatusCode::UNAUTHORIZED, "No token provided"))?;

        let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

        let user_id = decode_token(token)
            .map_err(|_| AppError::new(StatusCode::UNAUTHORIZED, "Invalid token"))?;

        Ok(AuthUser(user_id))
    }
}
