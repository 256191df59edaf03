//! Caller identity from the trusted `x-user-id` header
//!
//! Authentication happens upstream; by the time a request reaches the
//! gateway the identity collaborator has stamped the user's UUID on it.

use agrisense_advisor::UserId;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;

use crate::GatewayError;

pub const USER_ID_HEADER: &str = "x-user-id";

fn user_from_headers(headers: &HeaderMap) -> Option<UserId> {
    let raw = headers.get(USER_ID_HEADER)?.to_str().ok()?;
    match raw.parse() {
        Ok(user) => Some(user),
        Err(error) => {
            tracing::debug!("Ignoring malformed {} header: {}", USER_ID_HEADER, error);
            None
        }
    }
}

/// Caller if known; anonymous requests get advice but nothing is stored.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<UserId>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(user_from_headers(&parts.headers)))
    }
}

/// Caller that must be known; rejects with 401 otherwise.
#[derive(Debug, Clone, Copy)]
pub struct RequireUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequireUser {
    type Rejection = GatewayError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers)
            .map(RequireUser)
            .ok_or(GatewayError::Unauthenticated)
    }
}
