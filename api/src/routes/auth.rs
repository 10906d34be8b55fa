//! Actor identity
//!
//! Authentication happens upstream; the gateway forwards the resolved user id
//! in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::AppState;
use crate::constants::ACTOR_HEADER;
use crate::domain::parse_id;
use crate::services::error::ApiError;

/// Extractor that reads the acting user's id from the request headers
pub struct AuthUser(pub i64);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_id)
            .map(AuthUser)
            .ok_or(ApiError::Unauthenticated)
    }
}
