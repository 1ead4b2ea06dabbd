//! Identity extraction
//!
//! Authentication happens upstream; requests arrive with the identity
//! provider's subject, email and display name as headers. Subject and email
//! are required. The first request of a subject registers the user.

use axum::{
    Json, async_trait,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use serde_json::json;

use crate::domain::User;
use crate::infrastructure::AppState;

pub const USER_SUB_HEADER: &str = "x-user-sub";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_NAME_HEADER: &str = "x-user-name";

/// The acting user of a request
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, Json<serde_json::Value>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let missing = || {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Missing identity header" })),
            )
        };
        let sub = header(parts, USER_SUB_HEADER).ok_or_else(missing)?;
        let email = header(parts, USER_EMAIL_HEADER).ok_or_else(missing)?;
        let name = header(parts, USER_NAME_HEADER).unwrap_or(email);

        let user = state
            .user_repo
            .upsert_from_identity(sub, email, name)
            .await
            .map_err(|e| {
                tracing::error!("Failed to resolve user {}: {}", sub, e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to resolve user" })),
                )
            })?;

        Ok(CurrentUser(user))
    }
}
