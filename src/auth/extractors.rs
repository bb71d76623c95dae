use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;
use tracing::warn;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

/// Extracts and validates the session token, returning the user ID.
///
/// The token is read from the session cookie first and from an
/// `Authorization: Bearer` header otherwise. A missing token is a 401,
/// a token that fails verification a 403.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .map(|c| c.value().to_owned())
            .or_else(|| bearer_token(parts));

        let Some(token) = token else {
            return Err(AppError::unauthorized("Unauthorized"));
        };

        let claims = state.jwt.verify(&token).map_err(|e| {
            warn!(error = %e, "invalid or expired token");
            AppError::forbidden("Forbidden")
        })?;

        Ok(AuthUser(claims.sub))
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    let auth = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}
