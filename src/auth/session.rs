use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::SessionConfig;

/// HttpOnly cookie carrying the session token.
pub fn session_cookie(cfg: &SessionConfig, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::build((cfg.cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(cfg.secure)
        .build();
    if let Some(minutes) = cfg.max_age_minutes {
        cookie.set_max_age(time::Duration::minutes(minutes));
    }
    cookie
}

/// Empty, already-expired cookie that makes the browser drop the session.
pub fn removal_cookie(cfg: &SessionConfig) -> Cookie<'static> {
    Cookie::build((cfg.cookie_name.clone(), ""))
        .path("/")
        .http_only(true)
        .max_age(time::Duration::ZERO)
        .expires(time::OffsetDateTime::UNIX_EPOCH)
        .build()
}
