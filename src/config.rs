use anyhow::Context;
use serde::Deserialize;

/// Longest accepted session token lifetime, one year.
pub const MAX_JWT_TTL_MINUTES: i64 = 60 * 24 * 365;

pub const DEFAULT_AVATAR_URL: &str =
    "https://cdn.pixabay.com/photo/2015/10/05/22/37/blank-profile-picture-973460_960_720.png";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub secure: bool,
    /// `None` issues a browser-session cookie without `Max-Age`.
    pub max_age_minutes: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub session: SessionConfig,
    pub default_avatar_url: String,
    pub expose_error_details: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "estate".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "estate-users".into()),
            ttl_minutes: check_ttl(parse_env("JWT_TTL_MINUTES").unwrap_or(60 * 24 * 7))?,
        };
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME")
                .unwrap_or_else(|_| "access_token".into()),
            secure: parse_env("SESSION_COOKIE_SECURE").unwrap_or(false),
            max_age_minutes: parse_env("SESSION_MAX_AGE_MINUTES"),
        };
        Ok(Self {
            database_url,
            jwt,
            session,
            default_avatar_url: std::env::var("DEFAULT_AVATAR_URL")
                .unwrap_or_else(|_| DEFAULT_AVATAR_URL.into()),
            expose_error_details: parse_env("EXPOSE_ERROR_DETAILS").unwrap_or(true),
        })
    }

    /// Config for running against the in-memory store.
    pub fn local(jwt_secret: &str) -> Self {
        Self {
            database_url: String::new(),
            jwt: JwtConfig {
                secret: jwt_secret.into(),
                issuer: "estate".into(),
                audience: "estate-users".into(),
                ttl_minutes: 60,
            },
            session: SessionConfig {
                cookie_name: "access_token".into(),
                secure: false,
                max_age_minutes: None,
            },
            default_avatar_url: DEFAULT_AVATAR_URL.into(),
            expose_error_details: true,
        }
    }
}

fn check_ttl(minutes: i64) -> anyhow::Result<i64> {
    anyhow::ensure!(
        (1..=MAX_JWT_TTL_MINUTES).contains(&minutes),
        "JWT_TTL_MINUTES must be between 1 and {MAX_JWT_TTL_MINUTES}, got {minutes}"
    );
    Ok(minutes)
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}
