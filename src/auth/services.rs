use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{GoogleRequest, SigninRequest, SignupRequest},
        password::{hash_password, random_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    state::AppState,
};

const USERNAME_SUFFIX_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Username for an OAuth-provisioned account: the display name without
/// whitespace, lowercased, plus four random base-36 characters.
pub(crate) fn derive_username(name: &str) -> String {
    let mut rng = rand::thread_rng();
    let base: String = name
        .split_whitespace()
        .collect::<String>()
        .to_lowercase();
    let suffix: String = (0..4)
        .map(|_| USERNAME_SUFFIX_ALPHABET[rng.gen_range(0..USERNAME_SUFFIX_ALPHABET.len())] as char)
        .collect();
    format!("{base}{suffix}")
}

pub async fn signup(state: &AppState, req: SignupRequest) -> AppResult<User> {
    let email = normalize_email(&req.email);
    let username = req.username.trim().to_string();

    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    if username.is_empty() {
        return Err(AppError::bad_request("Username is required"));
    }
    if req.password.is_empty() {
        return Err(AppError::bad_request("Password is required"));
    }

    let password_hash = hash_password(&req.password)?;
    let user = state
        .users
        .create(NewUser {
            username,
            email,
            password_hash,
            avatar: state.config.default_avatar_url.clone(),
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

/// Checks credentials and returns the user with a freshly signed token.
pub async fn signin(state: &AppState, req: SigninRequest) -> AppResult<(User, String)> {
    let email = normalize_email(&req.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "signin unknown email");
        return Err(AppError::not_found("User not found!"));
    };

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "signin wrong password");
        return Err(AppError::unauthorized("Wrong credentials!"));
    }

    let token = state.jwt.sign(user.id)?;
    info!(user_id = %user.id, "user signed in");
    Ok((user, token))
}

/// Signs in a user vouched for by the identity provider, provisioning an
/// account on first sight of the email.
pub async fn oauth_signin(state: &AppState, req: GoogleRequest) -> AppResult<(User, String)> {
    let email = normalize_email(&req.email);
    if !is_valid_email(&email) {
        return Err(AppError::bad_request("Invalid email"));
    }

    let user = match state.users.find_by_email(&email).await? {
        Some(user) => user,
        None => provision_oauth_user(state, &req, email).await?,
    };

    let token = state.jwt.sign(user.id)?;
    info!(user_id = %user.id, "user signed in via oauth");
    Ok((user, token))
}

async fn provision_oauth_user(
    state: &AppState,
    req: &GoogleRequest,
    email: String,
) -> AppResult<User> {
    let password_hash = hash_password(&random_password())?;
    let avatar = req
        .photo
        .clone()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or_else(|| state.config.default_avatar_url.clone());

    let created = state
        .users
        .create(NewUser {
            username: derive_username(&req.name),
            email: email.clone(),
            password_hash,
            avatar,
        })
        .await;

    match created {
        Ok(user) => {
            info!(user_id = %user.id, username = %user.username, "oauth user provisioned");
            Ok(user)
        }
        // a concurrent request may have provisioned the same email first
        Err(e) if e.is_conflict() => state
            .users
            .find_by_email(&email)
            .await?
            .ok_or(e),
        Err(e) => Err(e),
    }
}
