use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{GoogleRequest, PublicUser, SigninRequest, SignupRequest},
        services,
        session::{removal_cookie, session_cookie},
    },
    error::AppResult,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/signin", post(signin))
        .route("/auth/google", post(google))
        .route("/auth/signout", get(signout))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<&'static str>)> {
    let Json(payload) = payload?;
    services::signup(&state, payload).await?;
    Ok((StatusCode::CREATED, Json("User created successfully!")))
}

#[instrument(skip(state, jar, payload))]
pub async fn signin(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<SigninRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<PublicUser>)> {
    let Json(payload) = payload?;
    let (user, token) = services::signin(&state, payload).await?;
    let jar = jar.add(session_cookie(&state.config.session, token));
    Ok((jar, Json(user.into())))
}

#[instrument(skip(state, jar, payload))]
pub async fn google(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<GoogleRequest>, JsonRejection>,
) -> AppResult<(CookieJar, Json<PublicUser>)> {
    let Json(payload) = payload?;
    let (user, token) = services::oauth_signin(&state, payload).await?;
    let jar = jar.add(session_cookie(&state.config.session, token));
    Ok((jar, Json(user.into())))
}

#[instrument(skip(state, jar))]
pub async fn signout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<&'static str>) {
    info!("user signed out");
    let jar = jar.add(removal_cookie(&state.config.session));
    (jar, Json("User has been logged out!"))
}
