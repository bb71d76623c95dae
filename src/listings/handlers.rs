use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::extractors::AuthUser,
    error::AppResult,
    listings::{
        dto::{ListingInput, ListingPatch, DELETED_MESSAGE},
        repo_types::Listing,
        services,
    },
    state::AppState,
};

pub fn read_routes() -> Router<AppState> {
    Router::new().route("/listing/get/:id", get(get_listing))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/listing/create", post(create_listing))
        .route("/listing/update/:id", post(update_listing))
        .route("/listing/delete/:id", delete(delete_listing))
        .route("/user/listings/:id", get(user_listings))
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<ListingInput>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Listing>)> {
    let Json(input) = payload?;
    let listing = services::create(&state, input, user_id).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Listing>> {
    Ok(Json(services::get(&state, &id).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    payload: Result<Json<ListingPatch>, JsonRejection>,
) -> AppResult<Json<Listing>> {
    let Json(patch) = payload?;
    Ok(Json(services::update(&state, &id, patch, user_id).await?))
}

#[instrument(skip(state))]
pub async fn delete_listing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<&'static str>> {
    services::delete(&state, &id, user_id).await?;
    Ok(Json(DELETED_MESSAGE))
}

#[instrument(skip(state))]
pub async fn user_listings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Listing>>> {
    Ok(Json(services::list_by_owner(&state, &id, user_id).await?))
}
