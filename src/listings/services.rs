use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    listings::{
        dto::{ListingInput, ListingPatch},
        repo_types::Listing,
    },
    state::AppState,
};

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id).map_err(|_| AppError::not_found("Listing not found!"))
}

async fn owned_listing(state: &AppState, id: &str, user_id: Uuid, action: &str) -> AppResult<Listing> {
    let id = parse_id(id)?;
    let listing = state
        .listings
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found!"))?;
    if listing.user_ref != user_id {
        warn!(listing_id = %id, owner = %listing.user_ref, %user_id, "ownership check failed");
        return Err(AppError::forbidden(format!(
            "You can only {action} your own listings!"
        )));
    }
    Ok(listing)
}

pub async fn create(state: &AppState, input: ListingInput, owner: Uuid) -> AppResult<Listing> {
    let listing = state.listings.insert(owner, input).await?;
    info!(listing_id = %listing.id, %owner, "listing created");
    Ok(listing)
}

pub async fn get(state: &AppState, id: &str) -> AppResult<Listing> {
    let id = parse_id(id)?;
    state
        .listings
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found!"))
}

pub async fn update(
    state: &AppState,
    id: &str,
    patch: ListingPatch,
    user_id: Uuid,
) -> AppResult<Listing> {
    let mut listing = owned_listing(state, id, user_id, "update").await?;
    patch.apply(&mut listing);
    let updated = state
        .listings
        .replace(&listing)
        .await?
        .ok_or_else(|| AppError::not_found("Listing not found!"))?;
    info!(listing_id = %updated.id, "listing updated");
    Ok(updated)
}

pub async fn delete(state: &AppState, id: &str, user_id: Uuid) -> AppResult<()> {
    let listing = owned_listing(state, id, user_id, "delete").await?;
    if !state.listings.delete(listing.id).await? {
        return Err(AppError::not_found("Listing not found!"));
    }
    info!(listing_id = %listing.id, "listing deleted");
    Ok(())
}

pub async fn list_by_owner(state: &AppState, owner: &str, user_id: Uuid) -> AppResult<Vec<Listing>> {
    let owner = Uuid::parse_str(owner).ok();
    if owner != Some(user_id) {
        return Err(AppError::unauthorized("You can only view your own listings!"));
    }
    state.listings.list_by_owner(user_id).await
}
