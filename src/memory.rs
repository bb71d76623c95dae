//! In-memory store with the same constraints as the Postgres schema.
//! Backs tests and local runs without a database.

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    auth::{
        repo::UserRepo,
        repo_types::{NewUser, User},
    },
    error::{AppError, AppResult},
    listings::{
        dto::ListingInput,
        repo::ListingRepo,
        repo_types::{Listing, MAX_IMAGES_PER_LISTING},
    },
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    listings: RwLock<Vec<Listing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_listing(l: &Listing) -> AppResult<()> {
    if l.image_urls.is_empty() || l.image_urls.len() > MAX_IMAGES_PER_LISTING {
        return Err(AppError::bad_request(format!(
            "imageUrls must hold between 1 and {MAX_IMAGES_PER_LISTING} entries"
        )));
    }
    if l.offer && l.discount_price > l.regular_price {
        return Err(AppError::bad_request(
            "discountPrice must not exceed regularPrice",
        ));
    }
    Ok(())
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::conflict("email is already taken"));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(AppError::conflict("username is already taken"));
        }
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            avatar: user.avatar,
            created_at: now,
            updated_at: now,
        };
        users.push(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ListingRepo for MemoryStore {
    async fn insert(&self, owner: Uuid, input: ListingInput) -> AppResult<Listing> {
        if !self.users.read().await.iter().any(|u| u.id == owner) {
            return Err(AppError::bad_request("userRef does not reference a user"));
        }
        let now = OffsetDateTime::now_utc();
        let listing = Listing {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            address: input.address,
            listing_type: input.listing_type,
            bedrooms: input.bedrooms,
            bathrooms: input.bathrooms,
            regular_price: input.regular_price,
            discount_price: input.discount_price,
            offer: input.offer,
            parking: input.parking,
            furnished: input.furnished,
            image_urls: input.image_urls,
            user_ref: owner,
            created_at: now,
            updated_at: now,
        };
        check_listing(&listing)?;
        self.listings.write().await.push(listing.clone());
        Ok(listing)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn replace(&self, listing: &Listing) -> AppResult<Option<Listing>> {
        check_listing(listing)?;
        let mut listings = self.listings.write().await;
        let Some(slot) = listings.iter_mut().find(|l| l.id == listing.id) else {
            return Ok(None);
        };
        let mut next = listing.clone();
        next.user_ref = slot.user_ref;
        next.created_at = slot.created_at;
        next.updated_at = OffsetDateTime::now_utc();
        *slot = next.clone();
        Ok(Some(next))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() != before)
    }

    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<Listing>> {
        let listings = self.listings.read().await;
        Ok(listings
            .iter()
            .rev()
            .filter(|l| l.user_ref == owner)
            .cloned()
            .collect())
    }
}
