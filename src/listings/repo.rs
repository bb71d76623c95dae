use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppResult;
use crate::listings::{
    dto::ListingInput,
    repo_types::{Listing, ListingRow},
};

#[async_trait]
pub trait ListingRepo: Send + Sync {
    async fn insert(&self, owner: Uuid, input: ListingInput) -> AppResult<Listing>;
    async fn find(&self, id: Uuid) -> AppResult<Option<Listing>>;
    /// Writes every mutable field of `listing`; `None` when the row is gone.
    async fn replace(&self, listing: &Listing) -> AppResult<Option<Listing>>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    /// Newest first.
    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<Listing>>;
}

const COLUMNS: &str = "id, name, description, address, listing_type, bedrooms, bathrooms, \
     regular_price, discount_price, offer, parking, furnished, image_urls, user_ref, \
     created_at, updated_at";

#[derive(Clone)]
pub struct PgListingRepo {
    db: PgPool,
}

impl PgListingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_listing(row: ListingRow) -> AppResult<Listing> {
    Ok(Listing::try_from(row).context("decode listing row")?)
}

#[async_trait]
impl ListingRepo for PgListingRepo {
    async fn insert(&self, owner: Uuid, input: ListingInput) -> AppResult<Listing> {
        let sql = format!(
            r#"
            INSERT INTO listings (id, name, description, address, listing_type, bedrooms,
                                  bathrooms, regular_price, discount_price, offer, parking,
                                  furnished, image_urls, user_ref)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.address)
            .bind(input.listing_type.as_str())
            .bind(input.bedrooms)
            .bind(input.bathrooms)
            .bind(input.regular_price)
            .bind(input.discount_price)
            .bind(input.offer)
            .bind(input.parking)
            .bind(input.furnished)
            .bind(&input.image_urls)
            .bind(owner)
            .fetch_one(&self.db)
            .await?;
        into_listing(row)
    }

    async fn find(&self, id: Uuid) -> AppResult<Option<Listing>> {
        let sql = format!("SELECT {COLUMNS} FROM listings WHERE id = $1");
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        row.map(into_listing).transpose()
    }

    async fn replace(&self, l: &Listing) -> AppResult<Option<Listing>> {
        let sql = format!(
            r#"
            UPDATE listings
               SET name = $2, description = $3, address = $4, listing_type = $5,
                   bedrooms = $6, bathrooms = $7, regular_price = $8, discount_price = $9,
                   offer = $10, parking = $11, furnished = $12, image_urls = $13,
                   updated_at = now()
             WHERE id = $1
            RETURNING {COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(l.id)
            .bind(&l.name)
            .bind(&l.description)
            .bind(&l.address)
            .bind(l.listing_type.as_str())
            .bind(l.bedrooms)
            .bind(l.bathrooms)
            .bind(l.regular_price)
            .bind(l.discount_price)
            .bind(l.offer)
            .bind(l.parking)
            .bind(l.furnished)
            .bind(&l.image_urls)
            .fetch_optional(&self.db)
            .await?;
        row.map(into_listing).transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn list_by_owner(&self, owner: Uuid) -> AppResult<Vec<Listing>> {
        let sql = format!(
            "SELECT {COLUMNS} FROM listings WHERE user_ref = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(owner)
            .fetch_all(&self.db)
            .await?;
        rows.into_iter().map(into_listing).collect()
    }
}
