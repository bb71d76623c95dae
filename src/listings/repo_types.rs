use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Upper bound on `imageUrls`, matched by the `listings` table check.
pub const MAX_IMAGES_PER_LISTING: usize = 6;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ListingType {
    Sale,
    Rent,
}

impl ListingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingType::Sale => "sale",
            ListingType::Rent => "rent",
        }
    }
}

impl fmt::Display for ListingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sale" => Ok(ListingType::Sale),
            "rent" => Ok(ListingType::Rent),
            other => anyhow::bail!("unknown listing type {other:?}"),
        }
    }
}

/// A property offered for sale or rent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub regular_price: i64,
    pub discount_price: i64,
    pub offer: bool,
    pub parking: bool,
    pub furnished: bool,
    pub image_urls: Vec<String>,
    pub user_ref: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Row shape of the `listings` table.
#[derive(Debug, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub address: String,
    pub listing_type: String,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub regular_price: i64,
    pub discount_price: i64,
    pub offer: bool,
    pub parking: bool,
    pub furnished: bool,
    pub image_urls: Vec<String>,
    pub user_ref: Uuid,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ListingRow> for Listing {
    type Error = anyhow::Error;

    fn try_from(r: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            description: r.description,
            address: r.address,
            listing_type: r.listing_type.parse()?,
            bedrooms: r.bedrooms,
            bathrooms: r.bathrooms,
            regular_price: r.regular_price,
            discount_price: r.discount_price,
            offer: r.offer,
            parking: r.parking,
            furnished: r.furnished,
            image_urls: r.image_urls,
            user_ref: r.user_ref,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}
