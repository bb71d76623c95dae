use serde::{Deserialize, Serialize};

use crate::listings::repo_types::{Listing, ListingType};

/// Body of `POST /listing/create`. Any owner sent by the client is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingInput {
    pub name: String,
    pub description: String,
    pub address: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub regular_price: i64,
    #[serde(default)]
    pub discount_price: i64,
    #[serde(default)]
    pub offer: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub furnished: bool,
    pub image_urls: Vec<String>,
}

/// Body of `POST /listing/update/:id`; absent fields keep their value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub listing_type: Option<ListingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parking: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_urls: Option<Vec<String>>,
}

impl ListingPatch {
    pub fn apply(self, l: &mut Listing) {
        if let Some(v) = self.name {
            l.name = v;
        }
        if let Some(v) = self.description {
            l.description = v;
        }
        if let Some(v) = self.address {
            l.address = v;
        }
        if let Some(v) = self.listing_type {
            l.listing_type = v;
        }
        if let Some(v) = self.bedrooms {
            l.bedrooms = v;
        }
        if let Some(v) = self.bathrooms {
            l.bathrooms = v;
        }
        if let Some(v) = self.regular_price {
            l.regular_price = v;
        }
        if let Some(v) = self.discount_price {
            l.discount_price = v;
        }
        if let Some(v) = self.offer {
            l.offer = v;
        }
        if let Some(v) = self.parking {
            l.parking = v;
        }
        if let Some(v) = self.furnished {
            l.furnished = v;
        }
        if let Some(v) = self.image_urls {
            l.image_urls = v;
        }
    }
}

impl From<ListingInput> for ListingPatch {
    fn from(i: ListingInput) -> Self {
        Self {
            name: Some(i.name),
            description: Some(i.description),
            address: Some(i.address),
            listing_type: Some(i.listing_type),
            bedrooms: Some(i.bedrooms),
            bathrooms: Some(i.bathrooms),
            regular_price: Some(i.regular_price),
            discount_price: Some(i.discount_price),
            offer: Some(i.offer),
            parking: Some(i.parking),
            furnished: Some(i.furnished),
            image_urls: Some(i.image_urls),
        }
    }
}

/// Plain message body used for delete acknowledgements.
pub const DELETED_MESSAGE: &str = "Listing has been deleted!";
