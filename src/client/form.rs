use uuid::Uuid;

use crate::client::{
    api::ApiClient,
    upload::{ImageFile, ImageUploader},
    ClientError,
};
use crate::listings::{
    dto::{ListingInput, ListingPatch},
    repo_types::{Listing, ListingType},
};

pub const NAME_LEN: std::ops::RangeInclusive<usize> = 10..=62;
pub const ROOMS: std::ops::RangeInclusive<i32> = 1..=10;

/// Client-side state of the create/update listing form.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub address: String,
    pub listing_type: ListingType,
    pub bedrooms: i32,
    pub bathrooms: i32,
    pub regular_price: i64,
    pub discount_price: i64,
    pub offer: bool,
    pub parking: bool,
    pub furnished: bool,
    pub image_urls: Vec<String>,
    pub uploading: bool,
    pub image_upload_error: Option<String>,
    pub error: Option<String>,
}

impl Default for ListingForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            address: String::new(),
            listing_type: ListingType::Rent,
            bedrooms: 1,
            bathrooms: 1,
            regular_price: 50,
            discount_price: 0,
            offer: false,
            parking: false,
            furnished: false,
            image_urls: Vec::new(),
            uploading: false,
            image_upload_error: None,
            error: None,
        }
    }
}

impl ListingForm {
    /// Pre-fills the form for editing an existing listing.
    pub fn from_listing(l: &Listing) -> Self {
        Self {
            name: l.name.clone(),
            description: l.description.clone(),
            address: l.address.clone(),
            listing_type: l.listing_type,
            bedrooms: l.bedrooms,
            bathrooms: l.bathrooms,
            regular_price: l.regular_price,
            discount_price: l.discount_price,
            offer: l.offer,
            parking: l.parking,
            furnished: l.furnished,
            image_urls: l.image_urls.clone(),
            ..Self::default()
        }
    }

    pub fn remove_image(&mut self, index: usize) {
        if index < self.image_urls.len() {
            self.image_urls.remove(index);
        }
    }

    /// Uploads `files` and appends their URLs. On failure nothing from the
    /// batch is kept and `image_upload_error` carries the message.
    pub async fn attach_images(
        &mut self,
        uploader: &ImageUploader,
        files: Vec<ImageFile>,
    ) -> Result<(), ClientError> {
        self.uploading = true;
        self.image_upload_error = None;
        let res = uploader.upload_batch(files, self.image_urls.len()).await;
        self.uploading = false;
        match res {
            Ok(urls) => {
                self.image_urls.extend(urls);
                Ok(())
            }
            Err(e) => {
                self.image_upload_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn validate(&self) -> Result<(), ClientError> {
        if self.image_urls.is_empty() {
            return Err(ClientError::Validation("You must upload at least one image".into()));
        }
        if self.offer && self.discount_price > self.regular_price {
            return Err(ClientError::Validation(
                "Discount price must be lower than regular price".into(),
            ));
        }
        if !NAME_LEN.contains(&self.name.chars().count()) {
            return Err(ClientError::Validation(format!(
                "Name must be between {} and {} characters",
                NAME_LEN.start(),
                NAME_LEN.end()
            )));
        }
        if !ROOMS.contains(&self.bedrooms) || !ROOMS.contains(&self.bathrooms) {
            return Err(ClientError::Validation(format!(
                "Bedrooms and bathrooms must be between {} and {}",
                ROOMS.start(),
                ROOMS.end()
            )));
        }
        Ok(())
    }

    pub fn to_input(&self) -> ListingInput {
        ListingInput {
            name: self.name.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            listing_type: self.listing_type,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            regular_price: self.regular_price,
            discount_price: self.discount_price,
            offer: self.offer,
            parking: self.parking,
            furnished: self.furnished,
            image_urls: self.image_urls.clone(),
        }
    }

    pub async fn submit_create(&mut self, api: &ApiClient) -> Result<Listing, ClientError> {
        self.guard()?;
        let res = api.create_listing(&self.to_input()).await;
        self.record(res)
    }

    pub async fn submit_update(&mut self, api: &ApiClient, id: Uuid) -> Result<Listing, ClientError> {
        self.guard()?;
        let patch = ListingPatch::from(self.to_input());
        let res = api.update_listing(id, &patch).await;
        self.record(res)
    }

    fn guard(&mut self) -> Result<(), ClientError> {
        if let Err(e) = self.validate() {
            self.error = Some(e.to_string());
            return Err(e);
        }
        self.error = None;
        Ok(())
    }

    fn record(&mut self, res: Result<Listing, ClientError>) -> Result<Listing, ClientError> {
        if let Err(e) = &res {
            self.error = Some(e.to_string());
        }
        res
    }
}
