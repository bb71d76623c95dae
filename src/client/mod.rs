//! Client side of the application: typed API calls, session state, the
//! listing form and direct-to-storage image uploads.

use thiserror::Error;

pub mod api;
pub mod form;
pub mod session;
pub mod storage;
pub mod upload;

pub use api::ApiClient;
pub use form::ListingForm;
pub use session::SessionState;
pub use upload::{ImageFile, ImageUploader, UploadProgress};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upload(String),
}
