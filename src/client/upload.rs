use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use bytes::Bytes;
use futures::future::join_all;
use time::OffsetDateTime;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

use crate::client::{storage::StorageClient, ClientError};
pub use crate::listings::repo_types::MAX_IMAGES_PER_LISTING;

pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;
pub const IMAGE_LIMIT_MESSAGE: &str = "You can only upload 6 images per listing";
pub const IMAGE_UPLOAD_FAILED_MESSAGE: &str = "Image upload failed (2 MB max per image)";

/// An image picked by the user, held in memory until uploaded.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".into());
        let content_type = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_from_ext)
            .unwrap_or("application/octet-stream");
        Ok(Self::new(name, content_type, bytes))
    }
}

fn mime_from_ext(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        _ => None,
    }
}

/// Per-file progress; batches are never aggregated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub file_name: String,
    pub bytes_sent: u64,
    pub total_bytes: u64,
}

impl UploadProgress {
    pub fn percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 100.0;
        }
        self.bytes_sent as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Sends images straight to object storage and hands back their public URLs.
#[derive(Clone)]
pub struct ImageUploader {
    storage: Arc<dyn StorageClient>,
    progress: Option<UnboundedSender<UploadProgress>>,
}

impl ImageUploader {
    pub fn new(storage: Arc<dyn StorageClient>) -> Self {
        Self {
            storage,
            progress: None,
        }
    }

    pub fn with_progress(mut self, tx: UnboundedSender<UploadProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    /// A batch must hold at least one file and, together with the images
    /// already attached, at most [`MAX_IMAGES_PER_LISTING`].
    pub fn check_batch(files: usize, already_attached: usize) -> Result<(), ClientError> {
        if files == 0 || files + already_attached > MAX_IMAGES_PER_LISTING {
            return Err(ClientError::Upload(IMAGE_LIMIT_MESSAGE.into()));
        }
        Ok(())
    }

    /// Uploads every file concurrently. Either all URLs come back, in input
    /// order, or a single generic error does.
    pub async fn upload_batch(
        &self,
        files: Vec<ImageFile>,
        already_attached: usize,
    ) -> Result<Vec<String>, ClientError> {
        Self::check_batch(files.len(), already_attached)?;

        let batch_ms = (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64;
        let uploads = files
            .into_iter()
            .enumerate()
            .map(|(i, file)| self.store_image(format!("{batch_ms}_{i}_{}", file.name), file));

        join_all(uploads)
            .await
            .into_iter()
            .collect::<anyhow::Result<Vec<_>>>()
            .map_err(|e| {
                warn!(error = %e, "image upload failed");
                ClientError::Upload(IMAGE_UPLOAD_FAILED_MESSAGE.into())
            })
    }

    async fn store_image(&self, key: String, file: ImageFile) -> anyhow::Result<String> {
        let total = file.bytes.len() as u64;
        anyhow::ensure!(
            file.bytes.len() <= MAX_IMAGE_BYTES,
            "{} is {} bytes, over the {} byte limit",
            file.name,
            total,
            MAX_IMAGE_BYTES
        );

        self.report(&file.name, 0, total);
        self.storage
            .put_object(&key, file.bytes, &file.content_type)
            .await
            .with_context(|| format!("upload {}", file.name))?;
        self.report(&file.name, total, total);

        Ok(self.storage.public_url(&key))
    }

    fn report(&self, file_name: &str, bytes_sent: u64, total_bytes: u64) {
        let progress = UploadProgress {
            file_name: file_name.to_string(),
            bytes_sent,
            total_bytes,
        };
        debug!(file = %file_name, percent = progress.percent(), "upload progress");
        if let Some(tx) = &self.progress {
            // a dropped receiver only means nobody is watching
            let _ = tx.send(progress);
        }
    }
}
