use anyhow::Context;
use async_trait::async_trait;
use aws_config::{defaults, BehaviorVersion};
use aws_credential_types::Credentials;
use aws_sdk_s3::{
    config::{Builder as S3ConfigBuilder, Region},
    Client,
};
use aws_smithy_types::byte_stream::ByteStream;
use bytes::Bytes;
use reqwest::Url;

/// Object storage the browser-side uploader talks to directly.
#[async_trait]
pub trait StorageClient: Send + Sync {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()>;
    /// URL under which a stored object is publicly readable.
    fn public_url(&self, key: &str) -> String;
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub public_url: String,
}

impl StorageConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let endpoint = std::env::var("STORAGE_ENDPOINT").context("STORAGE_ENDPOINT is not set")?;
        let bucket = std::env::var("STORAGE_BUCKET").context("STORAGE_BUCKET is not set")?;
        let public_url = std::env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/{}", endpoint.trim_end_matches('/'), bucket));
        Ok(Self {
            access_key: std::env::var("STORAGE_ACCESS_KEY").context("STORAGE_ACCESS_KEY is not set")?,
            secret_key: std::env::var("STORAGE_SECRET_KEY").context("STORAGE_SECRET_KEY is not set")?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "us-east-1".into()),
            endpoint,
            bucket,
            public_url,
        })
    }
}

/// Appends `key` as a single, percent-encoded path segment of `base`.
pub(crate) fn join_public_url(base: &Url, key: &str) -> String {
    let mut url = base.clone();
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(key);
    }
    url.to_string()
}

/// S3-compatible storage (AWS, MinIO, R2, ...).
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    public_base: Url,
}

impl S3Storage {
    pub async fn new(cfg: &StorageConfig) -> anyhow::Result<Self> {
        let shared = defaults(BehaviorVersion::latest())
            .region(Region::new(cfg.region.clone()))
            .credentials_provider(Credentials::new(
                &cfg.access_key,
                &cfg.secret_key,
                None,
                None,
                "static",
            ))
            .endpoint_url(&cfg.endpoint)
            .load()
            .await;

        let conf = S3ConfigBuilder::from(&shared)
            .endpoint_url(&cfg.endpoint)
            .force_path_style(true)
            .build();

        let public_base = Url::parse(&cfg.public_url)
            .with_context(|| format!("invalid public storage url {}", cfg.public_url))?;

        Ok(Self {
            client: Client::from_conf(conf),
            bucket: cfg.bucket.clone(),
            public_base,
        })
    }
}

#[async_trait]
impl StorageClient for S3Storage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> anyhow::Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .context("s3 put_object")?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base, key)
    }
}
