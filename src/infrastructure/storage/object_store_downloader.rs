use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as StorePath;
use object_store::{Attribute, GetOptions, ObjectStore};

use crate::application::RequestContext;
use crate::application::ports::{Downloader, DownloaderError};
use crate::domain::{FileContent, FileInfo, ObjectKey};

use super::mime::resolve_mime_type;

#[derive(Clone)]
pub struct S3Options {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub use_ssl: bool,
}

/// [`Downloader`] backed by any `object_store` implementation.
pub struct ObjectStoreDownloader {
    inner: Arc<dyn ObjectStore>,
}

impl ObjectStoreDownloader {
    pub fn new(inner: Arc<dyn ObjectStore>) -> Self {
        Self { inner }
    }

    /// S3-compatible storage (AWS, MinIO, Yandex Object Storage).
    pub fn s3(options: &S3Options) -> Result<Self, DownloaderError> {
        let store = AmazonS3Builder::new()
            .with_endpoint(endpoint_url(&options.endpoint, options.use_ssl))
            .with_allow_http(!options.use_ssl)
            .with_region(&options.region)
            .with_bucket_name(&options.bucket)
            .with_access_key_id(&options.access_key)
            .with_secret_access_key(&options.secret_key)
            .build()
            .map_err(|e| DownloaderError::Unavailable(e.to_string()))?;

        Ok(Self::new(Arc::new(store)))
    }

    pub fn local(base_path: PathBuf) -> Result<Self, DownloaderError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| DownloaderError::Unavailable(e.to_string()))?;
        let fs = LocalFileSystem::new_with_prefix(base_path)
            .map_err(|e| DownloaderError::Unavailable(e.to_string()))?;
        Ok(Self::new(Arc::new(fs)))
    }
}

#[async_trait]
impl Downloader for ObjectStoreDownloader {
    #[tracing::instrument(skip(self, ctx), fields(key = %key))]
    async fn get_info(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> Result<FileInfo, DownloaderError> {
        let store_path = StorePath::from(key.as_str());
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = ctx
            .guard(self.inner.get_opts(&store_path, options))
            .await?
            .map_err(map_store_error)?;

        let reported = result
            .attributes
            .get(&Attribute::ContentType)
            .map(AsRef::<str>::as_ref);

        Ok(FileInfo::new(resolve_mime_type(key.as_str(), reported)))
    }

    #[tracing::instrument(skip(self, ctx), fields(key = %key))]
    async fn get_file(
        &self,
        ctx: &RequestContext,
        key: &ObjectKey,
    ) -> Result<FileContent, DownloaderError> {
        let store_path = StorePath::from(key.as_str());
        let bytes = ctx
            .guard(async {
                let result = self.inner.get(&store_path).await?;
                result.bytes().await
            })
            .await?
            .map_err(map_store_error)?;

        Ok(FileContent::new(bytes))
    }
}

fn endpoint_url(endpoint: &str, use_ssl: bool) -> String {
    if endpoint.contains("://") {
        endpoint.to_string()
    } else if use_ssl {
        format!("https://{endpoint}")
    } else {
        format!("http://{endpoint}")
    }
}

fn map_store_error(error: object_store::Error) -> DownloaderError {
    match error {
        object_store::Error::NotFound { path, .. } => DownloaderError::NotFound(path),
        e @ (object_store::Error::PermissionDenied { .. }
        | object_store::Error::Unauthenticated { .. }
        | object_store::Error::Precondition { .. }
        | object_store::Error::InvalidPath { .. }) => DownloaderError::Rejected(e.to_string()),
        e => DownloaderError::Unavailable(e.to_string()),
    }
}
