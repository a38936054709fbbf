use std::path::PathBuf;
use std::sync::Arc;

use crate::application::ports::{Downloader, DownloaderError};
use crate::presentation::config::{StorageProviderSetting, StorageSettings};

use super::object_store_downloader::{ObjectStoreDownloader, S3Options};

pub struct DownloaderFactory;

impl DownloaderFactory {
    pub fn create(settings: &StorageSettings) -> Result<Arc<dyn Downloader>, DownloaderError> {
        match settings.provider {
            StorageProviderSetting::Local => {
                let path = PathBuf::from(&settings.local_path);
                tracing::info!(path = %path.display(), "Using local filesystem storage");
                Ok(Arc::new(ObjectStoreDownloader::local(path)?))
            }
            StorageProviderSetting::S3 => {
                let options = S3Options {
                    endpoint: required(&settings.endpoint, "endpoint")?,
                    access_key: required(&settings.access_key, "access_key")?,
                    secret_key: required(&settings.secret_key, "secret_key")?,
                    bucket: required(&settings.bucket, "bucket")?,
                    region: settings.region.clone(),
                    use_ssl: settings.use_ssl,
                };
                tracing::info!(
                    endpoint = %options.endpoint,
                    bucket = %options.bucket,
                    use_ssl = options.use_ssl,
                    "Using S3 storage"
                );
                Ok(Arc::new(ObjectStoreDownloader::s3(&options)?))
            }
        }
    }
}

fn required(value: &Option<String>, name: &str) -> Result<String, DownloaderError> {
    value
        .clone()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DownloaderError::Unavailable(format!("storage.{name} required")))
}
