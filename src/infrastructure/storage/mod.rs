mod mime;
mod object_store_downloader;
mod store_factory;

pub use mime::resolve_mime_type;
pub use object_store_downloader::{ObjectStoreDownloader, S3Options};
pub use store_factory::DownloaderFactory;
