use std::sync::Arc;

use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use tokio_util::sync::CancellationToken;

use doc2text::application::ports::{Downloader, DownloaderError};
use doc2text::application::{Classify, ErrorKind, Interruption, RequestContext};
use doc2text::domain::ObjectKey;
use doc2text::infrastructure::storage::{
    DownloaderFactory, ObjectStoreDownloader, resolve_mime_type,
};
use doc2text::presentation::config::{StorageProviderSetting, StorageSettings};

fn local_settings(path: &std::path::Path) -> StorageSettings {
    StorageSettings {
        provider: StorageProviderSetting::Local,
        endpoint: None,
        access_key: None,
        secret_key: None,
        bucket: None,
        region: "us-east-1".to_string(),
        use_ssl: false,
        local_path: path.to_string_lossy().into_owned(),
    }
}

#[test]
fn given_reported_content_type_when_resolving_then_store_value_wins() {
    assert_eq!(
        resolve_mime_type("scan.pdf", Some("image/tiff")),
        "image/tiff"
    );
}

#[test]
fn given_no_reported_type_when_resolving_then_guesses_from_extension() {
    assert_eq!(resolve_mime_type("a/b/doc1.pdf", None), "application/pdf");
    assert_eq!(resolve_mime_type("photo.PNG", Some("  ")), "image/png");
}

#[test]
fn given_unknown_extension_when_resolving_then_falls_back_to_octet_stream() {
    assert_eq!(
        resolve_mime_type("blob.unknownext", None),
        "application/octet-stream"
    );
    assert_eq!(resolve_mime_type("README", None), "application/octet-stream");
}

#[tokio::test]
async fn given_local_file_when_downloading_then_info_and_bytes_match() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("inbox")).unwrap();
    std::fs::write(dir.path().join("inbox/doc1.pdf"), b"%PDF-1.7").unwrap();
    let downloader = DownloaderFactory::create(&local_settings(dir.path())).unwrap();
    let ctx = RequestContext::new();
    let key = ObjectKey::new("inbox/doc1.pdf");

    let info = downloader.get_info(&ctx, &key).await.unwrap();
    let file = downloader.get_file(&ctx, &key).await.unwrap();

    assert_eq!(info.mime_type, "application/pdf");
    assert_eq!(&file.bytes[..], b"%PDF-1.7");
}

#[tokio::test]
async fn given_missing_local_file_when_getting_info_then_returns_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let downloader = ObjectStoreDownloader::local(dir.path().to_path_buf()).unwrap();
    let ctx = RequestContext::new();

    let error = downloader
        .get_info(&ctx, &ObjectKey::new("nope.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(error, DownloaderError::NotFound(_)));
    assert_eq!(error.kind(), ErrorKind::UpstreamRejected);
}

#[tokio::test]
async fn given_stored_content_type_when_getting_info_then_uses_it() {
    let store = Arc::new(InMemory::new());
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, "image/jpeg".into());
    store
        .put_opts(
            &StorePath::from("scans/page-1"),
            PutPayload::from_static(b"\xff\xd8\xff"),
            PutOptions {
                attributes,
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let downloader = ObjectStoreDownloader::new(store);
    let ctx = RequestContext::new();

    let info = downloader
        .get_info(&ctx, &ObjectKey::new("scans/page-1"))
        .await
        .unwrap();

    assert_eq!(info.mime_type, "image/jpeg");
}

#[tokio::test]
async fn given_cancelled_context_when_downloading_then_returns_interrupted() {
    let store = Arc::new(InMemory::new());
    store
        .put(&StorePath::from("doc.pdf"), PutPayload::from_static(b"%PDF"))
        .await
        .unwrap();
    let downloader = ObjectStoreDownloader::new(store);
    let token = CancellationToken::new();
    token.cancel();
    let ctx = RequestContext::new().with_cancellation(token);

    let error = downloader
        .get_file(&ctx, &ObjectKey::new("doc.pdf"))
        .await
        .unwrap_err();

    assert!(matches!(
        error,
        DownloaderError::Interrupted(Interruption::Cancelled)
    ));
}
