use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use serde_json::{Value, json};
use tower::ServiceExt;

use doc2text::application::bus::MessageBus;
use doc2text::application::queries::{ExtractTextHandler, ExtractTextQuery};
use doc2text::infrastructure::encoding::ChunkedBase64Encoder;
use doc2text::infrastructure::observability::REQUEST_ID_HEADER;
use doc2text::presentation::{
    AppState, AuthGate, DEFAULT_HEALTH_PATH, PROCESS_PATH, create_health_router, create_router,
};

use crate::helpers::{
    DownloaderFailure, GOOD_TOKEN, MockDownloader, MockRecognizer, MockTokenVerifier,
};

struct TestApp {
    downloader: Arc<MockDownloader>,
    recognizer: Arc<MockRecognizer>,
    router: axum::Router,
}

fn app_with(downloader: MockDownloader, gate: AuthGate) -> TestApp {
    let downloader = Arc::new(downloader);
    let recognizer = Arc::new(MockRecognizer::default());

    let mut bus = MessageBus::new();
    bus.register_query::<ExtractTextQuery, _>(Arc::new(ExtractTextHandler::new(
        Arc::clone(&downloader) as _,
        Arc::new(ChunkedBase64Encoder::new()),
        Arc::clone(&recognizer) as _,
    )))
    .unwrap();

    let router = create_router(AppState::new(Arc::new(bus)), Arc::new(gate));

    TestApp {
        downloader,
        recognizer,
        router,
    }
}

fn app(gate: AuthGate) -> TestApp {
    app_with(MockDownloader::new("application/pdf", b"%PDF"), gate)
}

fn enforcing(expected_azp: Option<&str>) -> AuthGate {
    AuthGate::enforcing(
        Arc::new(MockTokenVerifier),
        expected_azp.map(str::to_string),
    )
}

fn process_request(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(PROCESS_PATH)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn given_stored_object_when_processing_then_returns_recognized_text() {
    let app = app(AuthGate::Disabled);

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "doc1.pdf"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = json_body(response).await;
    assert_eq!(body["text"], "DECODED:JVBERg==");
}

#[tokio::test]
async fn given_padded_object_key_when_processing_then_key_is_trimmed() {
    let app = app(AuthGate::Disabled);

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "  doc1.pdf \n"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.downloader.info_calls(), 1);
}

#[tokio::test]
async fn given_blank_object_key_when_processing_then_invalid_argument_without_download() {
    let app = app(AuthGate::Disabled);

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "   "}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_malformed_json_body_when_processing_then_invalid_argument_json() {
    let app = app(AuthGate::Disabled);
    let request = Request::builder()
        .method("POST")
        .uri(PROCESS_PATH)
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert!(!body["message"].as_str().unwrap().is_empty());
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_body_without_json_content_type_when_processing_then_invalid_argument_json() {
    let app = app(AuthGate::Disabled);
    let request = Request::builder()
        .method("POST")
        .uri(PROCESS_PATH)
        .header("content-type", "text/plain")
        .body(Body::from(r#"{"objectkey": "a.pdf"}"#))
        .unwrap();

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INVALID_ARGUMENT");
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_missing_object_key_field_when_processing_then_invalid_argument() {
    let app = app(AuthGate::Disabled);

    let response = app
        .router
        .oneshot(process_request(json!({}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_unknown_object_when_processing_then_unavailable_with_object_key() {
    let app = app_with(
        MockDownloader::failing(DownloaderFailure::InfoNotFound),
        AuthGate::Disabled,
    );

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "gone.pdf"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAVAILABLE");
    assert!(body["message"].as_str().unwrap().contains("gone.pdf"));
    assert_eq!(app.recognizer.calls(), 0);
}

#[tokio::test]
async fn given_storage_outage_when_processing_then_unavailable() {
    let app = app_with(
        MockDownloader::failing(DownloaderFailure::FileUnavailable),
        AuthGate::Disabled,
    );

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "doc1.pdf"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn given_bus_without_handler_when_processing_then_internal_error() {
    let router = create_router(
        AppState::new(Arc::new(MessageBus::new())),
        Arc::new(AuthGate::Disabled),
    );

    let response = router
        .oneshot(process_request(json!({"objectkey": "doc1.pdf"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["code"], "INTERNAL");
}

#[tokio::test]
async fn given_enforcing_gate_and_no_token_when_processing_then_unauthenticated() {
    let app = app(enforcing(None));

    let response = app
        .router
        .oneshot(process_request(json!({"objectkey": "doc1.pdf"}), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let body = json_body(response).await;
    assert_eq!(body["code"], "UNAUTHENTICATED");
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_enforcing_gate_and_forged_token_when_processing_then_unauthenticated() {
    let app = app(enforcing(None));

    let response = app
        .router
        .oneshot(process_request(
            json!({"objectkey": "doc1.pdf"}),
            Some("forged"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn given_token_for_other_client_when_processing_then_permission_denied() {
    let app = app(enforcing(Some("mobile-app")));

    let response = app
        .router
        .oneshot(process_request(
            json!({"objectkey": "doc1.pdf"}),
            Some(GOOD_TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["code"], "PERMISSION_DENIED");
    assert_eq!(body["message"], "invalid azp");
    assert_eq!(app.downloader.info_calls(), 0);
}

#[tokio::test]
async fn given_valid_token_when_processing_then_claims_reach_the_pipeline() {
    let app = app(enforcing(Some("web-app")));

    let response = app
        .router
        .oneshot(process_request(
            json!({"objectkey": "doc1.pdf"}),
            Some(GOOD_TOKEN),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        app.recognizer.last_subject.lock().unwrap().as_deref(),
        Some("user-1")
    );
}

#[tokio::test]
async fn given_caller_request_id_when_processing_then_it_is_echoed() {
    let app = app(AuthGate::Disabled);
    let mut request = process_request(json!({"objectkey": "doc1.pdf"}), None);
    request
        .headers_mut()
        .insert(REQUEST_ID_HEADER, "trace-abc".parse().unwrap());

    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-abc");
}

#[tokio::test]
async fn given_health_router_when_requested_then_returns_ok() {
    let router = create_health_router(DEFAULT_HEALTH_PATH);

    let response = router
        .oneshot(
            Request::builder()
                .uri(DEFAULT_HEALTH_PATH)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn given_health_path_without_slash_when_requested_then_path_is_normalized() {
    let router = create_health_router("live");

    let response = router
        .oneshot(Request::builder().uri("/live").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_rpc_router_when_requesting_health_path_then_not_found() {
    let app = app(AuthGate::Disabled);

    let response = app
        .router
        .oneshot(
            Request::builder()
                .uri(DEFAULT_HEALTH_PATH)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
