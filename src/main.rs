use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use doc2text::application::bus::MessageBus;
use doc2text::application::queries::{ExtractTextHandler, ExtractTextQuery};
use doc2text::infrastructure::encoding::ChunkedBase64Encoder;
use doc2text::infrastructure::observability::{TracingConfig, init_tracing};
use doc2text::infrastructure::ocr::RecognizerFactory;
use doc2text::infrastructure::storage::DownloaderFactory;
use doc2text::presentation::{
    AppState, AuthGate, Environment, Settings, create_health_router, create_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env().map_err(anyhow::Error::msg)?;
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&TracingConfig::new(
        environment.as_str(),
        settings.logging.json,
        &settings.logging.level,
    ));

    let downloader =
        DownloaderFactory::create(&settings.storage).context("failed to create downloader")?;
    let encoder = Arc::new(ChunkedBase64Encoder::new());
    let recognizer =
        RecognizerFactory::create(&settings.ocr).context("failed to create recognizer")?;

    let mut bus = MessageBus::new();
    bus.register_query::<ExtractTextQuery, _>(Arc::new(ExtractTextHandler::new(
        downloader, encoder, recognizer,
    )))?;
    let bus = Arc::new(bus);

    let gate = Arc::new(AuthGate::from_settings(&settings.oidc));
    if !gate.is_enforcing() {
        tracing::warn!("OIDC is not configured, requests are served without authentication");
    }

    let state = AppState::new(bus).with_request_timeout(settings.server.request_timeout());
    let router = create_router(state, gate);
    let health_router = create_health_router(&settings.http.health_check_path);

    let rpc_listener = TcpListener::bind(&settings.server.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.server.addr))?;
    let health_listener = TcpListener::bind(&settings.http.addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.http.addr))?;

    tracing::info!(
        rpc_addr = %settings.server.addr,
        health_addr = %settings.http.addr,
        health_path = %settings.http.health_check_path,
        "Listening"
    );

    let shutdown = CancellationToken::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));

    let rpc = axum::serve(rpc_listener, router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    let health = axum::serve(health_listener, health_router)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();

    tokio::try_join!(rpc, health)?;

    tracing::info!("Shut down");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
