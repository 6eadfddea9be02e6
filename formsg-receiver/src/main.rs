//! FormSG receiver web server.
//!
//! This binary:
//! - Receives encrypted submission webhooks on `/submissions`
//! - Verifies the `X-FormSG-Signature` header
//! - Decrypts submissions and attachments and writes them to the output directory

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use formsg::web::router;
use formsg::{
    AppState, AttachmentDownloader, Config, Decryptor, FormKeys, OutputStore, SignatureVerifier,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("web_server_starting");

    // Load configuration
    let config = Config::from_env();
    let keys = FormKeys::from_config(&config).context("Invalid key configuration")?;
    let post_uri = config.post_uri().context("Missing post URI")?.to_string();

    let decryptor = Decryptor::new(keys.recipient);
    info!(
        port = config.port,
        post_uri = %post_uri,
        output_dir = %config.output_dir,
        has_attachments = config.has_attachments,
        serve_output = config.serve_output,
        recipient_public_key = %decryptor.recipient_public_key(),
        "config_loaded"
    );

    let verifier = SignatureVerifier::new(post_uri, keys.signing_public_key)
        .with_max_age_ms(config.signature_max_age_ms);

    // Create the output directory
    let store = OutputStore::new(&config.output_dir);
    store
        .ensure_dir()
        .await
        .context("Failed to create output directory")?;

    // Create a shared HTTP client for attachment downloads
    let client = Client::builder()
        .pool_max_idle_per_host(16)
        .build()
        .context("Failed to create HTTP client")?;
    let downloader =
        AttachmentDownloader::new(client, Duration::from_millis(config.request_timeout_ms));

    // Create application state
    let state = AppState::new(
        verifier,
        decryptor,
        downloader,
        store,
        config.has_attachments,
    );

    let serve_dir = config
        .serve_output
        .then(|| PathBuf::from(&config.output_dir));
    let app = router(state, serve_dir);

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "web_server_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("web_server_shutdown_complete");

    Ok(())
}

/// Create a future that completes when a shutdown signal is received.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }

    info!("web_server_shutting_down");
}
