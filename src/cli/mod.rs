//! CLI module for the QuoteSim server.
//!
//! Wires configuration, the quote pool and the HTTP routes together and
//! runs the server until a shutdown signal arrives.

pub mod banner;
mod config;
mod handlers;
mod state;

pub use config::{
    Config, ConfigError, LoggingConfig, QuotesConfig, ServerConfig, SpeedConfig, ENV_HOST,
    ENV_PORT, ENV_VERBOSE,
};
pub use handlers::AppError;
pub use state::AppState;

use crate::quotes::{QuoteError, QuotePool, WordListSource};
use axum::{
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use tokio::{
    net::{lookup_host, TcpListener},
    signal,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Load the quote pool described by the configuration
pub fn load_quotes(config: &Config) -> Result<QuotePool, QuoteError> {
    let mut source = match config.quotes.seed {
        Some(seed) => WordListSource::seeded(seed),
        None => WordListSource::new(),
    };
    QuotePool::load(&mut source)
}

/// Build the router for the given state
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/chat/completions", post(handlers::chat_completions))
        .route("/chat/completions", post(handlers::chat_completions))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Run the QuoteSim server with the given configuration
pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    run_server_with_banner(config, true).await
}

/// Run the server, optionally printing the startup banner
pub async fn run_server_with_banner(
    config: Config,
    show_banner: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = resolve_addr(&config.server).await?;

    tracing::info!("Loading quote pools...");
    let quotes = load_quotes(&config)?;
    tracing::info!(
        per_theme = quotes.samples_per_theme(),
        themes = quotes.themes().count(),
        "Quote pools loaded"
    );

    let state = Arc::new(AppState::new(config, quotes));
    for (label, profile) in state.speeds.entries() {
        tracing::debug!(
            speed = %label,
            initial_ms = profile.initial_delay.as_millis() as u64,
            inter_chunk_ms = profile.inter_chunk_delay.as_millis() as u64,
            "Speed profile"
        );
    }

    let listener = TcpListener::bind(addr).await?;
    let local = listener.local_addr()?;
    tracing::info!("Starting QuoteSim server on {}", local);

    if show_banner {
        let base_url = format!("http://{}", local);
        println!("{}", banner::render(&base_url, local.port()));
    }

    serve(listener, state).await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn resolve_addr(server: &ServerConfig) -> Result<SocketAddr, ConfigError> {
    if let Ok(ip) = server.host.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, server.port));
    }

    lookup_host((server.host.as_str(), server.port))
        .await
        .map_err(|e| ConfigError::Validation(format!("cannot resolve '{}': {}", server.host, e)))?
        .next()
        .ok_or_else(|| ConfigError::Validation(format!("no address for '{}'", server.host)))
}

/// Serve on an already bound listener until SIGINT/SIGTERM
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serve until `trigger` resolves.
///
/// In-flight streams are cancelled when the signal fires.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    trigger: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let shutdown = state.shutdown.clone();
    let app = router(state);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            trigger.await;
            shutdown.cancel();
        })
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
}
