//! sonarexd - SonarQube metrics exporter.
//!
//! Periodically fetches per-project quality measures from a SonarQube
//! server, caches them, and serves them as Prometheus gauges on `/metrics`.

mod background;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use sonarex_core::catalog::MetricCatalog;
use sonarex_core::client::SonarClient;
use sonarex_core::store::SnapshotStore;

use state::AppState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(name = "sonarexd", about = "SonarQube metrics exporter", version = sonarex_core::VERSION)]
struct Args {
    /// Listen address for the metrics endpoint.
    #[arg(long, default_value = "0.0.0.0:9120", env = "SONAREX_LISTEN")]
    listen: String,

    /// Base URL of the SonarQube server.
    #[arg(long, env = "SONAR_URL")]
    sonar_url: String,

    /// SonarQube user.
    #[arg(long, env = "SONAR_USER")]
    sonar_user: String,

    /// SonarQube password or token.
    #[arg(long, env = "SONAR_PASSWORD")]
    sonar_password: String,

    /// Cache refresh interval in seconds.
    #[arg(long, default_value = "60", env = "SONAREX_INTERVAL")]
    interval: u64,

    /// Quality-API request timeout in seconds.
    #[arg(long, default_value = "10", env = "SONAREX_TIMEOUT")]
    timeout: u64,

    /// Only export projects carrying this tag.
    #[arg(long, default_value = "sonarqube-exporter", env = "SONAREX_FILTER_TAG")]
    filter_tag: String,
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sonarexd=info,sonarex_core=info".parse().unwrap()),
        )
        .init();

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("failed to build tokio runtime")
        .block_on(async_main(args));
}

async fn async_main(args: Args) {
    info!(
        version = sonarex_core::VERSION,
        sonar_url = %args.sonar_url,
        interval_s = args.interval,
        "starting"
    );

    let client = match SonarClient::new(
        &args.sonar_url,
        &args.sonar_user,
        &args.sonar_password,
        Duration::from_secs(args.timeout),
    ) {
        Ok(c) => c,
        Err(e) => {
            error!(error = %e, "failed to build quality-API client");
            process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        store: SnapshotStore::new(),
        client,
        catalog: MetricCatalog::default_set(),
        filter_tag: args.filter_tag,
    });

    let shutdown = CancellationToken::new();

    // Ctrl-C cancels the refresher and drains the server.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("received shutdown signal");
                shutdown.cancel();
            }
        });
    }

    // Bind before starting the refresher; an unusable listen address must
    // fail fast instead of fetching forever for nobody.
    let addr: SocketAddr = args.listen.parse().expect("invalid listen address");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    info!(%addr, "listening");

    {
        let state = state.clone();
        let shutdown = shutdown.clone();
        let interval = Duration::from_secs(args.interval);
        tokio::spawn(async move {
            background::refresh_loop(state, interval, shutdown).await;
        });
    }

    let app = Router::new()
        .route("/metrics", get(handlers::handle_metrics))
        .route("/health", get(handlers::handle_health))
        .with_state(state);

    axum::serve(listener, app)
        .with_graceful_shutdown({
            let shutdown = shutdown.clone();
            async move { shutdown.cancelled().await }
        })
        .await
        .expect("server error");

    info!("shutdown complete");
}
