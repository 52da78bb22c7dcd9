mod fetch;
mod routes;

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use overlay::OverlayManager;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::routes::{dispatch, AppState};

/// HTTP gateway between the map frontend and the analysis services.
#[derive(Debug, Parser)]
struct Args {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:9300")]
    addr: SocketAddr,
    /// Base URL of the analysis backend.
    #[arg(long, default_value = "http://127.0.0.1:8000/api")]
    upstream: String,
    /// Scheduler tick interval in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let state = AppState {
        manager: Arc::new(Mutex::new(OverlayManager::new())),
        http: reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("reqwest client"),
        upstream: Arc::from(args.upstream.trim_end_matches('/')),
        started: Instant::now(),
    };

    // Debounce timers live inside the manager; this loop only advances the
    // clock and ships whatever became due.
    let ticker_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(args.tick_ms));
        loop {
            interval.tick().await;
            let now = ticker_state.now();
            let due = {
                let mut manager = ticker_state.manager.lock().expect("manager lock poisoned");
                manager.tick(now)
            };
            if !due.is_empty() {
                dispatch(&ticker_state, due);
            }
        }
    });

    let app = Router::new()
        .route("/healthz", get(routes::healthz))
        .route("/viewport", post(routes::post_viewport))
        .route("/layers/:id/toggle", post(routes::toggle_layer))
        .route("/aoi/begin", post(routes::aoi_begin))
        .route("/aoi/point", post(routes::aoi_point))
        .route("/aoi/commit", post(routes::aoi_commit))
        .route("/aoi/clear", post(routes::aoi_clear))
        .route("/features", get(routes::get_features))
        .route("/click", post(routes::post_click))
        .route("/status", get(routes::get_status))
        .route("/notices", get(routes::drain_notices))
        .route("/params", post(routes::set_params))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("overlay gateway listening on http://{}", args.addr);
    axum::serve(
        tokio::net::TcpListener::bind(args.addr).await.expect("bind"),
        app,
    )
    .await
    .expect("server");
}
