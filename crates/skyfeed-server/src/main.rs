//! SkyFeed Server - Always-on flight snapshot streaming

use anyhow::Result;
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skyfeed_core::{FallbackPolicy, FlightSimulator, RouteGenerator, StreamMessage};
use skyfeed_opensky::OpenSkyClient;
use skyfeed_server::{
    api,
    config::{Config, FeedMode},
    loops::feed_loop::{run_feed_loop, FeedProducer},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("skyfeed_server=debug".parse()?))
        .init();

    tracing::info!("Starting SkyFeed Server...");

    let config = Config::from_env()?;
    config.validate()?;
    let port = config.server_port;
    tracing::info!(
        "Mode: {} | bbox: {:?} | poll: {}s | window: {}s",
        config.mode.as_str(),
        config.bbox,
        config.poll_interval_secs,
        config.window_secs
    );

    let (state, producer) = match config.mode {
        FeedMode::Routes => {
            let mut generator =
                RouteGenerator::new(config.bbox, config.waypoint_density, config.rng_seed())?;
            let routes = generator.generate(config.route_count)?;
            tracing::info!(
                "Generated {} routes over {} waypoints",
                routes.len(),
                generator.waypoint_pool().len()
            );
            let payload = StreamMessage::routes(&routes, Utc::now().timestamp()).to_json()?;
            (Arc::new(AppState::with_routes(config.clone(), payload)), None)
        }
        FeedMode::Live | FeedMode::Synthetic => {
            let state = Arc::new(AppState::new(config.clone()));
            let handle = spawn_producer(&state, &config)?;
            (state, Some(handle))
        }
    };

    // Build the app
    let app = api::routes()
        .with_state(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state))
        .await?;

    if let Some(handle) = producer {
        if let Err(e) = handle.await {
            tracing::error!("Feed loop ended abnormally: {}", e);
        }
    }

    tracing::info!("SkyFeed Server stopped");
    Ok(())
}

fn spawn_producer(state: &Arc<AppState>, config: &Config) -> Result<JoinHandle<()>> {
    let generator =
        RouteGenerator::new(config.bbox, config.waypoint_density, config.rng_seed())?;
    let simulator = FlightSimulator::from_generator(generator, config.simulator_config())?;
    let shutdown = state.shutdown_receiver();
    let poll = config.poll_interval();

    if config.mode == FeedMode::Live {
        let client = OpenSkyClient::new(&config.feed_url, config.feed_timeout())?;
        let mut producer = FeedProducer::new(
            state.clone(),
            Some(client),
            simulator,
            FallbackPolicy::new(config.fallback_threshold),
        )?;
        if config.warm_start {
            producer.warm_start(Utc::now().timestamp())?;
        }
        Ok(tokio::spawn(run_feed_loop(producer, poll, shutdown)))
    } else {
        let producer = FeedProducer::new(
            state.clone(),
            None::<OpenSkyClient>,
            simulator,
            FallbackPolicy::synthetic_only(),
        )?;
        Ok(tokio::spawn(run_feed_loop(producer, poll, shutdown)))
    }
}

async fn shutdown_signal(state: Arc<AppState>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
    state.shutdown();
}
