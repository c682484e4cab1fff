//! End-to-end WebSocket delivery over a real listener.

mod common;

use std::sync::Arc;
use std::time::Duration;

use skyfeed_core::{FallbackPolicy, RouteGenerator, StreamMessage};
use skyfeed_sdk::StreamClient;
use skyfeed_server::config::{Config, FeedMode};
use skyfeed_server::loops::feed_loop::FeedProducer;
use skyfeed_server::{api, state::AppState};
use tokio::time::timeout;

use common::{record, simulator, test_config, ScriptedFeed};

async fn serve(state: Arc<AppState>) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = api::routes().with_state(state);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn next(client: &mut StreamClient) -> StreamMessage {
    timeout(Duration::from_secs(5), client.next_message())
        .await
        .expect("message in time")
        .expect("stream ok")
        .expect("stream open")
}

#[tokio::test]
async fn viewer_gets_current_snapshot_then_updates() {
    let config = test_config(FeedMode::Live);
    let sim = simulator(&config);
    let state = Arc::new(AppState::new(config));
    let feed = ScriptedFeed::new(vec![
        Ok(vec![record("abc123", 48.1, 11.5)]),
        Ok(vec![record("abc123", 48.2, 11.6), record("def456", 50.0, 8.6)]),
    ]);
    let mut producer =
        FeedProducer::new(state.clone(), Some(feed), sim, FallbackPolicy::default()).unwrap();
    producer.tick(100).await.unwrap();

    let base = serve(state.clone()).await;
    let mut client = StreamClient::connect(&base).await.unwrap();

    match next(&mut client).await {
        StreamMessage::Snapshot { frames } => {
            assert_eq!(frames.len(), 1);
            assert_eq!(frames[0].flights[0].icao, "abc123");
        }
        other => panic!("expected snapshot, got {:?}", other),
    }

    producer.tick(105).await.unwrap();
    match next(&mut client).await {
        StreamMessage::Snapshot { frames } => {
            assert_eq!(frames.len(), 2);
            assert_eq!(frames[1].flights.len(), 2);
        }
        other => panic!("expected snapshot, got {:?}", other),
    }
    assert_eq!(state.viewer_count(), 1);

    client.close().await.unwrap();
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(state.viewer_count(), 0);
}

#[tokio::test]
async fn dropped_viewer_does_not_disturb_others() {
    let config = test_config(FeedMode::Live);
    let sim = simulator(&config);
    let state = Arc::new(AppState::new(config));
    let feed = ScriptedFeed::new(vec![
        Ok(vec![record("abc123", 48.1, 11.5)]),
        Ok(vec![record("abc123", 48.2, 11.6)]),
        Ok(vec![record("abc123", 48.3, 11.7)]),
    ]);
    let mut producer =
        FeedProducer::new(state.clone(), Some(feed), sim, FallbackPolicy::default()).unwrap();
    producer.tick(100).await.unwrap();

    let base = serve(state.clone()).await;
    let mut steady = StreamClient::connect(&base).await.unwrap();
    let mut flaky = StreamClient::connect(&base).await.unwrap();
    let _ = next(&mut steady).await;
    let _ = next(&mut flaky).await;
    assert_eq!(state.viewer_count(), 2);

    // Gone without a close handshake.
    drop(flaky);

    assert!(producer.tick(105).await.is_ok());
    match next(&mut steady).await {
        StreamMessage::Snapshot { frames } => assert_eq!(frames.len(), 2),
        other => panic!("expected snapshot, got {:?}", other),
    }

    timeout(Duration::from_secs(5), async {
        while state.viewer_count() != 1 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("dropped viewer deregistered");

    assert!(producer.tick(110).await.is_ok());
    match next(&mut steady).await {
        StreamMessage::Snapshot { frames } => assert_eq!(frames.len(), 3),
        other => panic!("expected snapshot, got {:?}", other),
    }
}

#[tokio::test]
async fn routes_mode_sends_routes_once_then_pings() {
    let config = Config {
        mode: FeedMode::Routes,
        ping_interval_secs: 1,
        route_count: 5,
        ..test_config(FeedMode::Routes)
    };
    let routes = RouteGenerator::new(config.bbox, config.waypoint_density, 11)
        .unwrap()
        .generate(config.route_count)
        .unwrap();
    let payload = StreamMessage::routes(&routes, 1_700_000_000).to_json().unwrap();
    let state = Arc::new(AppState::with_routes(config, payload));
    let base = serve(state).await;

    let mut client = StreamClient::connect(&base).await.unwrap();
    match next(&mut client).await {
        StreamMessage::Routes { timestamp, routes } => {
            assert_eq!(timestamp, 1_700_000_000);
            assert_eq!(routes.len(), 5);
            assert!(routes.iter().all(|r| (50..=100).contains(&r.path.len())));
        }
        other => panic!("expected routes, got {:?}", other),
    }

    assert_eq!(next(&mut client).await, StreamMessage::Ping);
}

#[tokio::test]
async fn shutdown_closes_viewers() {
    let state = Arc::new(AppState::new(test_config(FeedMode::Synthetic)));
    let base = serve(state.clone()).await;

    let mut client = StreamClient::connect(&base).await.unwrap();
    let _ = next(&mut client).await;

    state.shutdown();
    let closed = timeout(Duration::from_secs(5), client.next_message())
        .await
        .expect("close in time");
    assert!(matches!(closed, Ok(None) | Err(_)));
}
