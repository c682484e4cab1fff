//! Shared fixtures for server integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use skyfeed_core::{
    BoundingBox, FeedError, FlightFeed, FlightRecord, FlightSimulator, RouteGenerator,
};
use skyfeed_server::config::{Config, FeedMode};

/// Feed that replays a fixed list of outcomes, then reports unavailable.
#[derive(Clone, Default)]
pub struct ScriptedFeed {
    script: Arc<Mutex<VecDeque<Result<Vec<FlightRecord>, FeedError>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedFeed {
    pub fn new(script: Vec<Result<Vec<FlightRecord>, FeedError>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FlightFeed for ScriptedFeed {
    fn fetch(
        &self,
        _bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, FeedError>> + Send {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(FeedError::Unavailable("script exhausted".into())));
        async move { next }
    }
}

pub fn record(icao: &str, lat: f64, lon: f64) -> FlightRecord {
    FlightRecord {
        icao: icao.to_string(),
        callsign: format!("TST{}", &icao[..3]),
        lat,
        lon,
        track: 90.0,
        altitude: 10_000.0,
        speed: 240.0,
    }
}

pub fn test_config(mode: FeedMode) -> Config {
    Config {
        mode,
        seed: Some(7),
        window_secs: 10,
        ..Config::default()
    }
}

pub fn simulator(config: &Config) -> FlightSimulator {
    let generator = RouteGenerator::new(config.bbox, config.waypoint_density, config.rng_seed())
        .expect("route generator");
    FlightSimulator::from_generator(generator, config.simulator_config()).expect("simulator")
}
