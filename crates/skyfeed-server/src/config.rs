//! Server configuration from environment.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use skyfeed_core::{BoundingBox, SimulatorConfig, SkyfeedError};

/// Where frames come from and what viewers receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    /// Relay OpenSky; fall back to synthetic traffic after repeated failures.
    Live,
    /// Synthetic traffic only, rolling snapshots.
    Synthetic,
    /// One-shot generated route set per viewer, then keep-alive pings.
    Routes,
}

impl FeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedMode::Live => "live",
            FeedMode::Synthetic => "synthetic",
            FeedMode::Routes => "routes",
        }
    }
}

impl FromStr for FeedMode {
    type Err = SkyfeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(FeedMode::Live),
            "synthetic" | "demo" => Ok(FeedMode::Synthetic),
            "routes" => Ok(FeedMode::Routes),
            other => Err(SkyfeedError::InvalidConfig(format!("unknown mode {other:?}"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub mode: FeedMode,
    pub bbox: BoundingBox,
    pub poll_interval_secs: u64,
    pub window_secs: u64,
    pub flight_count: usize,
    pub min_flights: usize,
    pub route_count: usize,
    pub waypoint_density: usize,
    pub seed: Option<u64>,
    pub feed_url: String,
    pub feed_timeout_secs: u64,
    pub ping_interval_secs: u64,
    pub fallback_threshold: u32,
    /// Seed the window with one synthetic frame before the first live fetch.
    pub warm_start: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8765,
            mode: FeedMode::Live,
            bbox: BoundingBox::default(),
            poll_interval_secs: 5,
            window_secs: 1800,
            flight_count: 45,
            min_flights: 30,
            route_count: 40,
            waypoint_density: 6,
            seed: None,
            feed_url: skyfeed_opensky::DEFAULT_BASE_URL.to_string(),
            feed_timeout_secs: 30,
            ping_interval_secs: 30,
            fallback_threshold: 3,
            warm_start: false,
        }
    }
}

impl Config {
    /// Read settings from `SKYFEED_*` variables.
    ///
    /// Numeric settings fall back to defaults when unparsable; a bad mode
    /// or bbox is a configuration error.
    pub fn from_env() -> Result<Self, SkyfeedError> {
        let defaults = Self::default();

        let mode = match env::var("SKYFEED_MODE") {
            Ok(raw) => raw.parse()?,
            Err(_) => defaults.mode,
        };

        let bbox = match env::var("SKYFEED_BBOX") {
            Ok(raw) => BoundingBox::parse(&raw)?,
            Err(_) => defaults.bbox,
        };

        Ok(Self {
            server_port: env_or("SKYFEED_PORT", defaults.server_port),
            mode,
            bbox,
            poll_interval_secs: env_or("SKYFEED_POLL_SECS", defaults.poll_interval_secs),
            window_secs: env_or("SKYFEED_WINDOW_SECS", defaults.window_secs),
            flight_count: env_or("SKYFEED_FLIGHT_COUNT", defaults.flight_count),
            min_flights: env_or("SKYFEED_MIN_FLIGHTS", defaults.min_flights),
            route_count: env_or("SKYFEED_ROUTE_COUNT", defaults.route_count),
            waypoint_density: env_or("SKYFEED_WAYPOINT_DENSITY", defaults.waypoint_density),
            seed: env::var("SKYFEED_SEED").ok().and_then(|s| s.parse().ok()),
            feed_url: env::var("SKYFEED_FEED_URL").unwrap_or(defaults.feed_url),
            feed_timeout_secs: env_or("SKYFEED_FEED_TIMEOUT_SECS", defaults.feed_timeout_secs),
            ping_interval_secs: env_or("SKYFEED_PING_SECS", defaults.ping_interval_secs),
            fallback_threshold: env_or("SKYFEED_FALLBACK_THRESHOLD", defaults.fallback_threshold),
            warm_start: env_or("SKYFEED_WARM_START", defaults.warm_start),
        })
    }

    /// Reject settings the producer cannot run with.
    pub fn validate(&self) -> Result<(), SkyfeedError> {
        self.bbox.validate()?;
        if self.poll_interval_secs == 0 {
            return Err(SkyfeedError::InvalidConfig("poll interval must be positive".into()));
        }
        if self.ping_interval_secs == 0 {
            return Err(SkyfeedError::InvalidConfig("ping interval must be positive".into()));
        }
        if self.waypoint_density == 0 {
            return Err(SkyfeedError::InvalidConfig("waypoint density must be positive".into()));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    /// Configured seed, or a fresh random one.
    pub fn rng_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    pub fn simulator_config(&self) -> SimulatorConfig {
        SimulatorConfig {
            target_flights: self.flight_count,
            min_flights: self.min_flights,
            ..SimulatorConfig::default()
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parsing() {
        assert_eq!("LIVE".parse::<FeedMode>().unwrap(), FeedMode::Live);
        assert_eq!("demo".parse::<FeedMode>().unwrap(), FeedMode::Synthetic);
        assert_eq!(" routes ".parse::<FeedMode>().unwrap(), FeedMode::Routes);
        assert!("replay".parse::<FeedMode>().is_err());
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
        assert_eq!(config.simulator_config().target_flights, 45);
        assert!(!config.warm_start);
    }

    #[test]
    fn degenerate_bbox_is_rejected() {
        let config = Config {
            bbox: BoundingBox::new(3.0, 40.0, 3.0, 50.0),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(SkyfeedError::InvalidBoundingBox(_))
        ));
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let config = Config {
            poll_interval_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
