//! Error taxonomy for the SkyFeed core.

use thiserror::Error;

/// Errors raised by route generation, simulation setup and record handling.
#[derive(Debug, Error)]
pub enum SkyfeedError {
    /// Bounding box is empty, inverted or non-finite on at least one axis.
    #[error("invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Origin/destination sampling could not satisfy the minimum distance.
    #[error("gave up sampling an endpoint pair after {attempts} attempts")]
    RouteSamplingExhausted { attempts: usize },

    /// A live record lacked a usable field; only that record is dropped.
    #[error("malformed record {icao}: {reason}")]
    MalformedRecord { icao: String, reason: String },

    #[error("a producer task is already running")]
    ProducerAlreadyRunning,

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SkyfeedError>;
