//! SkyFeed SDK - stream consumer library
//!
//! Connects to a feed server and yields decoded stream messages.

pub mod client;

pub use client::{fetch_health, stream_url, HealthStatus, StreamClient};
pub use skyfeed_core::StreamMessage;
