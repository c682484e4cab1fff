//! SkyFeed CLI - Command line tools for the flight feed.
//!
//! Binaries:
//! - watch_stream: print a live summary of a server's stream
//! - generate_routes: dump a seeded route set as JSON

pub mod display;

pub use display::{describe, format_flight};
