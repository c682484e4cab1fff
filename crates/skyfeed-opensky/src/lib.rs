//! SkyFeed OpenSky - live feed adapter for the OpenSky Network REST API
//!
//! Pulls state vectors for a bounding box and normalizes them into
//! `FlightRecord`s.

pub mod client;
pub mod state_vector;

pub use client::{OpenSkyClient, DEFAULT_BASE_URL};
pub use state_vector::{normalize_states, normalize_row, StatesResponse};
