//! Shared library surface for the feed server and its tests.

pub mod api;
pub mod config;
pub mod loops;
pub mod state;
