//! HTTP and WebSocket surface of the feed server.

mod routes;
pub mod ws;

pub use routes::create_router as routes;
