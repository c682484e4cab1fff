//! SkyFeed core: synthetic flight motion, route generation, the
//! retained snapshot window and the stream wire protocol.

pub mod error;
pub mod feed;
pub mod geometry;
pub mod models;
pub mod protocol;
pub mod route_gen;
pub mod simulator;
pub mod window;

pub use error::{Result, SkyfeedError};
pub use feed::{FallbackDecision, FallbackPolicy, FeedError, FeedStatus, FlightFeed};
pub use geometry::{bezier_point, calculate_heading, normalize_track};
pub use models::{BoundingBox, FlightRecord, Frame, PathPoint, Route, Waypoint};
pub use protocol::{RouteSummary, StreamMessage};
pub use route_gen::{generate_routes, RouteGenerator};
pub use simulator::{
    ApproachPattern, ChurnEvent, Direction, FlightSimulator, FlightState, Phase, SimulatorConfig,
};
pub use window::WindowStore;
