//! JSON messages pushed to stream viewers.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::{Frame, PathPoint, Route};
use crate::window::WindowStore;

/// Every message carries a `type` tag: `snapshot`, `routes` or `ping`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamMessage {
    /// The whole retained window, oldest frame first.
    Snapshot { frames: Vec<Frame> },
    /// Full route set, sent once per connection in routes mode.
    Routes {
        timestamp: i64,
        routes: Vec<RouteSummary>,
    },
    Ping,
}

/// Wire shape of one generated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSummary {
    pub icao: String,
    pub callsign: String,
    pub origin: String,
    pub destination: String,
    pub path: Vec<PathPoint>,
    pub duration: i64,
}

impl From<&Route> for RouteSummary {
    fn from(route: &Route) -> Self {
        Self {
            icao: route.id.clone(),
            callsign: route.callsign.clone(),
            origin: route.origin.name.clone(),
            destination: route.destination.name.clone(),
            path: route.path_points.clone(),
            duration: route.duration,
        }
    }
}

impl StreamMessage {
    pub fn snapshot(window: &WindowStore) -> Self {
        StreamMessage::Snapshot {
            frames: window.snapshot(),
        }
    }

    pub fn routes(routes: &[Route], timestamp: i64) -> Self {
        StreamMessage::Routes {
            timestamp,
            routes: routes.iter().map(RouteSummary::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
