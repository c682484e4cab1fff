//! Core data models for the flight feed.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SkyfeedError};

/// Geographic region as (west, south, east, north) in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl BoundingBox {
    pub fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Parse `west,south,east,north`.
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<f64> = raw
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|e| SkyfeedError::InvalidBoundingBox(format!("{raw:?}: {e}")))?;

        match parts.as_slice() {
            [west, south, east, north] => Ok(Self::new(*west, *south, *east, *north)),
            _ => Err(SkyfeedError::InvalidBoundingBox(format!(
                "{raw:?}: expected 4 comma separated values, got {}",
                parts.len()
            ))),
        }
    }

    /// Reject boxes that would make sampling degenerate.
    pub fn validate(&self) -> Result<()> {
        let values = [self.west, self.south, self.east, self.north];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SkyfeedError::InvalidBoundingBox(format!(
                "non-finite bound in {self:?}"
            )));
        }
        if self.west >= self.east {
            return Err(SkyfeedError::InvalidBoundingBox(format!(
                "west ({}) must be below east ({})",
                self.west, self.east
            )));
        }
        if self.south >= self.north {
            return Err(SkyfeedError::InvalidBoundingBox(format!(
                "south ({}) must be below north ({})",
                self.south, self.north
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        self.east - self.west
    }

    pub fn height(&self) -> f64 {
        self.north - self.south
    }

    pub fn diagonal(&self) -> f64 {
        self.width().hypot(self.height())
    }

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        lat >= self.south && lat <= self.north && lon >= self.west && lon <= self.east
    }
}

impl Default for BoundingBox {
    /// Western Europe.
    fn default() -> Self {
        Self::new(-5.0, 42.0, 15.0, 55.0)
    }
}

/// A fixed point in the waypoint pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.lat, self.lon)
    }
}

/// One precomputed sample along a generated route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub progress: f64,
    pub lat: f64,
    pub lon: f64,
    pub track: f64,
    #[serde(rename = "alt")]
    pub altitude: f64,
    pub speed: f64,
}

/// A generated origin/destination route with its sampled path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    /// ICAO-style identifier of the aircraft flying this route.
    pub id: String,
    pub callsign: String,
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub control_points: Vec<(f64, f64)>,
    pub path_points: Vec<PathPoint>,
    pub cruise_altitude: f64,
    pub cruise_speed: f64,
    /// Seconds needed to fly the path at cruise speed.
    pub duration: i64,
}

/// Public projection of a flight, as stored in frames and sent on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub icao: String,
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    pub track: f64,
    #[serde(rename = "alt")]
    pub altitude: f64,
    pub speed: f64,
}

/// All flight records captured at one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "ts")]
    pub timestamp: i64,
    pub flights: Vec<FlightRecord>,
}

impl Frame {
    pub fn new(timestamp: i64, flights: Vec<FlightRecord>) -> Self {
        Self { timestamp, flights }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bbox_from_env_string() {
        let bbox = BoundingBox::parse("-5.0, 42.0,15,55").unwrap();
        assert_eq!(bbox, BoundingBox::new(-5.0, 42.0, 15.0, 55.0));
        assert!(bbox.validate().is_ok());
    }

    #[test]
    fn parse_bbox_rejects_wrong_arity() {
        assert!(matches!(
            BoundingBox::parse("1,2,3"),
            Err(SkyfeedError::InvalidBoundingBox(_))
        ));
        assert!(BoundingBox::parse("a,b,c,d").is_err());
    }

    #[test]
    fn validate_rejects_degenerate_axes() {
        assert!(BoundingBox::new(5.0, 40.0, 5.0, 50.0).validate().is_err());
        assert!(BoundingBox::new(0.0, 40.0, 10.0, 40.0).validate().is_err());
        assert!(BoundingBox::new(0.0, f64::NAN, 10.0, 40.0).validate().is_err());
    }

    #[test]
    fn flight_record_uses_wire_names() {
        let record = FlightRecord {
            icao: "4ca1fa".into(),
            callsign: "EZY1234".into(),
            lat: 50.0,
            lon: 4.0,
            track: 90.0,
            altitude: 10_000.0,
            speed: 240.0,
        };
        let frame = Frame::new(42, vec![record]);
        let value = serde_json::to_value(&frame).unwrap();
        assert_eq!(value["ts"], 42);
        assert_eq!(value["flights"][0]["alt"], 10_000.0);
        assert!(value["flights"][0].get("altitude").is_none());
    }
}
