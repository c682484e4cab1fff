//! Human-readable rendering of stream messages.

use chrono::{DateTime, Utc};
use skyfeed_core::{FlightRecord, StreamMessage};

fn format_ts(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| ts.to_string())
}

/// One-line summary of a message.
pub fn describe(message: &StreamMessage) -> String {
    match message {
        StreamMessage::Snapshot { frames } => match frames.last() {
            Some(latest) => format!(
                "snapshot: {} frames ({} - {}), {} flights in latest",
                frames.len(),
                format_ts(frames[0].timestamp),
                format_ts(latest.timestamp),
                latest.flights.len()
            ),
            None => "snapshot: empty window".to_string(),
        },
        StreamMessage::Routes { timestamp, routes } => {
            let points: usize = routes.iter().map(|r| r.path.len()).sum();
            format!(
                "routes: {} routes, {} path points @ {}",
                routes.len(),
                points,
                format_ts(*timestamp)
            )
        }
        StreamMessage::Ping => "ping".to_string(),
    }
}

pub fn format_flight(flight: &FlightRecord) -> String {
    format!(
        "{:<8} {:<8} {:>8.3} {:>9.3} {:>5.0}° {:>7.0} m {:>5.0} m/s",
        flight.icao,
        flight.callsign,
        flight.lat,
        flight.lon,
        flight.track,
        flight.altitude,
        flight.speed
    )
}
