//! OpenSky state vectors and their normalization.
//!
//! OpenSky sends every aircraft as a positional JSON array rather than an
//! object. Column layout, from the OpenSky REST documentation:
//!
//! | idx | field           | idx | field          |
//! |-----|-----------------|-----|----------------|
//! | 0   | icao24          | 9   | velocity       |
//! | 1   | callsign        | 10  | true_track     |
//! | 2   | origin_country  | 11  | vertical_rate  |
//! | 3   | time_position   | 12  | sensors        |
//! | 4   | last_contact    | 13  | geo_altitude   |
//! | 5   | longitude       | 14  | squawk         |
//! | 6   | latitude        | 15  | spi            |
//! | 7   | baro_altitude   | 16  | position_source|
//! | 8   | on_ground       |     |                |

use serde::Deserialize;
use serde_json::Value;
use skyfeed_core::{FlightRecord, SkyfeedError};

const ICAO24: usize = 0;
const CALLSIGN: usize = 1;
const LONGITUDE: usize = 5;
const LATITUDE: usize = 6;
const BARO_ALTITUDE: usize = 7;
const VELOCITY: usize = 9;
const TRUE_TRACK: usize = 10;

/// Body of `GET /states/all`.
#[derive(Debug, Deserialize)]
pub struct StatesResponse {
    #[serde(default)]
    pub time: Option<i64>,
    /// `null` when no aircraft are in the box.
    #[serde(default)]
    pub states: Option<Vec<Vec<Value>>>,
}

/// Normalize one state vector row.
///
/// Rows without an address or a numeric position are rejected; optional
/// fields fall back to zero, and a blank callsign falls back to the address.
pub fn normalize_row(row: &[Value]) -> Result<FlightRecord, SkyfeedError> {
    let icao = row
        .get(ICAO24)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| SkyfeedError::MalformedRecord {
            icao: "<unknown>".to_string(),
            reason: "missing icao24".to_string(),
        })?
        .to_string();

    let lat = number_at(row, LATITUDE).ok_or_else(|| malformed(&icao, "missing latitude"))?;
    let lon = number_at(row, LONGITUDE).ok_or_else(|| malformed(&icao, "missing longitude"))?;
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(malformed(&icao, "position out of range"));
    }

    let callsign = row
        .get(CALLSIGN)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| icao.clone());

    Ok(FlightRecord {
        callsign,
        lat,
        lon,
        track: number_at(row, TRUE_TRACK).unwrap_or(0.0),
        altitude: number_at(row, BARO_ALTITUDE).unwrap_or(0.0),
        speed: number_at(row, VELOCITY).unwrap_or(0.0),
        icao,
    })
}

/// Normalize a whole response, dropping rows that fail.
///
/// Returns the kept records and how many rows were dropped.
pub fn normalize_states(response: &StatesResponse) -> (Vec<FlightRecord>, usize) {
    let Some(states) = response.states.as_ref() else {
        return (Vec::new(), 0);
    };

    let mut records = Vec::with_capacity(states.len());
    let mut dropped = 0;
    for row in states {
        match normalize_row(row) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::debug!("Dropping aircraft row: {}", e);
                dropped += 1;
            }
        }
    }
    (records, dropped)
}

fn number_at(row: &[Value], index: usize) -> Option<f64> {
    row.get(index)
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
}

fn malformed(icao: &str, reason: &str) -> SkyfeedError {
    SkyfeedError::MalformedRecord {
        icao: icao.to_string(),
        reason: reason.to_string(),
    }
}
