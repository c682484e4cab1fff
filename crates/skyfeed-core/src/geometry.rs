//! Planar curve math on (lat, lon) pairs.
//!
//! Positions are treated as flat degrees; the feed only needs plausible
//! shapes, not geodesics. `haversine_distance` is used where real
//! distances matter (route durations).

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Point on a quadratic Bezier curve at parameter `t`.
///
/// `B(t) = (1-t)^2 P0 + 2(1-t)t P1 + t^2 P2`, applied to each axis.
pub fn bezier_point(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64), t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let a = u * u;
    let b = 2.0 * u * t;
    let c = t * t;
    (
        a * p0.0 + b * p1.0 + c * p2.0,
        a * p0.1 + b * p1.1 + c * p2.1,
    )
}

/// Heading in degrees from point 1 to point 2 (0 = north, clockwise).
pub fn calculate_heading(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dx = lon2 - lon1;
    let dy = lat2 - lat1;
    normalize_track(dx.atan2(dy).to_degrees())
}

/// Wrap an angle into [0, 360).
pub fn normalize_track(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Euclidean distance in degrees.
pub fn distance_deg(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

pub fn lerp(a: (f64, f64), b: (f64, f64), t: f64) -> (f64, f64) {
    (a.0 + (b.0 - a.0) * t, a.1 + (b.1 - a.1) * t)
}

/// Point at fraction `along` of the segment `from -> to`, pushed sideways
/// by `offset` (a signed fraction of the segment length).
///
/// Positive offsets fall to the left of the direction of travel.
pub fn perpendicular_offset(from: (f64, f64), to: (f64, f64), along: f64, offset: f64) -> (f64, f64) {
    let (base_lat, base_lon) = lerp(from, to, along);
    let dy = to.0 - from.0;
    let dx = to.1 - from.1;
    let length = dx.hypot(dy);
    if length <= f64::EPSILON {
        return (base_lat, base_lon);
    }

    // (-dy, dx) is the left normal in (lon, lat) space; its length already
    // equals the segment length
    (base_lat + dx * offset, base_lon - dy * offset)
}

/// Calculate distance between two points in meters (Haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// Cubic smoothstep on [0, 1].
pub fn smoothstep(x: f64) -> f64 {
    let x = x.clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}
