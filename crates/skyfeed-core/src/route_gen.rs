//! Waypoint pool and curved route generation.
//!
//! Waypoints come from a jittered grid laid over the bounding box plus a
//! handful of uniformly scattered points, so routes cover the whole region
//! without looking like a lattice.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};

use crate::error::{Result, SkyfeedError};
use crate::geometry::{
    calculate_heading, distance_deg, haversine_distance, lerp, perpendicular_offset, smoothstep,
};
use crate::models::{BoundingBox, PathPoint, Route, Waypoint};

/// Minimum origin/destination separation as a fraction of bbox width.
pub const MIN_ROUTE_FRACTION: f64 = 0.2;
/// Upper bound on endpoint resampling before giving up.
pub const MAX_SAMPLE_ATTEMPTS: usize = 10_000;

const GRID_JITTER: f64 = 0.4;
const MAX_CONTROL_POINTS: usize = 3;
const CURVE_OFFSET_MIN: f64 = 0.1;
const CURVE_OFFSET_MAX: f64 = 0.3;
const MIN_PATH_POINTS: usize = 50;
const MAX_PATH_POINTS: usize = 100;

const CLIMB_FRACTION: f64 = 0.15;
const CRUISE_JITTER: f64 = 0.05;
const SPEED_RAMP_FRACTION: f64 = 0.1;
const SPEED_FLOOR: f64 = 0.4;

const CRUISE_ALTITUDE_M: std::ops::Range<f64> = 9_000.0..12_000.0;
const CRUISE_SPEED_MPS: std::ops::Range<f64> = 200.0..260.0;

const AIRLINE_CODES: [&str; 10] = ["BA", "AF", "LH", "IB", "AZ", "KL", "FR", "EZY", "RYR", "VLG"];

/// Builds waypoint pools and routes for one bounding box.
pub struct RouteGenerator {
    bbox: BoundingBox,
    waypoints: Vec<Waypoint>,
    rng: StdRng,
}

impl RouteGenerator {
    /// Create a generator and lay out its waypoint pool.
    ///
    /// `waypoint_density` is the number of grid cells per axis.
    pub fn new(bbox: BoundingBox, waypoint_density: usize, seed: u64) -> Result<Self> {
        Self::with_rng(bbox, waypoint_density, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(bbox: BoundingBox, waypoint_density: usize, mut rng: StdRng) -> Result<Self> {
        bbox.validate()?;
        if waypoint_density == 0 {
            return Err(SkyfeedError::InvalidConfig(
                "waypoint density must be at least 1".into(),
            ));
        }
        let waypoints = build_waypoint_pool(&bbox, waypoint_density, &mut rng);
        Ok(Self {
            bbox,
            waypoints,
            rng,
        })
    }

    pub fn bbox(&self) -> &BoundingBox {
        &self.bbox
    }

    pub fn waypoint_pool(&self) -> &[Waypoint] {
        &self.waypoints
    }

    /// Consume the generator, keeping its pool and random source.
    pub fn into_parts(self) -> (BoundingBox, Vec<Waypoint>, StdRng) {
        (self.bbox, self.waypoints, self.rng)
    }

    /// Generate `route_count` routes with unique identifiers.
    pub fn generate(&mut self, route_count: usize) -> Result<Vec<Route>> {
        let mut taken = HashSet::with_capacity(route_count);
        let mut routes = Vec::with_capacity(route_count);
        for _ in 0..route_count {
            let icao = unique_icao(&mut self.rng, |candidate| taken.contains(candidate));
            taken.insert(icao.clone());
            routes.push(self.build_route(icao)?);
        }
        Ok(routes)
    }

    fn build_route(&mut self, icao: String) -> Result<Route> {
        let (origin, destination) =
            sample_endpoints(&mut self.rng, &self.waypoints, min_route_distance(&self.bbox))?;

        let control_points = curve_control_points(&mut self.rng, &origin, &destination);

        let mut nodes = Vec::with_capacity(control_points.len() + 2);
        nodes.push(origin.position());
        nodes.extend(control_points.iter().copied());
        nodes.push(destination.position());

        let length_deg: f64 = nodes.windows(2).map(|w| distance_deg(w[0], w[1])).sum();
        let length_m: f64 = nodes
            .windows(2)
            .map(|w| haversine_distance(w[0].0, w[0].1, w[1].0, w[1].1))
            .sum();

        let cruise_altitude = self.rng.random_range(CRUISE_ALTITUDE_M);
        let cruise_speed = self.rng.random_range(CRUISE_SPEED_MPS);

        let resolution = path_resolution(length_deg, self.bbox.diagonal());
        let path_points = self.sample_path(&nodes, resolution, cruise_altitude, cruise_speed);

        Ok(Route {
            id: icao,
            callsign: random_callsign(&mut self.rng),
            origin,
            destination,
            control_points,
            path_points,
            cruise_altitude,
            cruise_speed,
            duration: ((length_m / cruise_speed).ceil() as i64).max(1),
        })
    }

    fn sample_path(
        &mut self,
        nodes: &[(f64, f64)],
        resolution: usize,
        cruise_altitude: f64,
        cruise_speed: f64,
    ) -> Vec<PathPoint> {
        let positions: Vec<(f64, f64)> = (0..resolution)
            .map(|i| interpolate_polyline(nodes, i as f64 / (resolution - 1) as f64))
            .collect();

        let mut points = Vec::with_capacity(resolution);
        let mut last_track = 0.0;
        for (i, &(lat, lon)) in positions.iter().enumerate() {
            let progress = i as f64 / (resolution - 1) as f64;
            let track = match positions.get(i + 1) {
                Some(&(next_lat, next_lon)) => calculate_heading(lat, lon, next_lat, next_lon),
                None => last_track,
            };
            last_track = track;

            let jitter = 1.0 + self.rng.random_range(-CRUISE_JITTER..=CRUISE_JITTER);
            points.push(PathPoint {
                progress,
                lat,
                lon,
                track,
                altitude: (cruise_altitude * altitude_profile(progress, jitter)).max(0.0),
                speed: (cruise_speed * speed_profile(progress)).max(0.0),
            });
        }
        points
    }
}

/// One-call convenience wrapper: fresh generator, `route_count` routes.
pub fn generate_routes(
    bbox: BoundingBox,
    waypoint_density: usize,
    route_count: usize,
    seed: u64,
) -> Result<Vec<Route>> {
    RouteGenerator::new(bbox, waypoint_density, seed)?.generate(route_count)
}

pub fn min_route_distance(bbox: &BoundingBox) -> f64 {
    bbox.width() * MIN_ROUTE_FRACTION
}

/// Pick two pool waypoints at least `min_distance` degrees apart.
pub fn sample_endpoints<R: Rng + ?Sized>(
    rng: &mut R,
    pool: &[Waypoint],
    min_distance: f64,
) -> Result<(Waypoint, Waypoint)> {
    if pool.len() < 2 {
        return Err(SkyfeedError::InvalidConfig(format!(
            "waypoint pool has {} entries, need at least 2",
            pool.len()
        )));
    }

    for _ in 0..MAX_SAMPLE_ATTEMPTS {
        let (Some(origin), Some(destination)) = (pool.choose(rng), pool.choose(rng)) else {
            break;
        };
        if distance_deg(origin.position(), destination.position()) > min_distance {
            return Ok((origin.clone(), destination.clone()));
        }
    }

    Err(SkyfeedError::RouteSamplingExhausted {
        attempts: MAX_SAMPLE_ATTEMPTS,
    })
}

/// Single control point for a quadratic curve between two waypoints.
pub fn single_control_point<R: Rng + ?Sized>(
    rng: &mut R,
    origin: &Waypoint,
    destination: &Waypoint,
) -> (f64, f64) {
    let offset = signed_curve_offset(rng);
    perpendicular_offset(origin.position(), destination.position(), 0.5, offset)
}

fn curve_control_points<R: Rng + ?Sized>(
    rng: &mut R,
    origin: &Waypoint,
    destination: &Waypoint,
) -> Vec<(f64, f64)> {
    let count = rng.random_range(0..=MAX_CONTROL_POINTS);
    (1..=count)
        .map(|k| {
            let along = k as f64 / (count + 1) as f64;
            let offset = signed_curve_offset(rng);
            perpendicular_offset(origin.position(), destination.position(), along, offset)
        })
        .collect()
}

fn signed_curve_offset<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let magnitude = rng.random_range(CURVE_OFFSET_MIN..CURVE_OFFSET_MAX);
    if rng.random_bool(0.5) {
        -magnitude
    } else {
        magnitude
    }
}

fn build_waypoint_pool<R: Rng + ?Sized>(
    bbox: &BoundingBox,
    density: usize,
    rng: &mut R,
) -> Vec<Waypoint> {
    let cell_w = bbox.width() / density as f64;
    let cell_h = bbox.height() / density as f64;
    let scatter = (density * density / 4).max(1);
    let mut pool = Vec::with_capacity(density * density + scatter);

    for row in 0..density {
        for col in 0..density {
            let lat = bbox.south
                + (row as f64 + 0.5) * cell_h
                + rng.random_range(-GRID_JITTER..=GRID_JITTER) * cell_h;
            let lon = bbox.west
                + (col as f64 + 0.5) * cell_w
                + rng.random_range(-GRID_JITTER..=GRID_JITTER) * cell_w;
            let name = format!("WP{:02}", pool.len());
            pool.push(Waypoint::new(
                name,
                lat.clamp(bbox.south, bbox.north),
                lon.clamp(bbox.west, bbox.east),
            ));
        }
    }

    for _ in 0..scatter {
        let lat = rng.random_range(bbox.south..=bbox.north);
        let lon = rng.random_range(bbox.west..=bbox.east);
        let name = format!("WP{:02}", pool.len());
        pool.push(Waypoint::new(name, lat, lon));
    }

    pool
}

fn path_resolution(length_deg: f64, diagonal: f64) -> usize {
    let ratio = if diagonal > 0.0 {
        (length_deg / diagonal).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let span = (MAX_PATH_POINTS - MIN_PATH_POINTS) as f64;
    (MIN_PATH_POINTS + (span * ratio).round() as usize).clamp(MIN_PATH_POINTS, MAX_PATH_POINTS)
}

/// Position at overall parameter `t` along a polyline whose segments each
/// take an equal share of `t`.
fn interpolate_polyline(nodes: &[(f64, f64)], t: f64) -> (f64, f64) {
    match nodes {
        [] => (0.0, 0.0),
        [only] => *only,
        _ => {
            let segments = nodes.len() - 1;
            let scaled = t.clamp(0.0, 1.0) * segments as f64;
            let index = (scaled.floor() as usize).min(segments - 1);
            lerp(nodes[index], nodes[index + 1], scaled - index as f64)
        }
    }
}

/// Takeoff ramp, jittered cruise plateau, landing ramp. Unitless.
pub fn altitude_profile(progress: f64, cruise_jitter: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    if p < CLIMB_FRACTION {
        p / CLIMB_FRACTION
    } else if p > 1.0 - CLIMB_FRACTION {
        (1.0 - p) / CLIMB_FRACTION
    } else {
        cruise_jitter
    }
}

/// Ease-in/ease-out speed factor, symmetric around the midpoint.
pub fn speed_profile(progress: f64) -> f64 {
    let p = progress.clamp(0.0, 1.0);
    let edge = p.min(1.0 - p);
    if edge >= SPEED_RAMP_FRACTION {
        1.0
    } else {
        SPEED_FLOOR + (1.0 - SPEED_FLOOR) * smoothstep(edge / SPEED_RAMP_FRACTION)
    }
}

/// Random 24-bit hex address not rejected by `taken`.
pub fn unique_icao<R, F>(rng: &mut R, taken: F) -> String
where
    R: Rng + ?Sized,
    F: Fn(&str) -> bool,
{
    loop {
        let candidate = format!("{:06x}", rng.random_range(0..=0x00FF_FFFFu32));
        if !taken(&candidate) {
            return candidate;
        }
    }
}

pub fn random_callsign<R: Rng + ?Sized>(rng: &mut R) -> String {
    let airline = AIRLINE_CODES[rng.random_range(0..AIRLINE_CODES.len())];
    format!("{}{}", airline, rng.random_range(100..=9999))
}
