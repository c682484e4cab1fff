//! Synthetic traffic: a registry of flights shuttling between waypoints.
//!
//! Each flight flies a quadratic Bezier leg in `Cruise`, circles its
//! endpoint for one to three loops in `Approach`, then turns around and
//! flies the same curve back. A small churn step adds and removes flights
//! so density stays roughly stationary over long runs.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SkyfeedError};
use crate::geometry::{bezier_point, calculate_heading, normalize_track};
use crate::models::{BoundingBox, FlightRecord, Frame, Waypoint};
use crate::route_gen::{
    min_route_distance, random_callsign, sample_endpoints, single_control_point, unique_icao,
    RouteGenerator,
};

/// Leg parameter beyond which a cruising flight starts its approach.
pub const APPROACH_THRESHOLD: f64 = 0.85;
/// Step used for the finite-difference heading along the curve.
pub const HEADING_EPSILON: f64 = 0.01;

const CLIMB_BAND: f64 = 0.2;
const APPROACH_ALTITUDE_M: f64 = 3_000.0;
const APPROACH_SPEED_MPS: f64 = 150.0;
const LOITER_RADIUS_DEG: std::ops::Range<f64> = 0.05..0.1;
const FRESH_ALTITUDE_M: f64 = 100.0;
const FRESH_SPEED_MPS: f64 = 50.0;
const CRUISE_ALTITUDE_M: std::ops::Range<f64> = 9_000.0..11_000.0;
const CRUISE_SPEED_MPS: std::ops::Range<f64> = 220.0..260.0;
const POPULATION_SPREAD: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Cruise,
    Approach,
}

/// Which way along its route a flight is travelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Origin to destination (+1).
    Outbound,
    /// Destination back to origin (-1).
    Inbound,
}

impl Direction {
    pub fn sign(self) -> f64 {
        match self {
            Direction::Outbound => 1.0,
            Direction::Inbound => -1.0,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Direction::Outbound => Direction::Inbound,
            Direction::Inbound => Direction::Outbound,
        }
    }
}

/// Circular holding pattern flown near a route endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApproachPattern {
    pub loops: u32,
    pub current_loop: u32,
    pub center: (f64, f64),
    /// Degrees.
    pub radius: f64,
    /// Degrees.
    pub start_angle: f64,
    /// Fraction of the current loop flown, in [0, 1).
    pub loiter_progress: f64,
}

impl ApproachPattern {
    pub fn new(loops: u32, center: (f64, f64), radius: f64, start_angle: f64) -> Self {
        Self {
            loops,
            current_loop: 0,
            center,
            radius,
            start_angle,
            loiter_progress: 0.0,
        }
    }

    fn random<R: Rng + ?Sized>(rng: &mut R, center: (f64, f64)) -> Self {
        Self::new(
            rng.random_range(1..=3),
            center,
            rng.random_range(LOITER_RADIUS_DEG),
            rng.random_range(0.0..360.0),
        )
    }

    /// Advance by `step` loops. Returns true once all loops are flown.
    pub fn advance(&mut self, step: f64) -> bool {
        self.loiter_progress += step.max(0.0);
        while self.loiter_progress >= 1.0 {
            self.loiter_progress -= 1.0;
            self.current_loop += 1;
            if self.current_loop >= self.loops {
                return true;
            }
        }
        false
    }

    /// Fraction of the whole pattern flown, in [0, 1].
    pub fn completion(&self) -> f64 {
        if self.loops == 0 {
            return 1.0;
        }
        ((self.current_loop as f64 + self.loiter_progress) / self.loops as f64).clamp(0.0, 1.0)
    }

    /// Current angle around the circle in degrees (unwrapped).
    pub fn angle(&self) -> f64 {
        self.start_angle + (self.loiter_progress + self.current_loop as f64) * 360.0
    }
}

/// Mutable state of one synthetic flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightState {
    pub icao: String,
    pub callsign: String,
    pub lat: f64,
    pub lon: f64,
    pub track: f64,
    pub altitude: f64,
    pub speed: f64,
    pub origin: Waypoint,
    pub destination: Waypoint,
    pub control_point: (f64, f64),
    /// 0 at origin, 1 at destination, regardless of direction.
    pub progress: f64,
    pub direction: Direction,
    pub phase: Phase,
    pub approach: Option<ApproachPattern>,
    pub last_update: i64,
    /// Seconds for one leg at unit speed multiplier.
    pub flight_duration: f64,
    pub cruise_altitude: f64,
    pub cruise_speed: f64,
}

impl FlightState {
    /// A flight parked at its origin, outbound, about to take off.
    pub fn new(
        icao: impl Into<String>,
        callsign: impl Into<String>,
        origin: Waypoint,
        destination: Waypoint,
        control_point: (f64, f64),
        flight_duration: f64,
        now: i64,
    ) -> Self {
        let track = calculate_heading(origin.lat, origin.lon, control_point.0, control_point.1);
        Self {
            icao: icao.into(),
            callsign: callsign.into(),
            lat: origin.lat,
            lon: origin.lon,
            track,
            altitude: FRESH_ALTITUDE_M,
            speed: FRESH_SPEED_MPS,
            origin,
            destination,
            control_point,
            progress: 0.0,
            direction: Direction::Outbound,
            phase: Phase::Cruise,
            approach: None,
            last_update: now,
            flight_duration,
            cruise_altitude: 10_000.0,
            cruise_speed: 250.0,
        }
    }

    /// Progress along the current leg in the direction of travel.
    pub fn leg_progress(&self) -> f64 {
        match self.direction {
            Direction::Outbound => self.progress,
            Direction::Inbound => 1.0 - self.progress,
        }
    }

    fn leg_endpoints(&self) -> ((f64, f64), (f64, f64)) {
        match self.direction {
            Direction::Outbound => (self.origin.position(), self.destination.position()),
            Direction::Inbound => (self.destination.position(), self.origin.position()),
        }
    }

    pub fn record(&self) -> FlightRecord {
        FlightRecord {
            icao: self.icao.clone(),
            callsign: self.callsign.clone(),
            lat: self.lat,
            lon: self.lon,
            track: self.track,
            altitude: self.altitude,
            speed: self.speed,
        }
    }

    fn step<R: Rng + ?Sized>(&mut self, now: i64, config: &SimulatorConfig, rng: &mut R) {
        let dt = (now - self.last_update).max(0) as f64;

        match self.phase {
            Phase::Cruise => {
                if self.flight_duration > 0.0 {
                    let delta =
                        dt / self.flight_duration * self.direction.sign() * config.speed_multiplier;
                    self.progress = (self.progress + delta).clamp(0.0, 1.0);
                }

                if self.leg_progress() > APPROACH_THRESHOLD {
                    self.enter_approach(rng);
                    self.place_on_loiter();
                } else {
                    self.place_on_curve(now, config, rng);
                }
            }
            Phase::Approach => {
                let finished = match self.approach.as_mut() {
                    Some(pattern) => pattern.advance(config.loiter_rate * dt),
                    None => true,
                };

                if finished {
                    self.finish_approach();
                    self.place_on_curve(now, config, rng);
                } else {
                    self.place_on_loiter();
                }
            }
        }

        self.last_update = now;
    }

    fn enter_approach<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let center = match self.direction {
            Direction::Outbound => self.destination.position(),
            Direction::Inbound => self.origin.position(),
        };
        self.phase = Phase::Approach;
        self.approach = Some(ApproachPattern::random(rng, center));
    }

    fn finish_approach(&mut self) {
        self.progress = match self.direction {
            Direction::Outbound => 1.0,
            Direction::Inbound => 0.0,
        };
        self.direction = self.direction.reversed();
        self.phase = Phase::Cruise;
        self.approach = None;
    }

    fn place_on_loiter(&mut self) {
        let Some(pattern) = self.approach.as_ref() else {
            return;
        };

        let angle = pattern.angle();
        let rad = angle.to_radians();
        self.lat = pattern.center.0 + rad.sin() * pattern.radius;
        self.lon = pattern.center.1 + rad.cos() * pattern.radius;
        self.track = normalize_track(angle + 90.0);

        let flown = pattern.completion();
        let factor = match self.direction {
            // arriving: descend through the pattern
            Direction::Outbound => 1.0 - flown,
            Direction::Inbound => flown,
        };
        self.altitude = APPROACH_ALTITUDE_M * factor;
        self.speed = APPROACH_SPEED_MPS * factor;
    }

    fn place_on_curve<R: Rng + ?Sized>(&mut self, now: i64, config: &SimulatorConfig, rng: &mut R) {
        let (from, to) = self.leg_endpoints();
        let s = self.leg_progress();

        let (lat, lon) = bezier_point(from, self.control_point, to, s);
        let before = bezier_point(from, self.control_point, to, (s - HEADING_EPSILON).max(0.0));
        let after = bezier_point(from, self.control_point, to, (s + HEADING_EPSILON).min(1.0));
        self.track = calculate_heading(before.0, before.1, after.0, after.1);

        self.lat = lat;
        self.lon = lon;
        if config.wobble_deg > 0.0 {
            let t = now as f64;
            self.lat += rng.random_range(-config.wobble_deg..config.wobble_deg) * (t / 1000.0).sin();
            self.lon += rng.random_range(-config.wobble_deg..config.wobble_deg) * (t / 1200.0).sin();
        }

        let profile = cruise_profile(s);
        self.altitude = self.cruise_altitude * profile;
        self.speed = self.cruise_speed * profile;
    }
}

/// Climb over the first band, level cruise, descend over the last band.
pub fn cruise_profile(leg_progress: f64) -> f64 {
    let s = leg_progress.clamp(0.0, 1.0);
    if s < CLIMB_BAND {
        s / CLIMB_BAND
    } else if s > 1.0 - CLIMB_BAND {
        (1.0 - s) / CLIMB_BAND
    } else {
        1.0
    }
}

/// Tunables for the synthetic traffic pattern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Flights spawned on first population (spread by +/- 5).
    pub target_flights: usize,
    /// Churn never removes flights at or below this count.
    pub min_flights: usize,
    pub flight_duration_secs: f64,
    pub speed_multiplier: f64,
    /// Loops flown per second while in approach.
    pub loiter_rate: f64,
    /// Chance per tick of a churn event.
    pub churn_probability: f64,
    /// Amplitude of the cruise position wobble, degrees.
    pub wobble_deg: f64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            target_flights: 45,
            min_flights: 30,
            flight_duration_secs: 15.0 * 60.0,
            speed_multiplier: 1.5,
            loiter_rate: 0.01,
            churn_probability: 0.05,
            wobble_deg: 0.01,
        }
    }
}

/// What the churn step did on a tick, if anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChurnEvent {
    Removed(String),
    Spawned(String),
}

/// Owns every active synthetic flight and the random source driving them.
pub struct FlightSimulator {
    config: SimulatorConfig,
    pool: Vec<Waypoint>,
    min_distance: f64,
    flights: BTreeMap<String, FlightState>,
    rng: StdRng,
}

impl FlightSimulator {
    pub fn new(
        bbox: BoundingBox,
        pool: Vec<Waypoint>,
        config: SimulatorConfig,
        rng: StdRng,
    ) -> Result<Self> {
        bbox.validate()?;
        if config.min_flights > config.target_flights + POPULATION_SPREAD {
            return Err(SkyfeedError::InvalidConfig(format!(
                "min flights ({}) exceeds the largest initial population ({})",
                config.min_flights,
                config.target_flights + POPULATION_SPREAD
            )));
        }
        Ok(Self {
            config,
            pool,
            min_distance: min_route_distance(&bbox),
            flights: BTreeMap::new(),
            rng,
        })
    }

    /// Reuse a route generator's waypoint pool and random source.
    pub fn from_generator(generator: RouteGenerator, config: SimulatorConfig) -> Result<Self> {
        let (bbox, pool, rng) = generator.into_parts();
        Self::new(bbox, pool, config, rng)
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn get(&self, icao: &str) -> Option<&FlightState> {
        self.flights.get(icao)
    }

    pub fn get_mut(&mut self, icao: &str) -> Option<&mut FlightState> {
        self.flights.get_mut(icao)
    }

    pub fn flights(&self) -> impl Iterator<Item = &FlightState> {
        self.flights.values()
    }

    /// Register an externally built flight. Identifiers must be unique.
    pub fn insert(&mut self, flight: FlightState) -> Result<()> {
        if self.flights.contains_key(&flight.icao) {
            return Err(SkyfeedError::InvalidConfig(format!(
                "flight {} is already active",
                flight.icao
            )));
        }
        self.flights.insert(flight.icao.clone(), flight);
        Ok(())
    }

    pub fn remove(&mut self, icao: &str) -> Option<FlightState> {
        self.flights.remove(icao)
    }

    /// Spawn the initial population at random points along their legs.
    pub fn populate(&mut self, now: i64) -> Result<usize> {
        let low = self.config.target_flights.saturating_sub(POPULATION_SPREAD);
        let high = self.config.target_flights + POPULATION_SPREAD;
        let count = self.rng.random_range(low..=high);

        for _ in 0..count {
            let mut flight = self.spawn(now)?;
            flight.progress = self.rng.random::<f64>();
            flight.place_on_curve(now, &self.config, &mut self.rng);
            self.flights.insert(flight.icao.clone(), flight);
        }

        tracing::debug!("Populated {} synthetic flights", count);
        Ok(count)
    }

    /// Advance every flight to `now`, apply churn and return the frame.
    pub fn advance(&mut self, now: i64) -> Result<Frame> {
        if self.flights.is_empty() {
            self.populate(now)?;
        }

        for flight in self.flights.values_mut() {
            flight.step(now, &self.config, &mut self.rng);
        }

        match self.churn(now) {
            Ok(Some(event)) => tracing::debug!("Churn: {:?}", event),
            Ok(None) => {}
            Err(e) => tracing::warn!("Churn spawn skipped: {}", e),
        }

        let flights = self.flights.values().map(FlightState::record).collect();
        Ok(Frame::new(now, flights))
    }

    /// Occasionally retire a flight or launch a new one from its origin.
    pub fn churn(&mut self, now: i64) -> Result<Option<ChurnEvent>> {
        if !self.rng.random_bool(self.config.churn_probability.clamp(0.0, 1.0)) {
            return Ok(None);
        }

        if self.flights.len() > self.config.min_flights && self.rng.random_bool(0.5) {
            let index = self.rng.random_range(0..self.flights.len());
            let icao = self.flights.keys().nth(index).cloned();
            return Ok(icao.map(|icao| {
                self.flights.remove(&icao);
                ChurnEvent::Removed(icao)
            }));
        }

        let flight = self.spawn(now)?;
        let icao = flight.icao.clone();
        self.flights.insert(icao.clone(), flight);
        Ok(Some(ChurnEvent::Spawned(icao)))
    }

    fn spawn(&mut self, now: i64) -> Result<FlightState> {
        let (origin, destination) = sample_endpoints(&mut self.rng, &self.pool, self.min_distance)?;
        let control_point = single_control_point(&mut self.rng, &origin, &destination);
        let flights = &self.flights;
        let icao = unique_icao(&mut self.rng, |candidate| flights.contains_key(candidate));
        let callsign = random_callsign(&mut self.rng);

        let mut flight = FlightState::new(
            icao,
            callsign,
            origin,
            destination,
            control_point,
            self.config.flight_duration_secs,
            now,
        );
        flight.cruise_altitude = self.rng.random_range(CRUISE_ALTITUDE_M);
        flight.cruise_speed = self.rng.random_range(CRUISE_SPEED_MPS);
        Ok(flight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn europe() -> BoundingBox {
        BoundingBox::new(-5.0, 42.0, 15.0, 55.0)
    }

    fn quiet_config() -> SimulatorConfig {
        SimulatorConfig {
            churn_probability: 0.0,
            wobble_deg: 0.0,
            ..SimulatorConfig::default()
        }
    }

    fn simulator(config: SimulatorConfig, seed: u64) -> FlightSimulator {
        let generator = RouteGenerator::new(europe(), 6, seed).unwrap();
        FlightSimulator::from_generator(generator, config).unwrap()
    }

    fn scenario_flight(now: i64) -> FlightState {
        FlightState::new(
            "abc123",
            "BA100",
            Waypoint::new("O", 0.0, 0.0),
            Waypoint::new("D", 0.0, 10.0),
            (5.0, 5.0),
            900.0,
            now,
        )
    }

    #[test]
    fn cruise_progress_follows_elapsed_time() {
        let mut sim = simulator(quiet_config(), 1);
        sim.insert(scenario_flight(1_000)).unwrap();
        sim.advance(1_450).unwrap();

        let flight = sim.get("abc123").unwrap();
        assert!((flight.progress - 0.75).abs() < 1e-9);
        assert_eq!(flight.phase, Phase::Cruise);
        assert_eq!(flight.direction, Direction::Outbound);

        let expected = bezier_point((0.0, 0.0), (5.0, 5.0), (0.0, 10.0), 0.75);
        assert!((flight.lat - expected.0).abs() < 1e-9);
        assert!((flight.lon - expected.1).abs() < 1e-9);
    }

    #[test]
    fn crossing_threshold_starts_approach() {
        let mut sim = simulator(quiet_config(), 2);
        let mut flight = scenario_flight(0);
        flight.progress = 0.9;
        sim.insert(flight).unwrap();

        sim.advance(1).unwrap();
        let flight = sim.get("abc123").unwrap();
        assert_eq!(flight.phase, Phase::Approach);
        let pattern = flight.approach.as_ref().expect("approach pattern");
        assert!((1..=3).contains(&pattern.loops));
        assert_eq!(pattern.current_loop, 0);
        assert_eq!(pattern.center, (0.0, 10.0));
        assert!((0.05..0.1).contains(&pattern.radius));
        assert!((0.0..360.0).contains(&pattern.start_angle));
    }

    #[test]
    fn reversing_flight_loiters_over_origin() {
        let mut sim = simulator(quiet_config(), 3);
        let mut flight = scenario_flight(0);
        flight.direction = Direction::Inbound;
        flight.progress = 0.1;
        sim.insert(flight).unwrap();

        sim.advance(1).unwrap();
        let flight = sim.get("abc123").unwrap();
        assert_eq!(flight.phase, Phase::Approach);
        assert_eq!(flight.approach.as_ref().unwrap().center, (0.0, 0.0));
    }

    #[test]
    fn approach_completes_after_exact_loop_count() {
        let mut pattern = ApproachPattern::new(2, (0.0, 0.0), 0.05, 0.0);
        assert!(!pattern.advance(1.0));
        assert_eq!(pattern.current_loop, 1);
        assert!(!pattern.advance(0.5));
        assert!(pattern.advance(0.5));
        assert_eq!(pattern.current_loop, 2);

        let mut single = ApproachPattern::new(1, (0.0, 0.0), 0.05, 0.0);
        assert!(single.advance(3.7));
        assert_eq!(single.current_loop, 1);
    }

    #[test]
    fn approach_exit_reverses_at_boundary() {
        let mut sim = simulator(quiet_config(), 4);
        let mut flight = scenario_flight(0);
        flight.progress = 0.95;
        flight.phase = Phase::Approach;
        flight.approach = Some(ApproachPattern::new(1, (0.0, 10.0), 0.05, 0.0));
        sim.insert(flight).unwrap();

        // 0.01 loops/s * 100 s = one full loop
        sim.advance(100).unwrap();
        let flight = sim.get("abc123").unwrap();
        assert_eq!(flight.phase, Phase::Cruise);
        assert_eq!(flight.direction, Direction::Inbound);
        assert_eq!(flight.progress, 1.0);
        assert!(flight.approach.is_none());
        assert!((flight.lat - 0.0).abs() < 1e-9);
        assert!((flight.lon - 10.0).abs() < 1e-9);
    }

    #[test]
    fn loiter_position_is_on_circle() {
        let mut sim = simulator(quiet_config(), 5);
        let mut flight = scenario_flight(0);
        flight.progress = 0.95;
        flight.phase = Phase::Approach;
        flight.approach = Some(ApproachPattern::new(3, (0.0, 10.0), 0.08, 30.0));
        sim.insert(flight).unwrap();

        sim.advance(20).unwrap();
        let flight = sim.get("abc123").unwrap();
        let dist = (flight.lat - 0.0).hypot(flight.lon - 10.0);
        assert!((dist - 0.08).abs() < 1e-9);
        assert!((0.0..360.0).contains(&flight.track));
        assert!(flight.altitude < APPROACH_ALTITUDE_M);
    }

    #[test]
    fn long_run_keeps_invariants() {
        let config = SimulatorConfig {
            churn_probability: 0.2,
            target_flights: 20,
            min_flights: 10,
            ..SimulatorConfig::default()
        };
        let mut sim = simulator(config, 9);
        sim.populate(0).unwrap();

        let mut previous: BTreeMap<String, (Phase, Direction, u32)> = BTreeMap::new();
        let mut completed_approaches = 0;
        let mut now = 0;
        for tick in 0..3_000 {
            now += 5 + (tick % 7) * 10;
            let frame = sim.advance(now).unwrap();
            assert_eq!(frame.timestamp, now);

            let ids: HashSet<_> = frame.flights.iter().map(|f| f.icao.as_str()).collect();
            assert_eq!(ids.len(), frame.flights.len(), "duplicate icao in frame");

            for flight in sim.flights() {
                assert!((0.0..=1.0).contains(&flight.progress));
                assert!((0.0..360.0).contains(&flight.track));
                assert!(flight.altitude >= 0.0);
                assert!(flight.speed >= 0.0);
                if let Some(pattern) = &flight.approach {
                    assert!(pattern.current_loop < pattern.loops);
                    assert!((0.0..1.0).contains(&pattern.loiter_progress));
                }

                if let Some((phase, direction, loops_done)) = previous.get(&flight.icao) {
                    if *direction != flight.direction {
                        assert_eq!(*phase, Phase::Approach);
                        assert_eq!(flight.phase, Phase::Cruise);
                        let boundary = match flight.direction {
                            Direction::Inbound => 1.0,
                            Direction::Outbound => 0.0,
                        };
                        assert_eq!(flight.progress, boundary);
                        assert!(*loops_done < 3);
                        completed_approaches += 1;
                    }
                }
            }

            previous = sim
                .flights()
                .map(|f| {
                    let loops = f.approach.as_ref().map(|p| p.current_loop).unwrap_or(0);
                    (f.icao.clone(), (f.phase, f.direction, loops))
                })
                .collect();
        }

        assert!(completed_approaches > 0);
        assert!(sim.len() >= 10);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let mut a = simulator(SimulatorConfig::default(), 77);
        let mut b = simulator(SimulatorConfig::default(), 77);
        for now in (0..600).step_by(5) {
            assert_eq!(a.advance(now).unwrap(), b.advance(now).unwrap());
        }
    }

    #[test]
    fn churn_spawns_at_origin_with_low_energy() {
        let config = SimulatorConfig {
            churn_probability: 1.0,
            target_flights: 5,
            min_flights: 10,
            ..quiet_config()
        };
        let mut sim = simulator(config, 12);
        let event = sim.churn(50).unwrap();
        let Some(ChurnEvent::Spawned(icao)) = event else {
            panic!("expected a spawn, got {event:?}");
        };
        let flight = sim.get(&icao).unwrap();
        assert_eq!(flight.progress, 0.0);
        assert_eq!(flight.altitude, FRESH_ALTITUDE_M);
        assert_eq!(flight.speed, FRESH_SPEED_MPS);
        assert_eq!((flight.lat, flight.lon), flight.origin.position());
    }

    #[test]
    fn churn_never_drops_below_floor() {
        let config = SimulatorConfig {
            churn_probability: 1.0,
            target_flights: 5,
            min_flights: 5,
            ..quiet_config()
        };
        let mut sim = simulator(config, 13);
        for now in 0..200 {
            sim.churn(now).unwrap();
            assert!(sim.len() >= 1);
        }
        assert!(sim.len() >= 5);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut sim = simulator(quiet_config(), 14);
        sim.insert(scenario_flight(0)).unwrap();
        assert!(sim.insert(scenario_flight(0)).is_err());
    }

    #[test]
    fn cruise_profile_ramps() {
        assert_eq!(cruise_profile(0.0), 0.0);
        assert!((cruise_profile(0.1) - 0.5).abs() < 1e-9);
        assert_eq!(cruise_profile(0.5), 1.0);
        assert!((cruise_profile(0.9) - 0.5).abs() < 1e-9);
    }
}
