//! Live feed abstraction and the one-way fallback policy.

use std::future::Future;

use thiserror::Error;

use crate::models::{BoundingBox, FlightRecord};

/// Why a live fetch produced no frame this tick.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// Transport failure, timeout, non-2xx status or undecodable body.
    #[error("feed unavailable: {0}")]
    Unavailable(String),
    /// Explicit throttling by the upstream API.
    #[error("feed rate limited")]
    RateLimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Ok,
    RateLimited,
    Unavailable,
}

impl FeedStatus {
    pub fn of<T>(result: &Result<T, FeedError>) -> Self {
        match result {
            Ok(_) => FeedStatus::Ok,
            Err(FeedError::RateLimited) => FeedStatus::RateLimited,
            Err(FeedError::Unavailable(_)) => FeedStatus::Unavailable,
        }
    }
}

/// Source of live flight records for a bounding box.
///
/// Implementations drop malformed rows themselves and only fail the
/// whole fetch for feed-level problems.
pub trait FlightFeed: Send + Sync {
    fn fetch(
        &self,
        bbox: &BoundingBox,
    ) -> impl Future<Output = Result<Vec<FlightRecord>, FeedError>> + Send;
}

/// Outcome of feeding one status into [`FallbackPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackDecision {
    StayLive,
    /// Threshold just reached; switch now and log it.
    SwitchToSynthetic,
    /// Already switched earlier; live fetches should no longer happen.
    Synthetic,
}

/// Weight of an explicit throttling signal toward the threshold.
pub const RATE_LIMIT_WEIGHT: u32 = 2;

/// Scores consecutive feed failures and trips once, permanently.
///
/// An outage adds 1 and a rate limit adds [`RATE_LIMIT_WEIGHT`]; any
/// success clears the score. Once tripped, the process stays synthetic
/// until restart.
#[derive(Debug, Clone)]
pub struct FallbackPolicy {
    threshold: u32,
    consecutive_failures: u32,
    failure_score: u32,
    tripped: bool,
}

impl FallbackPolicy {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold: threshold.max(1),
            consecutive_failures: 0,
            failure_score: 0,
            tripped: false,
        }
    }

    /// A policy that starts already tripped (synthetic-only deployments).
    pub fn synthetic_only() -> Self {
        Self {
            threshold: 1,
            consecutive_failures: 0,
            failure_score: 0,
            tripped: true,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.tripped
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    /// Weighted failure score compared against the threshold.
    pub fn failure_score(&self) -> u32 {
        self.failure_score
    }

    pub fn record(&mut self, status: FeedStatus) -> FallbackDecision {
        if self.tripped {
            return FallbackDecision::Synthetic;
        }

        match status {
            FeedStatus::Ok => {
                self.consecutive_failures = 0;
                self.failure_score = 0;
                FallbackDecision::StayLive
            }
            FeedStatus::RateLimited | FeedStatus::Unavailable => {
                let weight = match status {
                    FeedStatus::RateLimited => RATE_LIMIT_WEIGHT,
                    _ => 1,
                };
                self.consecutive_failures += 1;
                self.failure_score = self.failure_score.saturating_add(weight);
                if self.failure_score >= self.threshold {
                    self.tripped = true;
                    FallbackDecision::SwitchToSynthetic
                } else {
                    FallbackDecision::StayLive
                }
            }
        }
    }
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_three_consecutive_outages() {
        let mut policy = FallbackPolicy::default();
        assert_eq!(policy.record(FeedStatus::Unavailable), FallbackDecision::StayLive);
        assert_eq!(policy.record(FeedStatus::Unavailable), FallbackDecision::StayLive);
        assert_eq!(
            policy.record(FeedStatus::Unavailable),
            FallbackDecision::SwitchToSynthetic
        );
        assert!(policy.is_synthetic());
    }

    #[test]
    fn success_resets_the_streak() {
        let mut policy = FallbackPolicy::default();
        policy.record(FeedStatus::Unavailable);
        policy.record(FeedStatus::Unavailable);
        policy.record(FeedStatus::Ok);
        assert_eq!(policy.consecutive_failures(), 0);
        assert_eq!(policy.failure_score(), 0);
        policy.record(FeedStatus::Unavailable);
        policy.record(FeedStatus::Unavailable);
        assert!(!policy.is_synthetic());
    }

    #[test]
    fn rate_limits_count_faster_than_outages() {
        let mut limited = FallbackPolicy::default();
        assert_eq!(limited.record(FeedStatus::RateLimited), FallbackDecision::StayLive);
        assert_eq!(
            limited.record(FeedStatus::RateLimited),
            FallbackDecision::SwitchToSynthetic
        );
        assert_eq!(limited.consecutive_failures(), 2);

        let mut down = FallbackPolicy::default();
        down.record(FeedStatus::Unavailable);
        down.record(FeedStatus::Unavailable);
        assert!(!down.is_synthetic());
        assert!(limited.failure_score() > down.failure_score());
    }

    #[test]
    fn outage_then_rate_limit_trips() {
        let mut policy = FallbackPolicy::default();
        policy.record(FeedStatus::Unavailable);
        assert_eq!(
            policy.record(FeedStatus::RateLimited),
            FallbackDecision::SwitchToSynthetic
        );
    }

    #[test]
    fn fallback_is_permanent() {
        let mut policy = FallbackPolicy::new(1);
        assert_eq!(
            policy.record(FeedStatus::Unavailable),
            FallbackDecision::SwitchToSynthetic
        );
        assert_eq!(policy.record(FeedStatus::Ok), FallbackDecision::Synthetic);
        assert!(policy.is_synthetic());
    }

    #[test]
    fn status_from_result() {
        let ok: Result<Vec<FlightRecord>, FeedError> = Ok(vec![]);
        assert_eq!(FeedStatus::of(&ok), FeedStatus::Ok);
        let limited: Result<(), FeedError> = Err(FeedError::RateLimited);
        assert_eq!(FeedStatus::of(&limited), FeedStatus::RateLimited);
        let down: Result<(), FeedError> = Err(FeedError::Unavailable("503".into()));
        assert_eq!(FeedStatus::of(&down), FeedStatus::Unavailable);
    }
}
