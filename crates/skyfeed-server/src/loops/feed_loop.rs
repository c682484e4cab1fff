//! The producer loop: one tick per poll interval.
//!
//! Each tick either fetches live records or advances the simulator,
//! stores the frame, prunes the window and publishes a fresh snapshot.
//! Shutdown is only observed between ticks, so a frame is never half
//! written.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time::{interval, timeout, MissedTickBehavior};

use crate::state::AppState;
use skyfeed_core::{
    BoundingBox, FallbackDecision, FallbackPolicy, FeedError, FeedStatus, FlightFeed,
    FlightRecord, FlightSimulator, Frame, SkyfeedError, StreamMessage, WindowStore,
};

/// What a single tick produced.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Live { flights: usize },
    Synthetic { flights: usize },
    /// Live fetch failed and the fallback threshold is not reached yet.
    Skipped(FeedError),
}

/// Sole writer of the snapshot window.
pub struct FeedProducer<F: FlightFeed> {
    state: Arc<AppState>,
    feed: Option<F>,
    simulator: FlightSimulator,
    window: WindowStore,
    policy: FallbackPolicy,
    bbox: BoundingBox,
    feed_timeout: Duration,
}

impl<F: FlightFeed> FeedProducer<F> {
    /// Claim the producer slot on `state`.
    ///
    /// Without a feed the producer starts (and stays) synthetic.
    pub fn new(
        state: Arc<AppState>,
        feed: Option<F>,
        simulator: FlightSimulator,
        policy: FallbackPolicy,
    ) -> Result<Self, SkyfeedError> {
        state.claim_producer()?;

        let policy = if feed.is_some() {
            policy
        } else {
            FallbackPolicy::synthetic_only()
        };
        if policy.is_synthetic() {
            state.mark_synthetic();
        }

        let config = state.config();
        let window = WindowStore::new(config.window_secs);
        let bbox = config.bbox;
        let feed_timeout = config.feed_timeout();

        Ok(Self {
            state,
            feed,
            simulator,
            window,
            policy,
            bbox,
            feed_timeout,
        })
    }

    pub fn window(&self) -> &WindowStore {
        &self.window
    }

    pub fn simulator(&self) -> &FlightSimulator {
        &self.simulator
    }

    pub fn is_synthetic(&self) -> bool {
        self.policy.is_synthetic()
    }

    /// Put one synthetic frame into the window without touching the
    /// fallback policy, so early viewers never see an empty snapshot.
    pub fn warm_start(&mut self, now: i64) -> Result<usize, SkyfeedError> {
        let flights = self.put_synthetic_frame(now)?;
        self.publish()?;
        tracing::info!("Warm start seeded {} synthetic flights", flights);
        Ok(flights)
    }

    /// Run one producer step at wall-clock second `now`.
    pub async fn tick(&mut self, now: i64) -> Result<TickOutcome, SkyfeedError> {
        let outcome = if self.policy.is_synthetic() {
            self.synthetic_tick(now)?
        } else {
            let fetched = self.fetch_live().await;
            let status = FeedStatus::of(&fetched);
            match fetched {
                Ok(records) => {
                    self.policy.record(status);
                    let flights = records.len();
                    self.window.put(now, Frame::new(now, records));
                    TickOutcome::Live { flights }
                }
                Err(e) => {
                    tracing::warn!("Live feed failed: {}", e);
                    match self.policy.record(status) {
                        FallbackDecision::SwitchToSynthetic => {
                            tracing::warn!(
                                "Live feed failed {} consecutive times; switching to synthetic traffic until restart",
                                self.policy.consecutive_failures()
                            );
                            self.state.mark_synthetic();
                            self.synthetic_tick(now)?
                        }
                        FallbackDecision::StayLive | FallbackDecision::Synthetic => {
                            TickOutcome::Skipped(e)
                        }
                    }
                }
            }
        };

        let pruned = self.window.prune(now);
        if pruned > 0 {
            tracing::debug!("Pruned {} expired frames", pruned);
        }
        self.publish()?;
        Ok(outcome)
    }

    fn synthetic_tick(&mut self, now: i64) -> Result<TickOutcome, SkyfeedError> {
        let flights = self.put_synthetic_frame(now)?;
        Ok(TickOutcome::Synthetic { flights })
    }

    fn put_synthetic_frame(&mut self, now: i64) -> Result<usize, SkyfeedError> {
        let frame = self.simulator.advance(now)?;
        let flights = frame.flights.len();
        self.window.put(now, frame);
        Ok(flights)
    }

    async fn fetch_live(&self) -> Result<Vec<FlightRecord>, FeedError> {
        let Some(feed) = self.feed.as_ref() else {
            return Err(FeedError::Unavailable("no live feed configured".into()));
        };
        match timeout(self.feed_timeout, feed.fetch(&self.bbox)).await {
            Ok(result) => result,
            Err(_) => Err(FeedError::Unavailable(format!(
                "timed out after {:?}",
                self.feed_timeout
            ))),
        }
    }

    fn publish(&self) -> Result<(), SkyfeedError> {
        let payload = StreamMessage::snapshot(&self.window).to_json()?;
        self.state.publish_snapshot(payload, self.window.len());
        tracing::debug!(
            "Published {} frames with {} flight positions",
            self.window.len(),
            self.window.flight_count()
        );
        Ok(())
    }
}

impl<F: FlightFeed> Drop for FeedProducer<F> {
    fn drop(&mut self) {
        self.state.release_producer();
    }
}

/// Start the producer loop.
pub async fn run_feed_loop<F: FlightFeed>(
    mut producer: FeedProducer<F>,
    poll_interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Feed loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                let now = Utc::now().timestamp();
                match producer.tick(now).await {
                    Ok(TickOutcome::Live { flights }) => {
                        tracing::info!("Stored {} live aircraft @ {}", flights, now);
                    }
                    Ok(TickOutcome::Synthetic { flights }) => {
                        tracing::debug!("Generated {} synthetic flights @ {}", flights, now);
                    }
                    Ok(TickOutcome::Skipped(_)) => {}
                    Err(e) => tracing::error!("Feed tick failed: {}", e),
                }
            }
        }
    }
}
