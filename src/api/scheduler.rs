use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::api::CalibratedValueTranslator;
use crate::core::{ChartCalibration, Observation, PixelPoint};
use crate::error::{OverlayError, OverlayResult};
use crate::render::OverlaySurface;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Source of fresh readings, polled once per tick.
///
/// `None` means "unavailable this time"; the scheduler skips the tick.
#[async_trait]
pub trait ObservationProducer: Send + Sync {
    async fn produce(&self) -> Option<Observation>;
}

/// What happened on one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// The marker was moved to this point.
    Rendered(PixelPoint),
    /// The producer had no reading; the marker stays where it was.
    Unavailable,
    /// A reading arrived but no calibration is loaded.
    Unmapped,
    /// The previous producer call is still running; this tick was skipped.
    Busy,
    /// The surface refused the marker.
    Rejected(String),
}

/// Drives the producer on a fixed interval and applies each reading to a
/// surface.
///
/// At most one producer call runs at a time: a tick that fires while the
/// previous call is unresolved is dropped, never queued.
#[derive(Debug, Clone)]
pub struct PollScheduler {
    interval: Duration,
    translator: CalibratedValueTranslator,
    outcomes: Option<mpsc::UnboundedSender<TickOutcome>>,
}

impl PollScheduler {
    pub fn new(interval: Duration) -> OverlayResult<Self> {
        if interval.is_zero() {
            return Err(OverlayError::Config("poll interval must be > 0".to_owned()));
        }
        Ok(Self {
            interval,
            translator: CalibratedValueTranslator::default(),
            outcomes: None,
        })
    }

    #[must_use]
    pub fn with_translator(mut self, translator: CalibratedValueTranslator) -> Self {
        self.translator = translator;
        self
    }

    /// Reports every tick's outcome on `sender`.
    #[must_use]
    pub fn with_outcomes(mut self, sender: mpsc::UnboundedSender<TickOutcome>) -> Self {
        self.outcomes = Some(sender);
        self
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawns the polling loop. The first tick fires immediately.
    ///
    /// The calibration is captured once; restart the scheduler after loading
    /// a different chart.
    pub fn start<P, S>(
        &self,
        producer: Arc<P>,
        surface: Arc<Mutex<S>>,
        calibration: Option<ChartCalibration>,
    ) -> PollHandle
    where
        P: ObservationProducer + ?Sized + 'static,
        S: OverlaySurface + Send + 'static,
    {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let scheduler = self.clone();
        let in_flight = Arc::new(AtomicBool::new(false));

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(scheduler.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut calls = JoinSet::new();
            info!(interval_secs = scheduler.interval.as_secs_f64(), "poll scheduler started");

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if in_flight.swap(true, Ordering::AcqRel) {
                            debug!("previous poll still running, skipping tick");
                            scheduler.report(TickOutcome::Busy);
                            continue;
                        }
                        let scheduler = scheduler.clone();
                        let producer = Arc::clone(&producer);
                        let surface = Arc::clone(&surface);
                        let in_flight = Arc::clone(&in_flight);
                        calls.spawn(async move {
                            let outcome = scheduler
                                .tick_once(producer.as_ref(), surface.as_ref(), calibration.as_ref())
                                .await;
                            in_flight.store(false, Ordering::Release);
                            scheduler.report(outcome);
                        });
                    }
                    Some(joined) = calls.join_next(), if !calls.is_empty() => {
                        if let Err(err) = joined {
                            warn!(error = %err, "poll task failed");
                            in_flight.store(false, Ordering::Release);
                        }
                    }
                    _ = stop_rx.changed() => break,
                }
            }

            // Dropping the set aborts a call still in flight.
            drop(calls);
            info!("poll scheduler stopped");
        });

        PollHandle {
            stop_tx,
            task: Some(task),
        }
    }

    /// Runs one produce, translate and apply cycle without the timer.
    pub async fn tick_once<P, S>(
        &self,
        producer: &P,
        surface: &Mutex<S>,
        calibration: Option<&ChartCalibration>,
    ) -> TickOutcome
    where
        P: ObservationProducer + ?Sized,
        S: OverlaySurface + Send,
    {
        let Some(observation) = producer.produce().await else {
            debug!("no observation this tick");
            return TickOutcome::Unavailable;
        };
        let Some(state) = self
            .translator
            .to_marker_state(&observation, calibration, Utc::now())
        else {
            debug!("no calibration loaded, marker not placed");
            return TickOutcome::Unmapped;
        };

        let point = state.point;
        match surface.lock().await.apply(&state) {
            Ok(()) => TickOutcome::Rendered(point),
            Err(err) => {
                warn!(error = %err, "surface rejected marker");
                TickOutcome::Rejected(err.to_string())
            }
        }
    }

    fn report(&self, outcome: TickOutcome) {
        if let Some(sender) = &self.outcomes {
            let _ = sender.send(outcome);
        }
    }
}

/// Handle to a running scheduler.
///
/// Drop this handle to stop polling, or call `stop()` to also wait for the
/// loop to wind down.
#[derive(Debug)]
pub struct PollHandle {
    stop_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    pub async fn stop(mut self) {
        let _ = self.stop_tx.send(true);
        if let Some(task) = self.task.take() {
            if let Err(err) = task.await {
                warn!(error = %err, "poll loop ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        let _ = self.stop_tx.send(true);
    }
}
