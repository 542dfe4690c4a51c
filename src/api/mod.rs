//! Orchestration layer: observation-to-marker translation, the poll
//! scheduler and runtime configuration.

mod config;
mod scheduler;
mod translator;

pub use config::{ENV_PREFIX, OverlayConfig};
pub use scheduler::{
    DEFAULT_POLL_INTERVAL, ObservationProducer, PollHandle, PollScheduler, TickOutcome,
};
pub use translator::CalibratedValueTranslator;
