//! chart-overlay: live data-point overlay for calibrated SVG charts.
//!
//! A chart drawing carries its own affine calibration (`xlm`/`ylm` root
//! attributes). This crate maps fresh readings through that calibration and
//! keeps a single pulsing marker on the drawing, fed by a scraping pipeline
//! that tolerates failing routes and shifting page layouts.

pub mod acquire;
pub mod api;
pub mod core;
pub mod document;
pub mod error;
pub mod persist;
pub mod render;
pub mod telemetry;

pub use acquire::{AcquisitionPipeline, HttpTransport, InstrumentProfile, YieldSnapshot};
pub use api::{
    CalibratedValueTranslator, ObservationProducer, OverlayConfig, PollHandle, PollScheduler,
    TickOutcome,
};
pub use core::{ChartCalibration, Observation, PixelPoint, logical_coordinates};
pub use document::ChartDocument;
pub use error::{OverlayError, OverlayResult};
pub use render::{MarkerState, OverlaySurface};
