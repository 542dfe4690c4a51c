mod marker;
mod null_surface;
mod primitives;

pub use marker::{MarkerState, MarkerStyle, PulseAnimation, format_number};
pub use null_surface::NullSurface;
pub use primitives::Color;

use crate::error::OverlayResult;

/// Contract implemented by any display surface hosting the live marker.
///
/// Surfaces receive a fully materialized `MarkerState` and must upsert it:
/// applying twice leaves a single marker showing the latest state.
pub trait OverlaySurface {
    fn apply(&mut self, state: &MarkerState) -> OverlayResult<()>;
}
