use crate::error::OverlayResult;
use crate::render::{MarkerState, OverlaySurface};

/// Headless surface used by tests and dry runs.
///
/// It still validates every state so tests catch invalid geometry before a
/// real surface is involved.
#[derive(Debug, Default)]
pub struct NullSurface {
    pub last_state: Option<MarkerState>,
    pub apply_count: usize,
}

impl OverlaySurface for NullSurface {
    fn apply(&mut self, state: &MarkerState) -> OverlayResult<()> {
        state.validate()?;
        self.last_state = Some(state.clone());
        self.apply_count += 1;
        Ok(())
    }
}
