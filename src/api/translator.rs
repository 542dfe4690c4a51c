use chrono::{DateTime, Utc};
use tracing::debug;

use crate::core::{ChartCalibration, Observation, datetime_to_ticks, logical_coordinates};
use crate::error::OverlayResult;
use crate::render::{Color, MarkerState, MarkerStyle};

/// Turns an observation into the marker state for the current instant.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CalibratedValueTranslator {
    style: MarkerStyle,
}

impl CalibratedValueTranslator {
    pub fn new(style: MarkerStyle) -> OverlayResult<Self> {
        Ok(Self {
            style: style.validate()?,
        })
    }

    #[must_use]
    pub fn style(&self) -> MarkerStyle {
        self.style
    }

    /// Zero counts as non-negative.
    #[must_use]
    pub fn color_for(&self, observation: &Observation) -> Color {
        if observation.change_sign().is_non_negative() {
            self.style.non_negative_color
        } else {
            self.style.negative_color
        }
    }

    /// Places the observation at `now` on the x axis (encoded as ticks) and at
    /// its value on the y axis.
    ///
    /// `None` while no calibration is loaded.
    #[must_use]
    pub fn to_marker_state(
        &self,
        observation: &Observation,
        calibration: Option<&ChartCalibration>,
        now: DateTime<Utc>,
    ) -> Option<MarkerState> {
        self.translate_domain(observation, calibration, datetime_to_ticks(now))
    }

    /// Same as [`Self::to_marker_state`] with an explicit x-domain value.
    #[must_use]
    pub fn translate_domain(
        &self,
        observation: &Observation,
        calibration: Option<&ChartCalibration>,
        domain_x: f64,
    ) -> Option<MarkerState> {
        let point = logical_coordinates(calibration, domain_x, observation.value())?;
        debug!(x = point.x, y = point.y, value = observation.value(), "marker placed");
        Some(MarkerState::new(
            point,
            self.color_for(observation),
            observation.label(),
            self.style,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AxisCalibration;

    fn calibration() -> ChartCalibration {
        ChartCalibration::new(
            AxisCalibration::new(0.0, 100.0, 0.0, 500.0).expect("x"),
            AxisCalibration::new(0.0, 10.0, 0.0, 400.0).expect("y"),
        )
    }

    fn observation(change: f64) -> Observation {
        Observation::new(5.0, change, "tip", Utc::now())
    }

    #[test]
    fn zero_change_uses_non_negative_color() {
        let translator = CalibratedValueTranslator::default();
        let state = translator
            .translate_domain(&observation(0.0), Some(&calibration()), 50.0)
            .expect("state");
        assert_eq!(state.fill, Color::CRIMSON);
        assert_eq!(state.tooltip, "tip");
        assert_eq!((state.point.x, state.point.y), (250.0, 200.0));

        let top_down = ChartCalibration::from_descriptors(Some("[0,100,0,500]"), Some("[0,10,400,0]"))
            .expect("calibration");
        let state = translator
            .translate_domain(&observation(0.0), Some(&top_down), 50.0)
            .expect("state");
        assert_eq!((state.point.x, state.point.y), (250.0, 200.0));
    }

    #[test]
    fn negative_change_uses_negative_color() {
        let translator = CalibratedValueTranslator::default();
        let state = translator
            .translate_domain(&observation(-0.01), Some(&calibration()), 50.0)
            .expect("state");
        assert_eq!(state.fill, Color::LIME_GREEN);
    }

    #[test]
    fn missing_calibration_is_unavailable() {
        let translator = CalibratedValueTranslator::default();
        assert!(translator.to_marker_state(&observation(1.0), None, Utc::now()).is_none());
    }
}
