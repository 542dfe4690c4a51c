use serde::{Deserialize, Serialize};

use crate::core::PixelPoint;
use crate::error::{OverlayError, OverlayResult};
use crate::render::Color;

/// Repeating radius oscillation applied to the live marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PulseAnimation {
    pub rest_radius_px: f64,
    pub peak_radius_px: f64,
    pub duration_secs: f64,
}

impl PulseAnimation {
    pub fn validate(self) -> OverlayResult<()> {
        for (name, value) in [
            ("rest_radius_px", self.rest_radius_px),
            ("peak_radius_px", self.peak_radius_px),
            ("duration_secs", self.duration_secs),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(OverlayError::InvalidData(format!(
                    "pulse `{name}` must be finite and > 0"
                )));
            }
        }
        Ok(())
    }

    /// SMIL `values` list: rest, peak, rest.
    #[must_use]
    pub fn keyframes(self) -> String {
        format!(
            "{};{};{}",
            format_number(self.rest_radius_px),
            format_number(self.peak_radius_px),
            format_number(self.rest_radius_px)
        )
    }

    #[must_use]
    pub fn duration(self) -> String {
        format!("{}s", format_number(self.duration_secs))
    }
}

/// Visual constants of the live marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    pub radius_px: f64,
    pub stroke_color: Color,
    pub stroke_width_px: f64,
    pub non_negative_color: Color,
    pub negative_color: Color,
    pub pulse_peak_radius_px: f64,
    pub pulse_duration_secs: f64,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            radius_px: 5.0,
            stroke_color: Color::BLACK,
            stroke_width_px: 1.0,
            non_negative_color: Color::CRIMSON,
            negative_color: Color::LIME_GREEN,
            pulse_peak_radius_px: 7.0,
            pulse_duration_secs: 0.6,
        }
    }
}

impl MarkerStyle {
    pub fn validate(self) -> OverlayResult<Self> {
        if !self.radius_px.is_finite() || self.radius_px <= 0.0 {
            return Err(OverlayError::InvalidData(
                "marker radius must be finite and > 0".to_owned(),
            ));
        }
        if !self.stroke_width_px.is_finite() || self.stroke_width_px < 0.0 {
            return Err(OverlayError::InvalidData(
                "marker stroke width must be finite and >= 0".to_owned(),
            ));
        }
        self.stroke_color.validate()?;
        self.non_negative_color.validate()?;
        self.negative_color.validate()?;
        self.pulse().validate()?;
        Ok(self)
    }

    #[must_use]
    pub fn pulse(self) -> PulseAnimation {
        PulseAnimation {
            rest_radius_px: self.radius_px,
            peak_radius_px: self.pulse_peak_radius_px,
            duration_secs: self.pulse_duration_secs,
        }
    }
}

/// Desired state of the single live marker.
///
/// Surfaces receive this description and apply it; the mapping and scheduling
/// code never touches a display technology directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerState {
    pub point: PixelPoint,
    pub fill: Color,
    pub tooltip: String,
    pub radius_px: f64,
    pub stroke: Color,
    pub stroke_width_px: f64,
    pub pulse: Option<PulseAnimation>,
}

impl MarkerState {
    #[must_use]
    pub fn new(point: PixelPoint, fill: Color, tooltip: impl Into<String>, style: MarkerStyle) -> Self {
        Self {
            point,
            fill,
            tooltip: tooltip.into(),
            radius_px: style.radius_px,
            stroke: style.stroke_color,
            stroke_width_px: style.stroke_width_px,
            pulse: Some(style.pulse()),
        }
    }

    #[must_use]
    pub fn without_pulse(mut self) -> Self {
        self.pulse = None;
        self
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if !self.point.is_finite() {
            return Err(OverlayError::InvalidData(
                "marker coordinates must be finite".to_owned(),
            ));
        }
        if !self.radius_px.is_finite() || self.radius_px <= 0.0 {
            return Err(OverlayError::InvalidData(
                "marker radius must be finite and > 0".to_owned(),
            ));
        }
        if !self.stroke_width_px.is_finite() || self.stroke_width_px < 0.0 {
            return Err(OverlayError::InvalidData(
                "marker stroke width must be finite and >= 0".to_owned(),
            ));
        }
        self.fill.validate()?;
        self.stroke.validate()?;
        if let Some(pulse) = self.pulse {
            pulse.validate()?;
        }
        Ok(())
    }
}

/// Shortest decimal rendering for SVG attributes (`5` rather than `5.0`).
#[must_use]
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.4}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pulse_oscillates_between_five_and_seven() {
        let pulse = MarkerStyle::default().pulse();
        assert_eq!(pulse.keyframes(), "5;7;5");
        assert_eq!(pulse.duration(), "0.6s");
    }

    #[test]
    fn number_formatting_trims_trailing_zeros() {
        assert_eq!(format_number(250.0), "250");
        assert_eq!(format_number(-0.5), "-0.5");
        assert_eq!(format_number(12.345_678), "12.3457");
    }

    #[test]
    fn non_finite_marker_is_rejected() {
        let state = MarkerState::new(
            PixelPoint::new(f64::NAN, 1.0),
            Color::CRIMSON,
            "tip",
            MarkerStyle::default(),
        );
        assert!(state.validate().is_err());
    }
}
