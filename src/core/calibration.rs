use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::Axis;
use crate::error::{OverlayError, OverlayResult};

/// Affine parameters mapping one domain interval onto a pixel interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisCalibration {
    domain_min: f64,
    domain_max: f64,
    range_min: f64,
    range_max: f64,
}

impl AxisCalibration {
    pub fn new(domain_min: f64, domain_max: f64, range_min: f64, range_max: f64) -> OverlayResult<Self> {
        for (name, value) in [
            ("domain_min", domain_min),
            ("domain_max", domain_max),
            ("range_min", range_min),
            ("range_max", range_max),
        ] {
            if !value.is_finite() {
                return Err(OverlayError::InvalidData(format!(
                    "calibration `{name}` must be finite"
                )));
            }
        }
        if domain_max == domain_min {
            return Err(OverlayError::InvalidData(
                "calibration domain must not be degenerate".to_owned(),
            ));
        }

        Ok(Self {
            domain_min,
            domain_max,
            range_min,
            range_max,
        })
    }

    /// Parses a `[domainMin, domainMax, rangeMin, rangeMax]` descriptor.
    ///
    /// Exponents are accepted in both `1e5` and `1E+5` form.
    pub fn try_parse(descriptor: &str, axis: Axis) -> OverlayResult<Self> {
        let unavailable = |reason: String| OverlayError::CalibrationUnavailable { axis, reason };

        let values: Vec<f64> = serde_json::from_str(descriptor.trim())
            .map_err(|e| unavailable(format!("descriptor `{descriptor}` is not a numeric list: {e}")))?;
        let &[domain_min, domain_max, range_min, range_max] = values.as_slice() else {
            return Err(unavailable(format!(
                "descriptor must hold exactly 4 numbers, found {}",
                values.len()
            )));
        };

        Self::new(domain_min, domain_max, range_min, range_max)
            .map_err(|e| unavailable(e.to_string()))
    }

    /// Lenient variant of [`Self::try_parse`]: a missing or malformed descriptor
    /// is logged and reported as `None`.
    #[must_use]
    pub fn parse(descriptor: Option<&str>, axis: Axis) -> Option<Self> {
        let Some(descriptor) = descriptor else {
            warn!(%axis, "calibration descriptor missing");
            return None;
        };
        match Self::try_parse(descriptor, axis) {
            Ok(calibration) => Some(calibration),
            Err(err) => {
                warn!(%axis, error = %err, "invalid calibration descriptor");
                None
            }
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_min, self.domain_max)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_min, self.range_max)
    }
}

/// Calibration pair read from a loaded chart document.
///
/// The y axis is always mapped inverted: pixel Y grows downward while
/// value Y grows upward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartCalibration {
    pub x: AxisCalibration,
    pub y: AxisCalibration,
}

impl ChartCalibration {
    #[must_use]
    pub fn new(x: AxisCalibration, y: AxisCalibration) -> Self {
        Self { x, y }
    }

    /// Builds the pair from the raw `xlm`/`ylm` descriptors; `None` unless both parse.
    #[must_use]
    pub fn from_descriptors(xlm: Option<&str>, ylm: Option<&str>) -> Option<Self> {
        let x = AxisCalibration::parse(xlm, Axis::X);
        let y = AxisCalibration::parse(ylm, Axis::Y);
        Some(Self::new(x?, y?))
    }

    #[must_use]
    pub fn axis(&self, axis: Axis) -> AxisCalibration {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }
}
