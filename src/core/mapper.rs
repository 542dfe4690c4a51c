use tracing::warn;

use crate::core::{AxisCalibration, ChartCalibration, PixelPoint};

impl AxisCalibration {
    /// Maps a domain value to pixel space.
    ///
    /// The transform is affine and never clamps: values beyond the calibrated
    /// domain extrapolate linearly.
    #[must_use]
    pub fn map(self, value: f64, invert: bool) -> f64 {
        let (domain_min, domain_max) = self.domain();
        let (range_min, range_max) = self.range();
        let ratio = (value - domain_min) / (domain_max - domain_min);
        let ratio = if invert { 1.0 - ratio } else { ratio };
        range_min + ratio * (range_max - range_min)
    }

    /// Inverse of [`Self::map`] for the same orientation.
    ///
    /// A zero-width pixel range has no inverse and yields a non-finite value.
    #[must_use]
    pub fn unmap(self, pixel: f64, invert: bool) -> f64 {
        let (domain_min, domain_max) = self.domain();
        let (range_min, range_max) = self.range();
        let ratio = (pixel - range_min) / (range_max - range_min);
        let ratio = if invert { 1.0 - ratio } else { ratio };
        domain_min + ratio * (domain_max - domain_min)
    }
}

impl ChartCalibration {
    /// Maps a domain pair to pixel space: x direct, y inverted.
    #[must_use]
    pub fn to_pixel(&self, domain_x: f64, domain_y: f64) -> PixelPoint {
        PixelPoint::new(self.x.map(domain_x, false), self.y.map(domain_y, true))
    }

    #[must_use]
    pub fn to_domain(&self, point: PixelPoint) -> (f64, f64) {
        (self.x.unmap(point.x, false), self.y.unmap(point.y, true))
    }
}

/// Maps a domain pair through the currently loaded calibration.
///
/// Returns `None` while no calibration is loaded or when the inputs do not
/// produce a finite point.
#[must_use]
pub fn logical_coordinates(
    calibration: Option<&ChartCalibration>,
    domain_x: f64,
    domain_y: f64,
) -> Option<PixelPoint> {
    let point = calibration?.to_pixel(domain_x, domain_y);
    if !point.is_finite() {
        warn!(domain_x, domain_y, "mapped point is not finite");
        return None;
    }
    Some(point)
}
