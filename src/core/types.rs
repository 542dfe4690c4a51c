use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Chart axis selector used in diagnostics and calibration lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    /// Root attribute of the chart document carrying this axis descriptor.
    #[must_use]
    pub const fn descriptor_attribute(self) -> &'static str {
        match self {
            Self::X => "xlm",
            Self::Y => "ylm",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

/// Position in chart pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Direction of the day change reported with an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeSign {
    Positive,
    Negative,
    Flat,
}

impl ChangeSign {
    #[must_use]
    pub fn from_change(change: f64) -> Self {
        if change > 0.0 {
            Self::Positive
        } else if change < 0.0 {
            Self::Negative
        } else {
            Self::Flat
        }
    }

    /// Flat changes share the non-negative side.
    #[must_use]
    pub fn is_non_negative(self) -> bool {
        !matches!(self, Self::Negative)
    }
}

/// One upstream reading.
///
/// Fields are private so a constructed observation cannot drift; each poll
/// produces a fresh value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    value: f64,
    change: f64,
    change_sign: ChangeSign,
    label: String,
    observed_at: DateTime<Utc>,
}

impl Observation {
    #[must_use]
    pub fn new(value: f64, change: f64, label: impl Into<String>, observed_at: DateTime<Utc>) -> Self {
        Self {
            value,
            change,
            change_sign: ChangeSign::from_change(change),
            label: label.into(),
            observed_at,
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[must_use]
    pub fn change(&self) -> f64 {
        self.change
    }

    #[must_use]
    pub fn change_sign(&self) -> ChangeSign {
        self.change_sign
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn observed_at(&self) -> DateTime<Utc> {
        self.observed_at
    }
}
