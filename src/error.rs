use thiserror::Error;

use crate::core::Axis;

pub type OverlayResult<T> = Result<T, OverlayError>;

#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("calibration unavailable for {axis} axis: {reason}")]
    CalibrationUnavailable { axis: Axis, reason: String },

    #[error("transport route `{route}` failed: {reason}")]
    TransportFailure { route: String, reason: String },

    #[error("all {attempts} transport routes failed")]
    AllRoutesExhausted { attempts: usize },

    #[error("parse failure: {0}")]
    ParseFailure(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("chart document error: {0}")]
    Document(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of a single request attempt, before it is attributed to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("non-success status {0}")]
    Status(u16),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read body: {0}")]
    Body(String),
}
