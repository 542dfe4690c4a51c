use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::Observation;
use crate::error::{OverlayError, OverlayResult};

/// Persisted reading: the batch output artifact and the optional fallback
/// consulted before scraping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldSnapshot {
    pub yield_value: f64,
    pub day_change_value: f64,
    pub tooltip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl YieldSnapshot {
    #[must_use]
    pub fn from_observation(observation: &Observation) -> Self {
        Self {
            yield_value: observation.value(),
            day_change_value: observation.change(),
            tooltip: observation.label().to_owned(),
            updated_at: Some(observation.observed_at()),
        }
    }

    /// Rebuilds an observation; `fallback_time` stands in for a missing `updatedAt`.
    pub fn to_observation(&self, fallback_time: DateTime<Utc>) -> OverlayResult<Observation> {
        if !self.yield_value.is_finite() {
            return Err(OverlayError::ParseFailure(
                "snapshot yield value is not finite".to_owned(),
            ));
        }
        let change = if self.day_change_value.is_finite() {
            self.day_change_value
        } else {
            0.0
        };
        Ok(Observation::new(
            self.yield_value,
            change,
            self.tooltip.clone(),
            self.updated_at.unwrap_or(fallback_time),
        ))
    }

    pub fn from_json_str(input: &str) -> OverlayResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| OverlayError::ParseFailure(format!("failed to parse snapshot json: {e}")))
    }

    pub fn to_json_pretty(&self) -> OverlayResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| OverlayError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }

    pub async fn read(path: impl AsRef<Path>) -> OverlayResult<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    /// Writes pretty JSON through a temp file rename.
    pub fn write_atomic(&self, path: impl AsRef<Path>) -> OverlayResult<()> {
        let json = self.to_json_pretty()?;
        crate::persist::write_atomic(path.as_ref(), json.as_bytes())
    }
}

/// Local snapshot file preferred over scraping while it is fresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFallback {
    pub path: PathBuf,
    pub max_age: Duration,
}

impl SnapshotFallback {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            path: path.into(),
            max_age,
        }
    }

    /// Returns the stored reading when the file exists, parses and is no
    /// older than `max_age`. Every other case is logged and yields `None`.
    ///
    /// Age comes from `updatedAt`, or the file modification time without it.
    pub async fn load_fresh(&self, now: DateTime<Utc>) -> Option<Observation> {
        let path = self.path.display();
        let snapshot = match YieldSnapshot::read(&self.path).await {
            Ok(snapshot) => snapshot,
            Err(OverlayError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(%path, "no persisted snapshot");
                return None;
            }
            Err(err) => {
                warn!(%path, error = %err, "ignoring unreadable snapshot");
                return None;
            }
        };

        let stamped_at = match snapshot.updated_at {
            Some(updated_at) => updated_at,
            None => match tokio::fs::metadata(&self.path).await.and_then(|m| m.modified()) {
                Ok(modified) => DateTime::<Utc>::from(modified),
                Err(err) => {
                    warn!(%path, error = %err, "snapshot age unknown");
                    return None;
                }
            },
        };

        let age = now.signed_duration_since(stamped_at);
        let fresh = age
            .to_std()
            .map(|age| age <= self.max_age)
            .unwrap_or(true);
        if !fresh {
            debug!(%path, age_secs = age.num_seconds(), "persisted snapshot is stale");
            return None;
        }

        match snapshot.to_observation(stamped_at) {
            Ok(observation) => {
                debug!(%path, value = observation.value(), "using persisted snapshot");
                Some(observation)
            }
            Err(err) => {
                warn!(%path, error = %err, "ignoring invalid snapshot");
                None
            }
        }
    }
}
