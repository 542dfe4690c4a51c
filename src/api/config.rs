use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::acquire::{
    AcquisitionPipeline, DEFAULT_ROUTE_TIMEOUT, InstrumentProfile, SnapshotFallback, Transport,
    TransportRoute, default_routes,
};
use crate::api::{DEFAULT_POLL_INTERVAL, PollScheduler};
use crate::error::{OverlayError, OverlayResult};
use crate::render::MarkerStyle;

/// Environment variable prefix, e.g. `CHART_OVERLAY_POLL_INTERVAL_SECS=30`.
pub const ENV_PREFIX: &str = "CHART_OVERLAY";

/// Complete runtime configuration of the overlay.
///
/// Every field has a default, so an empty file (or none at all) is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Built-in instrument profile id (`us10y` or `us20y`).
    pub profile: String,
    /// Overrides the profile's page URL.
    pub target_url: Option<String>,
    pub routes: Vec<TransportRoute>,
    pub route_timeout_secs: f64,
    pub poll_interval_secs: f64,
    pub chart_path: Option<String>,
    pub svg_output: PathBuf,
    pub snapshot_output: PathBuf,
    /// Snapshot consulted before scraping while younger than `snapshot_max_age_secs`.
    pub snapshot_fallback: Option<PathBuf>,
    pub snapshot_max_age_secs: f64,
    pub marker: MarkerStyle,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            profile: "us10y".to_owned(),
            target_url: None,
            routes: default_routes(),
            route_timeout_secs: DEFAULT_ROUTE_TIMEOUT.as_secs_f64(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs_f64(),
            chart_path: None,
            svg_output: PathBuf::from("live.svg"),
            snapshot_output: PathBuf::from("data/yield.json"),
            snapshot_fallback: None,
            snapshot_max_age_secs: 3600.0,
            marker: MarkerStyle::default(),
        }
    }
}

impl OverlayConfig {
    pub fn validate(self) -> OverlayResult<Self> {
        InstrumentProfile::builtin(&self.profile)?;
        if self.routes.is_empty() {
            return Err(OverlayError::Config(
                "at least one transport route is required".to_owned(),
            ));
        }
        if let Some(route) = self.routes.iter().find(|route| route.name.trim().is_empty()) {
            return Err(OverlayError::Config(format!(
                "transport route with base `{}` has no name",
                route.base_url
            )));
        }
        seconds("route_timeout_secs", self.route_timeout_secs)?;
        seconds("poll_interval_secs", self.poll_interval_secs)?;
        seconds("snapshot_max_age_secs", self.snapshot_max_age_secs)?;
        self.marker
            .validate()
            .map_err(|e| OverlayError::Config(format!("marker style: {e}")))?;
        Ok(self)
    }

    /// Resolved instrument profile, with the target URL override applied.
    pub fn instrument(&self) -> OverlayResult<InstrumentProfile> {
        let mut profile = InstrumentProfile::builtin(&self.profile)?;
        if let Some(url) = &self.target_url {
            profile.target_url = url.clone();
        }
        Ok(profile)
    }

    #[must_use]
    pub fn route_timeout(&self) -> Duration {
        Duration::from_secs_f64(self.route_timeout_secs)
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval_secs)
    }

    pub fn pipeline<T: Transport>(&self, transport: T) -> OverlayResult<AcquisitionPipeline<T>> {
        let mut pipeline = AcquisitionPipeline::new(transport, self.instrument()?)?
            .with_routes(self.routes.clone())?
            .with_route_timeout(self.route_timeout())?;
        if let Some(path) = &self.snapshot_fallback {
            pipeline = pipeline.with_fallback(SnapshotFallback::new(
                path.clone(),
                Duration::from_secs_f64(self.snapshot_max_age_secs),
            ));
        }
        Ok(pipeline)
    }

    pub fn scheduler(&self) -> OverlayResult<PollScheduler> {
        Ok(PollScheduler::new(self.poll_interval())?
            .with_translator(crate::api::CalibratedValueTranslator::new(self.marker)?))
    }

    /// Layers an optional file under `CHART_OVERLAY_*` environment variables,
    /// then validates. Nested keys use `__`, e.g. `CHART_OVERLAY_MARKER__RADIUS_PX`.
    #[cfg(feature = "cli")]
    pub fn load(path: Option<&std::path::Path>) -> OverlayResult<Self> {
        use ::config::{Config, Environment, File};

        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let loaded = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| OverlayError::Config(e.to_string()))?;
        let config: Self = loaded
            .try_deserialize()
            .map_err(|e| OverlayError::Config(e.to_string()))?;
        config.validate()
    }
}

fn seconds(name: &str, value: f64) -> OverlayResult<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(OverlayError::Config(format!(
            "{name} must be finite and > 0"
        )));
    }
    Ok(())
}
