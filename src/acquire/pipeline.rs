use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Local, Utc};
use regex::Regex;
use scraper::Html;
use serde::Serialize;
use tracing::{debug, info, trace, warn};

use crate::acquire::extract::{ColumnLayout, extract_fields, parse_percent};
use crate::acquire::route::{TransportRoute, default_routes};
use crate::acquire::snapshot::SnapshotFallback;
use crate::acquire::strategy::{ParseStrategy, default_strategies};
use crate::acquire::{HttpTransport, InstrumentProfile, Transport};
use crate::api::ObservationProducer;
use crate::core::Observation;
use crate::error::{OverlayError, OverlayResult, TransportError};

pub const DEFAULT_ROUTE_TIMEOUT: Duration = Duration::from_secs(12);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "kebab-case")]
pub enum AttemptOutcome {
    Succeeded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteAttempt {
    pub route: String,
    pub url: String,
    pub outcome: AttemptOutcome,
}

/// Diagnostics of the most recent acquisition call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AcquisitionReport {
    pub snapshot_used: bool,
    pub attempts: Vec<RouteAttempt>,
    pub strategy: Option<String>,
    pub error: Option<String>,
}

impl AcquisitionReport {
    #[must_use]
    pub fn succeeded_route(&self) -> Option<&str> {
        self.attempts
            .iter()
            .find(|attempt| attempt.outcome == AttemptOutcome::Succeeded)
            .map(|attempt| attempt.route.as_str())
    }
}

/// Fetches the instrument page through an ordered list of routes and parses
/// the current reading out of it.
///
/// Each call either yields a fresh [`Observation`] or fails as a whole; no
/// state carries over between calls apart from the diagnostic report.
pub struct AcquisitionPipeline<T: Transport = HttpTransport> {
    transport: T,
    profile: InstrumentProfile,
    label: Regex,
    routes: Vec<TransportRoute>,
    strategies: Vec<Box<dyn ParseStrategy>>,
    layout: ColumnLayout,
    route_timeout: Duration,
    fallback: Option<SnapshotFallback>,
    last_report: Mutex<Option<AcquisitionReport>>,
}

impl<T: Transport> std::fmt::Debug for AcquisitionPipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquisitionPipeline")
            .field("profile", &self.profile.id)
            .field("routes", &self.routes)
            .field("strategies", &self.strategies)
            .field("layout", &self.layout)
            .field("route_timeout", &self.route_timeout)
            .field("fallback", &self.fallback)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> AcquisitionPipeline<T> {
    pub fn new(transport: T, profile: InstrumentProfile) -> OverlayResult<Self> {
        let label = profile.label_regex()?;
        let strategies = default_strategies(&profile.symbol, &label)?;
        Ok(Self {
            transport,
            profile,
            label,
            routes: default_routes(),
            strategies,
            layout: ColumnLayout::default(),
            route_timeout: DEFAULT_ROUTE_TIMEOUT,
            fallback: None,
            last_report: Mutex::new(None),
        })
    }

    pub fn with_routes(mut self, routes: Vec<TransportRoute>) -> OverlayResult<Self> {
        if routes.is_empty() {
            return Err(OverlayError::Config(
                "at least one transport route is required".to_owned(),
            ));
        }
        self.routes = routes;
        Ok(self)
    }

    pub fn with_route_timeout(mut self, timeout: Duration) -> OverlayResult<Self> {
        if timeout.is_zero() {
            return Err(OverlayError::Config(
                "route timeout must be > 0".to_owned(),
            ));
        }
        self.route_timeout = timeout;
        Ok(self)
    }

    pub fn with_strategies(mut self, strategies: Vec<Box<dyn ParseStrategy>>) -> OverlayResult<Self> {
        if strategies.is_empty() {
            return Err(OverlayError::Config(
                "at least one parse strategy is required".to_owned(),
            ));
        }
        self.strategies = strategies;
        Ok(self)
    }

    #[must_use]
    pub fn with_column_layout(mut self, layout: ColumnLayout) -> Self {
        self.layout = layout;
        self
    }

    #[must_use]
    pub fn with_fallback(mut self, fallback: SnapshotFallback) -> Self {
        self.fallback = Some(fallback);
        self
    }

    #[must_use]
    pub fn profile(&self) -> &InstrumentProfile {
        &self.profile
    }

    #[must_use]
    pub fn routes(&self) -> &[TransportRoute] {
        &self.routes
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Report of the most recent call, if any.
    #[must_use]
    pub fn last_report(&self) -> Option<AcquisitionReport> {
        self.last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns `None` on any hard failure; the cause is logged and kept in
    /// [`Self::last_report`].
    pub async fn fetch_observation(&self) -> Option<Observation> {
        match self.try_fetch_observation().await {
            Ok(observation) => Some(observation),
            Err(err) => {
                warn!(profile = %self.profile.id, error = %err, "observation unavailable");
                None
            }
        }
    }

    pub async fn try_fetch_observation(&self) -> OverlayResult<Observation> {
        let mut report = AcquisitionReport::default();
        let result = self.acquire(&mut report).await;
        if let Err(err) = &result {
            report.error = Some(err.to_string());
        }
        *self
            .last_report
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(report);
        result
    }

    async fn acquire(&self, report: &mut AcquisitionReport) -> OverlayResult<Observation> {
        if let Some(fallback) = &self.fallback {
            if let Some(observation) = fallback.load_fresh(Utc::now()).await {
                report.snapshot_used = true;
                return Ok(observation);
            }
        }

        let body = self.fetch_body(report).await?;
        let (strategy, observation) = self.parse_body(&body)?;
        report.strategy = Some(strategy);
        Ok(observation)
    }

    /// Tries each route in order; the first success wins.
    async fn fetch_body(&self, report: &mut AcquisitionReport) -> OverlayResult<String> {
        for route in &self.routes {
            let url = route.request_url(&self.profile.target_url);
            debug!(route = %route.name, %url, "requesting");
            let attempt = tokio::time::timeout(
                self.route_timeout,
                self.transport.get(&url, self.route_timeout),
            )
            .await
            .unwrap_or(Err(TransportError::Timeout(self.route_timeout)));
            match attempt {
                Ok(body) => {
                    info!(route = %route.name, bytes = body.len(), "route succeeded");
                    report.attempts.push(RouteAttempt {
                        route: route.name.clone(),
                        url,
                        outcome: AttemptOutcome::Succeeded,
                    });
                    return Ok(body);
                }
                Err(err) => {
                    let failure = OverlayError::TransportFailure {
                        route: route.name.clone(),
                        reason: err.to_string(),
                    };
                    warn!(error = %failure, "trying next route");
                    report.attempts.push(RouteAttempt {
                        route: route.name.clone(),
                        url,
                        outcome: AttemptOutcome::Failed(err.to_string()),
                    });
                }
            }
        }
        Err(OverlayError::AllRoutesExhausted {
            attempts: report.attempts.len(),
        })
    }

    /// Locates, extracts and normalizes the reading in an HTML body.
    ///
    /// Returns the name of the strategy that matched alongside the observation.
    pub fn parse_body(&self, body: &str) -> OverlayResult<(String, Observation)> {
        let document = Html::parse_document(body);
        let (strategy, row) = self
            .strategies
            .iter()
            .find_map(|strategy| {
                let row = strategy.locate(&document);
                trace!(strategy = strategy.name(), matched = row.is_some(), "parse strategy tried");
                row.map(|row| (strategy.name(), row))
            })
            .ok_or_else(|| {
                OverlayError::ParseFailure(format!(
                    "no row for `{}` found by any strategy",
                    self.profile.id
                ))
            })?;
        debug!(strategy, row = %row.text, "row located");

        let fields = extract_fields(&row, self.layout, &self.label)?;
        let value = parse_percent(&fields.value)?;
        let change = match fields.change.as_deref().map(parse_percent) {
            Some(Ok(change)) => change,
            Some(Err(err)) => {
                debug!(error = %err, "change unparseable, defaulting to 0");
                0.0
            }
            None => 0.0,
        };

        let observed_at = Utc::now();
        let time = fields
            .time
            .unwrap_or_else(|| observed_at.with_timezone(&Local).format("%H:%M:%S").to_string());
        let change_text = match fields.change {
            Some(change) if change.ends_with('%') => change,
            Some(change) => format!("{change}%"),
            None => "0%".to_owned(),
        };
        let label = format!(
            "{}: {}\nChange: {}\nTime: {}",
            self.profile.title, fields.value, change_text, time
        );

        Ok((
            strategy.to_owned(),
            Observation::new(value, change, label, observed_at),
        ))
    }
}

#[async_trait]
impl<T: Transport> ObservationProducer for AcquisitionPipeline<T> {
    async fn produce(&self) -> Option<Observation> {
        self.fetch_observation().await
    }
}
