//! Opt-in tracing setup for the binary and for hosts that do not install
//! their own subscriber. Log lines go to stderr so that stdout stays free for
//! command output.

/// Default filter for a given `-v` count when `RUST_LOG` is unset.
#[must_use]
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "chart_overlay=info,warn",
        1 => "chart_overlay=debug,info",
        _ => "chart_overlay=trace,debug",
    }
}

/// Installs a compact stderr subscriber at the default verbosity.
///
/// Returns `false` when the `telemetry` feature is disabled or a global
/// subscriber is already set.
#[must_use]
pub fn init_default_tracing() -> bool {
    init_tracing(0)
}

/// Installs a compact stderr subscriber; `RUST_LOG` wins over `verbosity`.
#[must_use]
pub fn init_tracing(verbosity: u8) -> bool {
    #[cfg(feature = "telemetry")]
    {
        use tracing_subscriber::EnvFilter;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(verbosity > 0)
            .with_writer(std::io::stderr)
            .compact()
            .try_init()
            .is_ok()
    }

    #[cfg(not(feature = "telemetry"))]
    {
        let _ = verbosity;
        false
    }
}
