use std::sync::Once;

use metrics::{Unit, describe_counter, describe_histogram};
use tracing_error::ErrorLayer;
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingSettings};

use super::error::InfraError;

static METRIC_DESCRIPTIONS: Once = Once::new();

/// Install a global tracing subscriber using the provided logging settings.
pub fn init(logging: &LoggingSettings) -> Result<(), InfraError> {
    describe_metrics();

    let env_filter = EnvFilter::builder()
        .with_default_directive(logging.level.into())
        .from_env_lossy();

    let fmt_layer = match logging.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_target(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(ErrorLayer::default())
        .with(fmt_layer)
        .try_init()
        .map_err(|err| {
            InfraError::telemetry(format!("failed to install tracing subscriber: {err}"))
        })
}

fn describe_metrics() {
    METRIC_DESCRIPTIONS.call_once(|| {
        describe_counter!(
            "scopa_purge_flush_total",
            Unit::Count,
            "Total number of purge calls issued to the dispatcher."
        );
        describe_counter!(
            "scopa_purge_flush_failed_total",
            Unit::Count,
            "Total number of purge calls that failed (per path, not retried)."
        );
        describe_counter!(
            "scopa_full_clear_total",
            Unit::Count,
            "Total number of passes that short-circuited to a full clear."
        );
        describe_histogram!(
            "scopa_invalidation_pass_ms",
            Unit::Milliseconds,
            "End-to-end invalidation pass latency in milliseconds."
        );
        describe_histogram!(
            "scopa_resolved_paths",
            Unit::Count,
            "Resolved path count per pass before reduction."
        );
    });
}
