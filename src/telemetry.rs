use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

use crate::config::{LogFormat, ObservabilityConfig};

/// Initialize structured logging.
/// `RUST_LOG` wins over the configured level when set.
pub fn init_telemetry(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
        LogFormat::Pretty => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }

    tracing::debug!(format = ?config.log_format, "Telemetry initialized");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> Uuid {
    Uuid::new_v4()
}

/// Create a span with common submission attributes
pub fn create_submission_span(operation: &str, correlation_id: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "submission",
        operation = operation,
        correlation.id = correlation_id,
        otel.kind = "internal"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correlation_ids_are_unique_uuids() {
        let first = generate_correlation_id();
        let second = generate_correlation_id();
        assert_ne!(first, second);
        assert_eq!(first.get_version_num(), 4);
    }
}
