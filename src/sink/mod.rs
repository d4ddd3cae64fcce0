//! Submission sinks
//!
//! A sink receives the frozen record produced by `submit()`. The protocol on
//! the other side (server, archive, log pipeline) is the sink's business; the
//! form only guarantees the record is complete and immutable.
//!
//! # Examples
//!
//! ```rust,no_run
//! use contractor_safety::sink::{JsonFileSink, SubmissionSink};
//! # async fn deliver(record: contractor_safety::form::SubmittedRecord) -> Result<(), contractor_safety::sink::SinkError> {
//! let sink = JsonFileSink::new("submissions");
//! let receipt = sink.deliver(&record).await?;
//! println!("stored at {receipt}");
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::SinkConfig;
use crate::form::SubmittedRecord;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to write submission: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize submission: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for submitted records. Returns a human-readable receipt.
#[async_trait]
pub trait SubmissionSink: Send + Sync {
    async fn deliver(&self, record: &SubmittedRecord) -> Result<String, SinkError>;
}

/// Emits the record as a structured tracing event.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

#[async_trait]
impl SubmissionSink for LogSink {
    async fn deliver(&self, record: &SubmittedRecord) -> Result<String, SinkError> {
        let payload = serde_json::to_string(record)?;
        tracing::info!(
            correlation.id = %record.correlation_id,
            submitted_at = %record.submitted_at,
            payload = %payload,
            "Form submitted"
        );
        Ok(format!("logged submission {}", record.correlation_id))
    }
}

/// Writes each record to `<dir>/<correlation-id>.json`.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    dir: PathBuf,
}

impl JsonFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, record: &SubmittedRecord) -> PathBuf {
        self.dir.join(format!("{}.json", record.correlation_id))
    }
}

#[async_trait]
impl SubmissionSink for JsonFileSink {
    async fn deliver(&self, record: &SubmittedRecord) -> Result<String, SinkError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(record);
        let contents = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, contents).await?;
        tracing::info!(
            correlation.id = %record.correlation_id,
            path = %path.display(),
            "Submission written"
        );
        Ok(path.display().to_string())
    }
}

/// Pick the sink for this run: an explicit directory wins over the
/// configured one, and with neither the record is only logged.
pub fn sink_for(config: &SinkConfig, dir_override: Option<PathBuf>) -> Box<dyn SubmissionSink> {
    match dir_override.or_else(|| config.output_dir.clone()) {
        Some(dir) => Box::new(JsonFileSink::new(dir)),
        None => Box::new(LogSink),
    }
}
