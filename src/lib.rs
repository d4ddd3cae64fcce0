// Contractor Safety Library - Contractor safety-submission wizard
// This exposes the form core, the image-analysis collaborator and the sinks

pub mod analysis;
pub mod config;
pub mod form;
pub mod sink;
pub mod telemetry;

// Re-export key types for easy access
pub use analysis::{
    AnalysisError, GeminiAnalyzer, HazardAnalyzer, ImageAnalysis, ImageArtifact, RiskImageIntake,
    SharedWizard,
};
pub use config::ContractorSafetyConfig;
pub use form::{FormError, Step, Submission, SubmissionWizard, SubmittedRecord};
pub use sink::{sink_for, JsonFileSink, LogSink, SinkError, SubmissionSink};
pub use telemetry::{create_submission_span, generate_correlation_id, init_telemetry};
