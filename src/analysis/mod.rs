// Risk image analysis: collaborator contract, Gemini client and upload intake

pub mod analyzer;
pub mod gemini;
pub mod intake;

pub use analyzer::{AnalysisError, HazardAnalyzer, ImageAnalysis, ImageArtifact};
pub use gemini::GeminiAnalyzer;
pub use intake::{RiskImageIntake, SharedWizard};

#[cfg(any(test, feature = "testing"))]
pub use analyzer::MockHazardAnalyzer;
