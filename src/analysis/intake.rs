use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, Instrument};

use super::analyzer::{AnalysisError, HazardAnalyzer, ImageArtifact};
use crate::form::SubmissionWizard;
use crate::telemetry::create_submission_span;

/// Wizard shared between the UI loop and in-flight analysis calls.
pub type SharedWizard = Arc<Mutex<SubmissionWizard>>;

/// Upload control for the risk-assessment page. At most one analysis runs
/// at a time; its result is appended to the wizard in a single event.
pub struct RiskImageIntake {
    analyzer: Arc<dyn HazardAnalyzer>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag however the scan ends.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl RiskImageIntake {
    pub fn new(analyzer: Arc<dyn HazardAnalyzer>) -> Self {
        Self {
            analyzer,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn try_begin(&self) -> Result<InFlightGuard<'_>, AnalysisError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlightGuard(&self.in_flight))
            .map_err(|_| AnalysisError::InProgress)
    }

    /// Analyze `image` and append one risk row per hazard. Returns how many
    /// rows were appended. The wizard lock is not held while the analyzer
    /// runs, and the append applies whatever step is current when it returns.
    pub async fn scan(&self, wizard: &SharedWizard, image: ImageArtifact) -> Result<usize, AnalysisError> {
        let _guard = self.try_begin()?;
        let correlation_id = wizard.lock().await.correlation_id().to_string();
        let span = create_submission_span("risk_image_scan", Some(&correlation_id));

        async {
            let analysis = self.analyzer.analyze(&image).await.map_err(|e| {
                error!(error = %e, "Image analysis failed, risk assessment unchanged");
                e
            })?;

            let items = analysis.into_risk_items();
            let mut wizard = wizard.lock().await;
            let appended = wizard.append_risk_items(items)?;
            info!(appended, step = %wizard.current_step(), "Applied image analysis result");
            Ok::<usize, AnalysisError>(appended)
        }
        .instrument(span)
        .await
    }
}
