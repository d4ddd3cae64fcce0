use anyhow::Result;
use contractor_safety::analysis::{
    GeminiAnalyzer, HazardAnalyzer, ImageArtifact, RiskImageIntake, SharedWizard,
};
use contractor_safety::config::AnalyzerConfig;
use contractor_safety::form::SubmissionWizard;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::{load_submission, save_submission, Command};

pub struct AnalyzeCommand {
    image: PathBuf,
    into: Option<PathBuf>,
    analyzer: AnalyzerConfig,
}

impl AnalyzeCommand {
    pub fn new(image: PathBuf, into: Option<PathBuf>, analyzer: AnalyzerConfig) -> Self {
        Self {
            image,
            into,
            analyzer,
        }
    }
}

/// Scan `image` and append the detected rows to the submission stored at
/// `file`. The file is only rewritten when the scan succeeds.
pub async fn append_to_file(
    analyzer: Arc<dyn HazardAnalyzer>,
    file: &Path,
    image: ImageArtifact,
) -> Result<usize> {
    let submission = load_submission(file).await?;
    let wizard: SharedWizard = Arc::new(Mutex::new(SubmissionWizard::new(submission)));
    let intake = RiskImageIntake::new(analyzer);

    let appended = intake.scan(&wizard, image).await?;

    let wizard = wizard.lock().await;
    save_submission(file, wizard.submission()).await?;
    Ok(appended)
}

impl Command for AnalyzeCommand {
    async fn execute(&self) -> Result<()> {
        let analyzer = GeminiAnalyzer::new(&self.analyzer)?;
        let image = ImageArtifact::from_path(&self.image).await?;

        print!("📷 Analyzing {} ({})... ", self.image.display(), image.mime_type);
        std::io::Write::flush(&mut std::io::stdout())?;

        match &self.into {
            Some(file) => {
                let appended = append_to_file(Arc::new(analyzer), file, image).await?;
                println!("✅");
                println!("📝 Added {} risk rows to {}", appended, file.display());
                if appended > 0 {
                    println!("💡 Fill in reduction measures for each new row before continuing");
                }
            }
            None => {
                let analysis = analyzer.analyze(&image).await?;
                println!("✅");
                println!();
                println!("🔨 Work type: {}", analysis.work_type);
                if analysis.hazards.is_empty() {
                    println!("🟢 No hazards detected");
                }
                for item in analysis.into_risk_items() {
                    println!(
                        "⚠️  {} (likelihood {}, severity {})",
                        item.hazard,
                        item.likelihood.value(),
                        item.severity.value()
                    );
                }
            }
        }
        Ok(())
    }
}
