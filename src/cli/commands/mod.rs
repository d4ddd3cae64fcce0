use anyhow::{Context, Result};
use contractor_safety::form::Submission;
use std::path::Path;

pub mod analyze;
pub mod check;
pub mod config;
pub mod review;
pub mod template;
pub mod walk;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Read a submission JSON file. Missing sections take their defaults.
pub async fn load_submission(path: &Path) -> Result<Submission> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read submission file {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse submission file {}", path.display()))
}

pub async fn save_submission(path: &Path, submission: &Submission) -> Result<()> {
    let contents = serde_json::to_string_pretty(submission)?;
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write submission file {}", path.display()))
}

pub async fn show_usage() -> Result<()> {
    println!("🦺 Contractor Safety - Safety Submission Wizard");
    println!();
    println!("To get started:");
    println!("  📝 contractor-safety template > form.json   # Blank submission");
    println!("  🔍 contractor-safety check form.json        # See what is missing");
    println!("  📋 contractor-safety review form.json       # Confirmation page");
    println!("  🚶 contractor-safety walk form.json         # Step through and submit");
    println!();
    println!("Risk assessment helpers:");
    println!("  📷 contractor-safety analyze site.jpg --into form.json");
    println!();
    println!("💡 Run 'contractor-safety config init' to customize sites and pledge items.");
    Ok(())
}
