use anyhow::Result;
use contractor_safety::config::ContractorSafetyConfig;
use std::path::PathBuf;

use super::Command;

pub struct ConfigInitCommand {
    path: PathBuf,
    force: bool,
}

impl ConfigInitCommand {
    pub fn new(path: PathBuf, force: bool) -> Self {
        Self { path, force }
    }
}

impl Command for ConfigInitCommand {
    async fn execute(&self) -> Result<()> {
        if self.path.exists() && !self.force {
            println!("⚠️  {} already exists", self.path.display());
            println!("   Use --force to overwrite it");
            anyhow::bail!("configuration file already exists");
        }

        ContractorSafetyConfig::default().save_to_file(&self.path)?;
        println!("✅ Wrote default configuration to {}", self.path.display());
        println!("💡 Set GEMINI_API_KEY (or analyzer.api_key) to enable image analysis");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_existing_file_requires_force() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("contractor-safety.toml");
        std::fs::write(&path, "# keep me").unwrap();

        assert!(ConfigInitCommand::new(path.clone(), false).execute().await.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# keep me");

        ConfigInitCommand::new(path.clone(), true).execute().await.unwrap();
        let written = ContractorSafetyConfig::load(Some(&path)).unwrap();
        assert_eq!(written.form.pledge_items.len(), 5);
    }
}
