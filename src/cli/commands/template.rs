use anyhow::Result;
use contractor_safety::config::FormConfig;
use contractor_safety::form::Submission;

use super::Command;

/// Prints a blank submission, pledge items seeded from config. Output is
/// plain JSON so it can be redirected into a file.
pub struct TemplateCommand {
    pledge_keys: Vec<String>,
}

impl TemplateCommand {
    pub fn new(form: &FormConfig) -> Self {
        Self {
            pledge_keys: form.pledge_keys().map(str::to_string).collect(),
        }
    }

    pub fn render(&self) -> Result<String> {
        let submission = Submission::with_pledge_items(self.pledge_keys.iter().cloned());
        Ok(serde_json::to_string_pretty(&submission)?)
    }
}

impl Command for TemplateCommand {
    async fn execute(&self) -> Result<()> {
        println!("{}", self.render()?);
        Ok(())
    }
}
