use anyhow::Result;
use contractor_safety::form::Review;
use std::path::PathBuf;

use super::{load_submission, Command};

pub struct ReviewCommand {
    file: PathBuf,
}

impl ReviewCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file }
    }
}

impl Command for ReviewCommand {
    async fn execute(&self) -> Result<()> {
        let submission = load_submission(&self.file).await?;
        println!("📋 SUBMISSION REVIEW");
        println!("====================");
        println!();
        print!("{}", Review::new(&submission));
        Ok(())
    }
}
