use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

mod cli;

use cli::commands::{
    analyze::AnalyzeCommand, check::CheckCommand, config::ConfigInitCommand, review::ReviewCommand,
    show_usage, template::TemplateCommand, walk::WalkCommand, Command,
};
use cli::{Cli, Commands, ConfigAction};
use contractor_safety::config::{ContractorSafetyConfig, CONFIG_FILE};
use contractor_safety::telemetry::init_telemetry;

fn main() -> Result<()> {
    let Cli {
        config: config_path,
        command,
    } = Cli::parse();

    ContractorSafetyConfig::load_env_file()?;
    let config = match &command {
        // The file being initialized may not exist yet
        Some(Commands::Config { .. }) => ContractorSafetyConfig::default(),
        _ => ContractorSafetyConfig::load(config_path.as_deref())?,
    };
    init_telemetry(&config.observability)?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match command {
            // No subcommand: explain how to get started
            None => show_usage().await,
            Some(Commands::Template) => TemplateCommand::new(&config.form).execute().await,
            Some(Commands::Check { file }) => {
                CheckCommand::new(file, config.form.clone()).execute().await
            }
            Some(Commands::Review { file }) => ReviewCommand::new(file).execute().await,
            Some(Commands::Walk { file, out }) => {
                let pledge_keys = config.form.pledge_keys().map(str::to_string).collect();
                WalkCommand::new(file, out, config.sink.clone(), pledge_keys)
                    .execute()
                    .await
            }
            Some(Commands::Analyze { image, into }) => {
                AnalyzeCommand::new(image, into, config.analyzer.clone())
                    .execute()
                    .await
            }
            Some(Commands::Config {
                action: ConfigAction::Init { force },
            }) => {
                let path = config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
                ConfigInitCommand::new(path, force).execute().await
            }
        }
    })
}
