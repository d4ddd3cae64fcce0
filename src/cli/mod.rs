use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "contractor-safety")]
#[command(about = "Contractor safety-submission wizard")]
#[command(long_about = "Contractor Safety walks a contractor through project info, safety training, \
                       risk assessment, work permit and safety pledge before a submission is accepted. \
                       Start with 'contractor-safety template' to get a blank submission.")]
pub struct Cli {
    /// Configuration file to load instead of ./contractor-safety.toml
    #[arg(long, global = true, help = "Path to a TOML configuration file")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print a blank submission as JSON
    Template,
    /// Report which steps of a submission are complete
    Check {
        /// Submission JSON file
        file: PathBuf,
    },
    /// Print the confirmation review of a submission
    Review {
        /// Submission JSON file
        file: PathBuf,
    },
    /// Replay a submission through every wizard step and submit it
    Walk {
        /// Submission JSON file
        file: PathBuf,
        /// Directory for the submitted record
        #[arg(long, help = "Write the submitted record as JSON into this directory")]
        out: Option<PathBuf>,
    },
    /// Detect hazards in a site photo
    Analyze {
        /// Image file (jpeg, png, webp, heic)
        image: PathBuf,
        /// Submission file to append the detected risk rows to
        #[arg(long, help = "Append the detected risk rows to this submission file")]
        into: Option<PathBuf>,
    },
    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration file
        #[arg(long, help = "Overwrite an existing configuration file")]
        force: bool,
    },
}
