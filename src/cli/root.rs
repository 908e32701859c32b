use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use tracing::{debug, info};

use super::run::RunCommand;
use super::schema::SchemaCommand;
use crate::config::Settings;

/// popkit - popup dialog controller with a terminal demo host
#[derive(Parser)]
#[command(
    name = "popkit",
    version,
    about = "Popup dialog controller with a terminal demo host",
    long_about = r#"popkit manages modal popups over a headless page model: open/close,
focus trapping, scroll locking, outside-click and Escape dismissal,
cross-modal navigation and scroll-to-anchor CTAs.

Examples:
  popkit                          # Start the interactive demo
  popkit run --no-mouse           # Demo without mouse capture
  popkit schema --pretty          # Print the settings JSON schema"#
)]
pub struct Cli {
    /// Path to a JSON settings file
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive demo host
    Run(RunCommand),

    /// Generate the settings JSON schema
    Schema(SchemaCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.debug {
            debug!("Debug logging enabled");
        }

        let settings = Settings::init(self.config.clone()).await?;
        debug!("Settings initialized");

        match self.command {
            Some(Commands::Run(run_cmd)) => run_cmd.execute(&settings).await,
            Some(Commands::Schema(schema_cmd)) => schema_cmd.execute(),
            Some(Commands::Completions { shell }) => {
                clap_complete::generate(shell, &mut Cli::command(), "popkit", &mut io::stdout());
                Ok(())
            }
            None => {
                info!("Starting interactive demo");
                RunCommand::default().execute(&settings).await
            }
        }
    }
}
