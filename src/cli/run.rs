use anyhow::Result;
use clap::Args;
use tracing::debug;

use crate::config::Settings;
use crate::tui;

/// Start the interactive demo host
#[derive(Args, Default)]
pub struct RunCommand {
    /// Disable mouse capture for this session
    #[arg(long = "no-mouse")]
    pub no_mouse: bool,
}

impl RunCommand {
    pub async fn execute(&self, settings: &Settings) -> Result<()> {
        debug!("Executing run command");

        let mut settings = settings.clone();
        if self.no_mouse {
            settings.mouse_enabled = false;
        }
        settings.validate()?;

        tui::run(settings).await
    }
}
