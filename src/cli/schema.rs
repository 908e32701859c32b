//! Schema command for settings documentation

use anyhow::{Context, Result};
use clap::Args;
use schemars::schema_for;
use std::fs;
use std::path::PathBuf;

use crate::config::Settings;

/// Generate the settings JSON schema
#[derive(Debug, Args)]
pub struct SchemaCommand {
    /// Output file path (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty print the output
    #[arg(short, long)]
    pub pretty: bool,
}

impl SchemaCommand {
    pub fn execute(&self) -> Result<()> {
        let schema = schema_for!(Settings);
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&schema)?
        } else {
            serde_json::to_string(&schema)?
        };

        match &self.output {
            Some(path) => {
                fs::write(path, rendered)
                    .with_context(|| format!("Failed to write schema to {}", path.display()))?;
            }
            None => println!("{rendered}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_names_all_settings_fields() {
        let schema = schema_for!(Settings);
        let rendered = serde_json::to_string(&schema).unwrap();
        for field in [
            "scroll_settle_ms",
            "smooth_scroll",
            "mouse_enabled",
            "tick_rate_ms",
        ] {
            assert!(rendered.contains(field), "schema missing field {field}");
        }
    }
}
