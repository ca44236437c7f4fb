//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up pscan CLI defaults.

use crate::cli::OutputFormat;
use crate::config::Config;
use anyhow::Result;

/// Settings passed on the command line
#[derive(Debug, Default)]
pub struct Changes {
    pub max_depth: Option<usize>,
    pub format: Option<OutputFormat>,
    pub pretty: Option<bool>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.max_depth.is_none() && self.format.is_none() && self.pretty.is_none()
    }

    /// Apply to `config`, leaving unset keys alone
    fn apply(self, config: &mut Config) {
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if let Some(format) = self.format {
            config.format = Some(format);
        }
        if let Some(pretty) = self.pretty {
            config.pretty = Some(pretty);
        }
    }
}

/// Handle the configure command
pub fn handle(changes: Changes, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if changes.is_empty() {
        show_usage();
        return Ok(());
    }

    changes.apply(&mut config);
    config.save()?;

    println!("Configuration updated");
    if let Ok(path) = Config::config_path() {
        println!("Config saved to: {}", path.display());
    }

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config) {
    println!("Max depth: {}", config.max_depth(None));
    println!("Format: {:?}", config.format(None));
    println!("Pretty: {}", config.pretty(None));

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: pscan configure [--max-depth N] [--format xml|json] [--pretty true|false]");
    println!("   or: pscan configure --show");
}
