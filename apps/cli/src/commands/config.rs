//! `rebalance config`: inspect or scaffold the engine configuration.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Subcommand;
use rebalance_core::EngineConfig;

use super::common::print_json;
use crate::colors::Palette;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show {
        /// Output as JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Write the built-in defaults to a file
    Init {
        /// Destination file
        #[arg(default_value = crate::config::LOCAL_CONFIG)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn execute(command: &ConfigCommand, config: &EngineConfig) -> Result<()> {
    match command {
        ConfigCommand::Show { json } => {
            if *json {
                return print_json(config);
            }
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
        ConfigCommand::Init { path, force } => {
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            EngineConfig::default().save_to_file(path)?;
            println!("  {} Wrote default configuration to {}", Palette::check(), path.display());
            Ok(())
        }
    }
}
