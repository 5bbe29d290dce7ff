//! Command-line interface for dxpm.
//!
//! ```bash
//! dxpm install -o my-scratch -p Logger@2.1.0.3
//! dxpm install -o my-scratch                       # every project dependency
//! dxpm install -o fresh -c -f config/project-scratch-def.json -p Logger
//! dxpm uninstall -o my-scratch -p Logger
//! dxpm org --dev
//! dxpm org --id 00D5g000004ABCD
//! ```
//!
//! Global flags: `-v/--verbose` enables debug logging (unless `RUST_LOG` is
//! set), `-q/--quiet` suppresses progress output, and `--config <PATH>` reads
//! settings from a specific file instead of `~/.dxpm/config.toml`.
//!
//! Each command has an `execute` entry point that builds the real `sfdx`
//! gateway and an `execute_with` variant that takes any [`Gateway`] and a
//! starting directory, which is what the tests drive.

mod install;
mod org;
mod uninstall;


use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::GlobalConfig;
use crate::sfdx::{Gateway, SfdxCli};

pub use install::InstallCommand;
pub use org::OrgCommand;
pub use uninstall::UninstallCommand;

/// Package manager for Salesforce DX projects.
#[derive(Parser, Debug)]
#[command(name = "dxpm", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress progress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the global config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install a package and its dependencies into an org
    Install(InstallCommand),
    /// Uninstall a package from an org
    Uninstall(UninstallCommand),
    /// Show org information
    Org(OrgCommand),
}

impl Cli {
    /// Default filter directive when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose { "dxpm=debug" } else { "dxpm=warn" }
    }

    /// Load configuration and run the selected command against `sfdx`.
    pub async fn execute(self) -> Result<()> {
        let config = GlobalConfig::load(self.config.as_deref())?;
        let gateway = SfdxCli::new(config.sfdx_binary.clone());
        let cwd = std::env::current_dir()?;
        self.execute_with(&gateway, &config, cwd).await
    }

    /// Run the selected command with an explicit gateway and working directory.
    pub async fn execute_with<G: Gateway>(
        self,
        gateway: &G,
        config: &GlobalConfig,
        cwd: PathBuf,
    ) -> Result<()> {
        tracing::debug!(target: "dxpm::cli", "running {:?}", self.command);
        match self.command {
            Commands::Install(cmd) => cmd.execute_with(gateway, config, &cwd, self.quiet).await,
            Commands::Uninstall(cmd) => cmd.execute_with(gateway, config, &cwd, self.quiet).await,
            Commands::Org(cmd) => cmd.execute_with(gateway, config).await,
        }
    }
}
