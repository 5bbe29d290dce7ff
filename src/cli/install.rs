//! The `install` command.
//!
//! With `--pkg`, installs one package (and everything it depends on) into the
//! target org. Without it, installs every dependency listed in the project's
//! `sfdx-project.json`. `--create` first creates a scratch org from the
//! definition given with `--file`, aliased to the `--org` value.
//!
//! ```bash
//! dxpm install --org dev --pkg Logger
//! dxpm install -o dev -p Logger@2.1.0.3
//! dxpm install -o ci -c -f config/project-scratch-def.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::Args;

use crate::config::GlobalConfig;
use crate::installer::{InstallOptions, Installer};
use crate::sfdx::Gateway;

#[derive(Args, Debug)]
pub struct InstallCommand {
    /// Target org alias, org id or username
    #[arg(short, long)]
    pub org: String,

    /// Package name, `name@version`, package id or version id
    ///
    /// When omitted, all dependencies declared in sfdx-project.json are
    /// installed.
    #[arg(short, long)]
    pub pkg: Option<String>,

    /// Create a scratch org aliased to `--org` before installing
    #[arg(short, long, requires = "file")]
    pub create: bool,

    /// Scratch org definition file used with `--create`
    #[arg(short, long, value_name = "DEF")]
    pub file: Option<PathBuf>,

    /// Record the package in sfdx-project.json (always done; kept for
    /// compatibility)
    #[arg(short, long)]
    pub save: bool,
}

impl InstallCommand {
    pub async fn execute_with<G: Gateway>(
        self,
        gateway: &G,
        config: &GlobalConfig,
        cwd: &Path,
        quiet: bool,
    ) -> Result<()> {
        let options = InstallOptions::from_config(config, quiet);
        let mut installer = Installer::prepare(gateway, cwd, options)?;

        if self.create {
            if let Some(definition) = &self.file {
                installer.create_scratch_org(definition, &self.org).await?;
            }
        }

        match &self.pkg {
            Some(pkg) => {
                installer.install(&self.org, pkg).await?;
            }
            None => {
                installer.install_project(&self.org).await?;
            }
        }
        Ok(())
    }
}
