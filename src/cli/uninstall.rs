//! The `uninstall` command.
//!
//! Removes one package from an org and from the project manifest. The
//! package's dependencies are left in place.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use crate::config::GlobalConfig;
use crate::installer::{InstallOptions, Installer};
use crate::sfdx::Gateway;

#[derive(Args, Debug)]
pub struct UninstallCommand {
    /// Target org alias, org id or username
    #[arg(short, long)]
    pub org: String,

    /// Package name, `name@version`, package id or version id
    #[arg(short, long)]
    pub pkg: String,
}

impl UninstallCommand {
    pub async fn execute_with<G: Gateway>(
        self,
        gateway: &G,
        config: &GlobalConfig,
        cwd: &Path,
        quiet: bool,
    ) -> Result<()> {
        let options = InstallOptions::from_config(config, quiet);
        let mut installer = Installer::prepare(gateway, cwd, options)?;
        installer.uninstall(&self.org, &self.pkg).await?;
        Ok(())
    }
}
