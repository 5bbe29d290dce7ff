//! The `org` command: show the default dev hub or look an org up by id.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::GlobalConfig;
use crate::resolver::IdentityResolver;
use crate::sfdx::Gateway;

#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("query").required(true).multiple(true).args(["dev", "id"])))]
pub struct OrgCommand {
    /// Show the default dev hub
    #[arg(short, long)]
    pub dev: bool,

    /// Show the org with this org id
    #[arg(short, long, value_name = "ORG_ID")]
    pub id: Option<String>,
}

impl OrgCommand {
    pub async fn execute_with<G: Gateway>(self, gateway: &G, config: &GlobalConfig) -> Result<()> {
        gateway.ensure_available()?;
        let mut resolver = IdentityResolver::new(config.version_ordering, config.cache_ttl());
        for (org_id, username) in self.lookup(gateway, &mut resolver).await? {
            println!("{} {org_id}", "Org ID:".bold());
            println!("{} {username}", "UserName:".bold());
        }
        Ok(())
    }

    /// `(org id, username)` for each requested org, dev hub first.
    pub async fn lookup<G: Gateway>(
        &self,
        gateway: &G,
        resolver: &mut IdentityResolver,
    ) -> Result<Vec<(String, String)>> {
        let mut found = Vec::new();
        if self.dev {
            let hub = resolver.default_dev_hub(gateway).await?;
            found.push((hub.org_id, hub.username));
        }
        if let Some(id) = &self.id {
            found.push(resolver.find_org_by_id(gateway, id).await?);
        }
        Ok(found)
    }
}
