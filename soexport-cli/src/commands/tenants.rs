use anyhow::{bail, Context, Result};
use soexport::Config;

use super::{open_store, OpenedStore};

/// Print the security tenants visible to the configured user, one per line.
pub async fn run_tenants(config: &Config) -> Result<()> {
    let OpenedStore::Remote(store) = open_store(&config.store)? else {
        bail!("Tenants are only available for a remote store. Use --url");
    };
    let tenants = store.tenants().await.context("Failed to list tenants")?;
    for tenant in &tenants {
        println!("{}", tenant);
    }
    tracing::debug!("{} tenants", tenants.len());
    Ok(())
}
