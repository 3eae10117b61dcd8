use anyhow::Result;
use soexport::Config;

use super::open_store;

/// Print the object types the store can export, one per line.
pub async fn run_types(config: &Config) -> Result<()> {
    let store = open_store(&config.store)?;
    for object_type in store.types().await? {
        println!("{}", object_type);
    }
    Ok(())
}
