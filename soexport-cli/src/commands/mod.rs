pub mod config;
pub mod export;
pub mod tenants;
pub mod types;

pub use config::run_config;
pub use export::run_export;
pub use tenants::run_tenants;
pub use types::run_types;

use anyhow::{bail, Context, Result};
use soexport::config::{default_sigv4_service, SigV4Config, StoreConfig, StoreKind};
use soexport::{MemoryStore, RemoteStore, SavedObjectsStore};
use std::sync::Arc;

use crate::StoreArgs;

/// Fold command-line store flags into the `[store]` section.
pub fn apply_store_args(store: &mut StoreConfig, args: &StoreArgs) -> Result<()> {
    if let Some(path) = &args.store_file {
        store.kind = StoreKind::File;
        store.path = Some(path.clone());
    }
    if let Some(url) = &args.url {
        store.kind = StoreKind::Remote;
        store.url = Some(url.clone());
    }
    if args.username.is_some() {
        store.username = args.username.clone();
    }
    if args.password.is_some() {
        store.password = args.password.clone();
    }
    if args.tenant.is_some() {
        store.tenant = args.tenant.clone();
    }
    if let Some(region) = &args.aws_region {
        let (Some(access_key), Some(secret_key)) =
            (&args.aws_access_key_id, &args.aws_secret_access_key)
        else {
            bail!("--aws-region needs AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY");
        };
        store.username = None;
        store.password = None;
        store.sigv4 = Some(SigV4Config {
            access_key: access_key.clone(),
            secret_key: secret_key.clone(),
            region: region.clone(),
            service: args
                .aws_service
                .clone()
                .unwrap_or_else(default_sigv4_service),
        });
    }
    Ok(())
}

/// A store of either kind, as the engine sees it.
pub enum OpenedStore {
    File(Arc<MemoryStore>),
    Remote(Arc<RemoteStore>),
}

impl OpenedStore {
    pub fn shared(&self) -> Arc<dyn SavedObjectsStore> {
        match self {
            OpenedStore::File(store) => store.clone(),
            OpenedStore::Remote(store) => store.clone(),
        }
    }

    pub async fn types(&self) -> Result<Vec<String>> {
        match self {
            OpenedStore::File(store) => Ok(store.types()),
            OpenedStore::Remote(store) => store
                .allowed_types()
                .await
                .context("Failed to fetch allowed types"),
        }
    }
}

pub fn open_store(config: &StoreConfig) -> Result<OpenedStore> {
    match config.kind {
        StoreKind::File => {
            let Some(path) = &config.path else {
                bail!("No store file given. Use --store-file or set store.path in the config");
            };
            let store = MemoryStore::from_ndjson_path(path)
                .with_context(|| format!("Failed to load store file {}", path.display()))?;
            tracing::info!("Loaded {} objects from {}", store.len(), path.display());
            Ok(OpenedStore::File(Arc::new(store)))
        }
        StoreKind::Remote => {
            let store = RemoteStore::new(config).context("Failed to create remote store")?;
            tracing::info!("Using remote store {}", store.url());
            Ok(OpenedStore::Remote(Arc::new(store)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_store_flags_override_config() {
        let mut store = StoreConfig::default();
        apply_store_args(
            &mut store,
            &StoreArgs {
                url: Some("http://localhost:5601".to_string()),
                tenant: Some("global".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.kind, StoreKind::Remote);
        assert_eq!(store.url.as_deref(), Some("http://localhost:5601"));
        assert_eq!(store.tenant.as_deref(), Some("global"));
        assert_eq!(store.username, None);
    }

    #[test]
    fn test_store_file_flag() {
        let mut store = StoreConfig {
            kind: StoreKind::Remote,
            ..Default::default()
        };
        apply_store_args(
            &mut store,
            &StoreArgs {
                store_file: Some(PathBuf::from("objects.ndjson")),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.kind, StoreKind::File);
        assert_eq!(store.path, Some(PathBuf::from("objects.ndjson")));
    }

    #[test]
    fn test_aws_flags_switch_to_sigv4() {
        let mut store = StoreConfig {
            username: Some("admin".to_string()),
            password: Some("admin".to_string()),
            ..Default::default()
        };
        apply_store_args(
            &mut store,
            &StoreArgs {
                url: Some("https://search.example.com".to_string()),
                aws_region: Some("eu-west-1".to_string()),
                aws_access_key_id: Some("AKIDEXAMPLE".to_string()),
                aws_secret_access_key: Some("secret".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(store.username, None);
        let sigv4 = store.sigv4.unwrap();
        assert_eq!(sigv4.region, "eu-west-1");
        assert_eq!(sigv4.service, "es");
    }

    #[test]
    fn test_aws_region_needs_keys() {
        let mut store = StoreConfig::default();
        let result = apply_store_args(
            &mut store,
            &StoreArgs {
                aws_region: Some("eu-west-1".to_string()),
                ..Default::default()
            },
        );
        assert!(result.is_err());
        assert!(store.sigv4.is_none());
    }

    #[test]
    fn test_open_file_store_requires_path() {
        assert!(open_store(&StoreConfig::default()).is_err());
    }
}
