//! Configuration management for soexport
//!
//! Default config location: ~/.soexport/config.toml

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExportConfig {
    /// Maximum number of objects a single export may contain
    #[serde(default = "default_size_limit")]
    pub size_limit: usize,
    /// Identities per bulk-get request (0 = no chunking)
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_size_limit() -> usize {
    10_000
}

fn default_batch_size() -> usize {
    1000
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            size_limit: default_size_limit(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedactionConfig {
    /// Object type whose credentials are masked on export
    #[serde(default = "default_sensitive_type")]
    pub sensitive_type: String,
    /// Value written in place of every masked credential
    #[serde(default = "default_placeholder")]
    pub placeholder: String,
    /// Auth type -> credential fields to mask
    #[serde(default = "default_credential_fields")]
    pub credential_fields: BTreeMap<String, Vec<String>>,
}

fn default_sensitive_type() -> String {
    "data-source".to_string()
}

fn default_placeholder() -> String {
    "pleaseUpdateCredentials".to_string()
}

fn default_credential_fields() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (
            "username_password".to_string(),
            vec!["username".to_string(), "password".to_string()],
        ),
        (
            "sigv4".to_string(),
            vec!["accessKey".to_string(), "secretKey".to_string()],
        ),
    ])
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            sensitive_type: default_sensitive_type(),
            placeholder: default_placeholder(),
            credential_fields: default_credential_fields(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// NDJSON file loaded into memory
    #[default]
    File,
    /// Remote saved-objects HTTP API
    Remote,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,
    /// NDJSON file for the `file` store
    pub path: Option<PathBuf>,
    /// Base URL for the `remote` store, e.g. https://host/_dashboards
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Security tenant sent with every remote request
    pub tenant: Option<String>,
    /// Remote request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Sign remote requests with AWS SigV4 instead of basic auth
    pub sigv4: Option<SigV4Config>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: None,
            url: None,
            username: None,
            password: None,
            tenant: None,
            timeout_ms: default_timeout_ms(),
            sigv4: None,
        }
    }
}

/// `[store.sigv4]` credentials for managed domains behind IAM.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct SigV4Config {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    /// Signing service name: "es" for managed domains, "aoss" for serverless
    #[serde(default = "default_sigv4_service")]
    pub service: String,
}

pub fn default_sigv4_service() -> String {
    "es".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log output format: "pretty" or "json"
    /// Override with LOG_FORMAT env var
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter string
    /// Override with RUST_LOG env var
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

/// Expand ~ to home directory in path
pub fn expand_tilde(path: &Path) -> Result<PathBuf> {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))?;
        Ok(home.join(rest))
    } else if s == "~" {
        dirs::home_dir().ok_or_else(|| anyhow!("Cannot determine home directory"))
    } else {
        Ok(path.to_path_buf())
    }
}

/// Default config file path (~/.soexport/config.toml)
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".soexport")
        .join("config.toml")
}

impl Config {
    /// Load config from file path
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;
        config.expand_paths()?;
        config.validate()?;
        Ok(config)
    }

    /// Load config from file path if it exists, otherwise use defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Expand ~ in all paths
    fn expand_paths(&mut self) -> Result<()> {
        if let Some(ref p) = self.store.path {
            self.store.path = Some(expand_tilde(p)?);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.export.size_limit == 0 {
            return Err(anyhow!("export.size_limit must be greater than zero"));
        }
        if !matches!(self.observability.log_format.as_str(), "pretty" | "json") {
            return Err(anyhow!(
                "observability.log_format must be 'pretty' or 'json', got '{}'",
                self.observability.log_format
            ));
        }
        if self.store.sigv4.is_some() && self.store.username.is_some() {
            return Err(anyhow!("store.username and store.sigv4 cannot both be set"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.export.size_limit, 10_000);
        assert_eq!(config.export.batch_size, 1000);
        assert_eq!(config.redaction.sensitive_type, "data-source");
        assert_eq!(config.redaction.placeholder, "pleaseUpdateCredentials");
        assert_eq!(
            config.redaction.credential_fields["username_password"],
            vec!["username", "password"]
        );
        assert_eq!(config.store.kind, StoreKind::File);
        assert_eq!(config.observability.log_format, "pretty");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
[export]
size_limit = 500

[store]
kind = "remote"
url = "https://localhost:5601"
"#,
        )
        .unwrap();
        assert_eq!(config.export.size_limit, 500);
        assert_eq!(config.export.batch_size, 1000);
        assert_eq!(config.store.kind, StoreKind::Remote);
        assert_eq!(config.store.timeout_ms, 30_000);
        assert_eq!(config.redaction.placeholder, "pleaseUpdateCredentials");
    }

    #[test]
    fn test_save_and_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.export.size_limit = 42;
        config.store.path = Some(PathBuf::from("/data/objects.ndjson"));
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.export.size_limit, 42);
        assert_eq!(
            loaded.store.path,
            Some(PathBuf::from("/data/objects.ndjson"))
        );
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.export.size_limit, 10_000);
    }

    #[test]
    fn test_rejects_zero_size_limit() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[export]\nsize_limit = 0\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[observability]\nlog_format = \"xml\"\n").unwrap();
        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_sigv4_section() {
        let config: Config = toml::from_str(
            r#"
[store]
kind = "remote"
url = "https://search.example.com"

[store.sigv4]
access_key = "AKIDEXAMPLE"
secret_key = "secret"
region = "eu-west-1"
"#,
        )
        .unwrap();
        let sigv4 = config.store.sigv4.unwrap();
        assert_eq!(sigv4.region, "eu-west-1");
        assert_eq!(sigv4.service, "es");
    }

    #[test]
    fn test_save_and_load_sigv4() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");

        let mut config = Config::default();
        config.store.sigv4 = Some(SigV4Config {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "secret".to_string(),
            region: "us-east-1".to_string(),
            service: "aoss".to_string(),
        });
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.store.sigv4, config.store.sigv4);
    }

    #[test]
    fn test_rejects_basic_auth_with_sigv4() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[store]\nusername = \"admin\"\n\n[store.sigv4]\naccess_key = \"a\"\nsecret_key = \"s\"\nregion = \"us-east-1\"\n",
        )
        .unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("sigv4"));
    }

    #[test]
    fn test_expand_tilde_passthrough() {
        let p = expand_tilde(Path::new("/abs/path")).unwrap();
        assert_eq!(p, PathBuf::from("/abs/path"));
    }
}
