//! Effective configuration printout.

use anyhow::Result;
use soexport::Config;

const MASK: &str = "********";

/// Render `config` as TOML with store secrets masked.
pub fn render_config(config: &Config) -> Result<String> {
    let mut shown = config.clone();
    if shown.store.password.is_some() {
        shown.store.password = Some(MASK.to_string());
    }
    if let Some(sigv4) = &mut shown.store.sigv4 {
        sigv4.secret_key = MASK.to_string();
    }
    Ok(toml::to_string_pretty(&shown)?)
}

pub fn run_config(config: &Config) -> Result<()> {
    print!("{}", render_config(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_masks_password() {
        let mut config = Config::default();
        config.store.username = Some("admin".to_string());
        config.store.password = Some("hunter2".to_string());

        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains(MASK));
    }

    #[test]
    fn test_render_masks_sigv4_secret() {
        let mut config = Config::default();
        config.store.sigv4 = Some(soexport::config::SigV4Config {
            access_key: "AKIDEXAMPLE".to_string(),
            secret_key: "wJalrXUtnFEMI".to_string(),
            region: "eu-west-1".to_string(),
            service: "es".to_string(),
        });

        let rendered = render_config(&config).unwrap();
        assert!(rendered.contains("[store.sigv4]"));
        assert!(rendered.contains("AKIDEXAMPLE"));
        assert!(!rendered.contains("wJalrXUtnFEMI"));
    }

    #[test]
    fn test_render_round_trips_through_loader() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let mut config = Config::default();
        config.export.size_limit = 42;
        std::fs::write(&path, render_config(&config).unwrap()).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.export.size_limit, 42);
        assert_eq!(loaded.redaction.placeholder, "pleaseUpdateCredentials");
    }
}
