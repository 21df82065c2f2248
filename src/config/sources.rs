use super::models::{Config, Secret};
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "VIDBUNDLE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/vidbundle.toml";
const ENV_PREFIX: &str = "VIDBUNDLE";
const ENV_SEPARATOR: &str = "__";

const API_KEY_VARS: [&str; 2] = ["VIDBUNDLE_API_KEY", "PIXABAY_API_KEY"];
const ACCESS_KEY_VAR: &str = "VIDBUNDLE_ACCESS_KEY";

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config_path = env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

    let mut config = load_from_sources(config_path)?;
    load_secrets(&mut config, |name| env::var(name).ok());

    Ok(config)
}

/// Secrets are never read from TOML, only from the environment
pub(crate) fn load_secrets(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    config.api.api_key = API_KEY_VARS
        .iter()
        .find_map(|name| lookup(name))
        .map(Secret::new);

    config.auth.access_key = lookup(ACCESS_KEY_VAR).map(Secret::new);
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::info!(path = %config_path.display(), "Loading configuration file");
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::warn!(
            path = %config_path.display(),
            "Configuration file not found, using defaults and environment overrides"
        );
    }

    // VIDBUNDLE__API__MAX_PAGES -> api.max_pages
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    builder.build()?.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::ByteSize;
    use crate::search::Quality;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(config.api.max_pages, 2);
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[server]
bind_addr = "127.0.0.1:9000"
max_form_bytes = "32KB"

[api]
endpoint = "http://localhost:4000/api/videos/"
per_page = 50
max_pages = 5

[http]
request_timeout_secs = 120
max_asset_bytes = "256MB"

[form]
keyword = "ocean"
quality = "large"
max_count = 10

[archive]
file_name = "clips.zip"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.server.bind_addr.to_string(), "127.0.0.1:9000");
        assert_eq!(config.server.max_form_bytes.as_u64(), 32 * 1024);
        assert_eq!(config.api.per_page, 50);
        assert_eq!(config.api.max_pages, 5);
        assert_eq!(config.http.max_asset_bytes, Some(ByteSize::mib(256)));
        assert_eq!(config.form.keyword, "ocean");
        assert_eq!(config.form.quality, Quality::Large);
        assert_eq!(config.form.count, 5);
        assert_eq!(config.archive.file_name, "clips.zip");
        assert_eq!(config.archive.entry_prefix, "pixabay_video_");
    }

    #[test]
    fn test_secrets_come_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("PIXABAY_API_KEY", "fallback-key"),
            ("VIDBUNDLE_ACCESS_KEY", "gate"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        load_secrets(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.api_key.unwrap().expose(), "fallback-key");
        assert_eq!(config.auth.access_key.unwrap().expose(), "gate");
    }

    #[test]
    fn test_primary_api_key_var_wins() {
        let env: HashMap<&str, &str> = [
            ("VIDBUNDLE_API_KEY", "primary"),
            ("PIXABAY_API_KEY", "fallback"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        load_secrets(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.api.api_key.unwrap().expose(), "primary");
        assert!(config.auth.access_key.is_none());
    }
}
