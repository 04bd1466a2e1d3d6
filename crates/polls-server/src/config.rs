use anyhow::{Context, Result};
use polls_core::admin::AdminSite;
use polls_core::{AppConfig, DEFAULT_LATEST_LIMIT};
use serde::Deserialize;
use std::path::Path;

const ENV_DATABASE_URL: &str = "POLLS_DATABASE_URL";
const ENV_BIND_ADDRESS: &str = "POLLS_BIND_ADDRESS";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub polls: PollsConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://polls.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PollsConfig {
    /// Questions shown on the index page.
    pub latest_limit: i64,
}

impl Default for PollsConfig {
    fn default() -> Self {
        Self {
            latest_limit: DEFAULT_LATEST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub enabled: bool,
    #[serde(flatten)]
    pub site: AdminSite,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            site: AdminSite::default(),
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            Self::parse(&raw).with_context(|| format!("parsing config file {}", path.display()))?
        } else {
            tracing::info!("config file {} not found, using defaults", path.display());
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        if config.database.max_connections == 0 {
            anyhow::bail!("database.max_connections must be at least 1");
        }
        Ok(config)
    }

    fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_DATABASE_URL).filter(|v| !v.trim().is_empty()) {
            self.database.url = url;
        }
        if let Some(addr) = lookup(ENV_BIND_ADDRESS).filter(|v| !v.trim().is_empty()) {
            self.server.bind_address = addr;
        }
    }

    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            latest_limit: self.polls.latest_limit,
            admin_enabled: self.admin.enabled,
            admin_site: self.admin.site.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.polls.latest_limit, 5);
        assert!(config.admin.enabled);
        assert_eq!(config.admin.site, AdminSite::default());
    }

    #[test]
    fn overrides_sections_from_toml() {
        let config = Config::parse(
            r#"
            [server]
            bind_address = "0.0.0.0:9000"

            [database]
            url = "sqlite://data/polls.db?mode=rwc"

            [polls]
            latest_limit = 10

            [admin]
            enabled = false
            site_header = "Survey Admin"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.database.url, "sqlite://data/polls.db?mode=rwc");
        assert_eq!(config.database.max_connections, 5);

        let app = config.app_config();
        assert_eq!(app.latest_limit, 10);
        assert!(!app.admin_enabled);
        assert_eq!(app.admin_site.site_header, "Survey Admin");
        assert_eq!(app.admin_site.site_title, "Polls Admin Portal");
    }

    #[test]
    fn rejects_zero_connections() {
        assert!(Config::parse("[database]\nmax_connections = 0").is_err());
    }

    #[test]
    fn env_overrides_win_over_file() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_DATABASE_URL => Some("sqlite::memory:".to_string()),
            ENV_BIND_ADDRESS => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.polls.latest_limit, 5);
    }

    #[test]
    fn loads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("polls.toml");
        std::fs::write(&path, "[polls]\nlatest_limit = 3\n").unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.polls.latest_limit, 3);
    }
}
