//! Application configuration: the embedded defaults merged with an optional
//! override file.

use std::path::{Path, PathBuf};

use awesome_orm::PoolOptions;
use serde::Deserialize;

const DEFAULT_CONFIG: &str = include_str!("../config_default.toml");

/// Environment variable naming the override file
pub const CONFIG_ENV: &str = "AWESOME_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub db: DbConfig,
    pub session: SessionConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DbBackend {
    Sqlite,
    Mysql,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DbConfig {
    pub backend: DbBackend,
    pub path: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub charset: String,
    pub max_size: u32,
    pub min_size: u32,
    pub autocommit: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub cookie_name: String,
    /// Seconds
    pub max_age: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    pub templates: PathBuf,
    pub static_dir: PathBuf,
}

impl Config {
    /// Defaults overridden by `path`, or by the file named in
    /// `AWESOME_CONFIG` when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

        let overrides = match &path {
            Some(path) => {
                log::info!("load config override {:?}", path);
                Some(std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.clone(),
                    source,
                })?)
            }
            None => None,
        };

        Self::from_sources(overrides.as_deref())
    }

    pub fn from_sources(overrides: Option<&str>) -> Result<Self, ConfigError> {
        let mut config: toml::Table = toml::from_str(DEFAULT_CONFIG)?;
        if let Some(overrides) = overrides {
            merge(&mut config, toml::from_str(overrides)?);
        }

        let config: Self = toml::Value::Table(config).try_into()?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.session.secret.is_empty() {
            return Err(ConfigError::Invalid("session.secret must not be empty".into()));
        }
        if self.db.max_size == 0 || self.db.min_size > self.db.max_size {
            return Err(ConfigError::Invalid(format!(
                "db pool size out of range: min {}, max {}",
                self.db.min_size, self.db.max_size
            )));
        }

        Ok(())
    }
}

impl DbConfig {
    pub fn pool_options(&self) -> PoolOptions {
        let options = match self.backend {
            DbBackend::Sqlite if self.path == ":memory:" => PoolOptions::memory(),
            DbBackend::Sqlite => PoolOptions::sqlite(&self.path),
            DbBackend::Mysql => {
                let mut options =
                    PoolOptions::mysql(&self.host, self.port, &self.user, &self.password, &self.database);
                if let awesome_orm::pool::Backend::Mysql { charset, .. } = &mut options.backend {
                    *charset = self.charset.clone();
                }
                options
            }
        };

        options
            .max_size(self.max_size)
            .min_size(self.min_size)
            .autocommit(self.autocommit)
    }
}

/// Recursively replace the keys of `base` by those of `overrides`
fn merge(base: &mut toml::Table, overrides: toml::Table) {
    for (k, v) in overrides {
        if let toml::Value::Table(o) = v {
            if let Some(toml::Value::Table(b)) = base.get_mut(&k) {
                merge(b, o);
                continue;
            }
            base.insert(k, toml::Value::Table(o));
        } else {
            base.insert(k, v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::from_sources(None).unwrap();
        assert_eq!(c.server.port, 9000);
        assert_eq!(c.session.cookie_name, "awesession");
        assert_eq!(c.db.backend, DbBackend::Sqlite);
    }

    #[test]
    fn override_is_merged_per_key() {
        let c = Config::from_sources(Some(
            r#"
            [db]
            backend = "mysql"
            host = "192.168.0.100"

            [session]
            secret = "s3cret"
            "#,
        ))
        .unwrap();

        assert_eq!(c.db.backend, DbBackend::Mysql);
        assert_eq!(c.db.host, "192.168.0.100");
        assert_eq!(c.db.user, "www-data");
        assert_eq!(c.session.secret, "s3cret");
        assert_eq!(c.session.max_age, 86400);

        match c.db.pool_options().backend {
            awesome_orm::pool::Backend::Mysql { host, charset, .. } => {
                assert_eq!(host, "192.168.0.100");
                assert_eq!(charset, "utf8");
            }
            other => panic!("unexpected backend {:?}", other),
        }
    }

    #[test]
    fn bad_override() {
        assert!(matches!(
            Config::from_sources(Some("[db]\nmax_size = 0")),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::from_sources(Some("[server]\nport = \"x\"")),
            Err(ConfigError::Parse(_))
        ));
    }
}
