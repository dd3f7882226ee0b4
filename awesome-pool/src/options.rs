use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    /// Private in-memory SQLite database, lives as long as the pool
    SqliteMemory,
    SqliteFile(PathBuf),
    Mysql {
        host: String,
        port: u16,
        user: String,
        password: String,
        database: String,
        charset: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PoolOptions {
    pub backend: Backend,
    pub max_size: u32,
    pub min_size: u32,
    pub checkout_timeout: Duration,
    /// Whether model writes run without an explicit transaction
    pub autocommit: bool,
}

impl PoolOptions {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            max_size: 10,
            min_size: 1,
            checkout_timeout: Duration::from_secs(30),
            autocommit: true,
        }
    }

    pub fn memory() -> Self {
        Self::new(Backend::SqliteMemory)
    }

    pub fn sqlite<P: Into<PathBuf>>(path: P) -> Self {
        Self::new(Backend::SqliteFile(path.into()))
    }

    pub fn mysql(host: &str, port: u16, user: &str, password: &str, database: &str) -> Self {
        Self::new(Backend::Mysql {
            host: host.into(),
            port,
            user: user.into(),
            password: password.into(),
            database: database.into(),
            charset: "utf8".into(),
        })
    }

    pub fn max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn min_size(mut self, min_size: u32) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn checkout_timeout(mut self, timeout: Duration) -> Self {
        self.checkout_timeout = timeout;
        self
    }

    pub fn autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }
}
