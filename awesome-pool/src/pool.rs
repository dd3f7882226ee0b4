use std::sync::{Arc, RwLock};

use awesome_error::Result;

use crate::{format_params, placeholder, Backend, Driver, PoolOptions, Row, Value};

/// Handle to the process' connection pool.
///
/// Cloning is cheap; all clones share one backend. The pool serves queries
/// from [`Pool::create`] until [`Pool::destroy`], after which every call fails
/// with a connection error.
#[derive(Clone)]
pub struct Pool {
    inner: Arc<RwLock<Option<Arc<dyn Driver>>>>,
    autocommit: bool,
}

impl Pool {
    pub async fn create(options: PoolOptions) -> Result<Self> {
        log::info!("create database connection pool ...");

        let autocommit = options.autocommit;
        let driver: Arc<dyn Driver> = if matches!(options.backend, Backend::Mysql { .. }) {
            Self::open_mysql(options).await?
        } else {
            Self::open_sqlite(options).await?
        };

        Ok(Self::from_driver(driver).with_autocommit(autocommit))
    }

    pub fn from_driver(driver: Arc<dyn Driver>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(driver))),
            autocommit: true,
        }
    }

    pub fn with_autocommit(mut self, autocommit: bool) -> Self {
        self.autocommit = autocommit;
        self
    }

    /// Default commit mode for model writes
    pub fn autocommit(&self) -> bool {
        self.autocommit
    }

    /// Run a read statement written with `?` placeholders
    pub async fn select(&self, sql: &str, params: Vec<Value>, size: Option<usize>) -> Result<Vec<Row>> {
        log::info!("SQL: [{}] args: {}", sql, format_params(&params));

        let driver = self.driver()?;
        let sql = placeholder::translate(sql, driver.placeholder());
        let rows = driver.query(sql, params, size).await?;
        log::info!("rows returned: {}", rows.len());

        Ok(rows)
    }

    /// Run a write statement written with `?` placeholders, returns the affected row count
    pub async fn execute(&self, sql: &str, params: Vec<Value>, autocommit: bool) -> Result<u64> {
        log::info!("SQL: [{}] args: {}", sql, format_params(&params));

        let driver = self.driver()?;
        let sql = placeholder::translate(sql, driver.placeholder());
        driver.execute(sql, params, autocommit).await
    }

    pub async fn execute_script(&self, sql: &str) -> Result<()> {
        log::info!("SQL: [{}]", sql);

        self.driver()?.execute_script(sql.to_string()).await
    }

    pub fn is_serving(&self) -> bool {
        self.inner.read().map(|d| d.is_some()).unwrap_or(false)
    }

    /// Close every pooled connection. Connections checked out by in-flight
    /// queries are closed once those queries give them back.
    pub async fn destroy(&self) {
        let driver = match self.inner.write() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };

        if driver.is_some() {
            log::info!("destroy database connection pool");
        }
    }

    fn driver(&self) -> Result<Arc<dyn Driver>> {
        let guard = self
            .inner
            .read()
            .map_err(|e| awesome_error::connection!("Pool lock error: {}", e))?;

        guard
            .clone()
            .ok_or_else(|| awesome_error::connection!("Pool is not serving, create it first"))
    }

    #[cfg(feature = "sqlite")]
    async fn open_sqlite(options: PoolOptions) -> Result<Arc<dyn Driver>> {
        let driver = tokio::task::spawn_blocking(move || crate::drivers::sqlite::SqliteDriver::open(&options))
            .await
            .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))??;

        Ok(Arc::new(driver))
    }

    #[cfg(not(feature = "sqlite"))]
    async fn open_sqlite(_options: PoolOptions) -> Result<Arc<dyn Driver>> {
        Err(awesome_error::connection!("SQLite support is not enabled, build with feature `sqlite`"))
    }

    #[cfg(feature = "mysql")]
    async fn open_mysql(options: PoolOptions) -> Result<Arc<dyn Driver>> {
        let driver = tokio::task::spawn_blocking(move || crate::drivers::mysql::MysqlDriver::open(&options))
            .await
            .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))??;

        Ok(Arc::new(driver))
    }

    #[cfg(not(feature = "mysql"))]
    async fn open_mysql(_options: PoolOptions) -> Result<Arc<dyn Driver>> {
        Err(awesome_error::connection!("MySQL support is not enabled, build with feature `mysql`"))
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queries_fail_after_destroy() {
        let pool = Pool::create(PoolOptions::memory()).await.unwrap();
        assert!(pool.is_serving());

        pool.destroy().await;

        assert!(!pool.is_serving());
        let err = pool.select("SELECT 1", vec![], None).await.unwrap_err();
        assert!(matches!(err, awesome_error::Error::Connection(_)));
    }

    #[tokio::test]
    async fn select_honours_size() {
        let pool = Pool::create(PoolOptions::memory()).await.unwrap();
        pool.execute_script("CREATE TABLE t (n INTEGER); INSERT INTO t VALUES (1), (2), (3);")
            .await
            .unwrap();

        let rows = pool.select("SELECT n FROM t ORDER BY n", vec![], Some(2)).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get::<i64>("n").unwrap(), 2);
    }

    #[tokio::test]
    async fn failed_transactional_write_rolls_back() {
        let pool = Pool::create(PoolOptions::memory()).await.unwrap();
        pool.execute_script("CREATE TABLE t (n INTEGER PRIMARY KEY)").await.unwrap();
        pool.execute("INSERT INTO t (n) VALUES (?)", vec![Value::I64(1)], false)
            .await
            .unwrap();

        let res = pool
            .execute("INSERT INTO t (n) VALUES (?)", vec![Value::I64(1)], false)
            .await;
        assert!(matches!(res, Err(awesome_error::Error::Database(_))));

        let rows = pool.select("SELECT count(n) _num_ FROM t", vec![], None).await.unwrap();
        assert_eq!(rows[0].get::<i64>("_num_").unwrap(), 1);
    }
}
