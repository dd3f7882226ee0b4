//! # Sqlite driver
//!
//! r2d2 pooled rusqlite connections. Every call runs on tokio's blocking pool.

use std::collections::HashMap;

use awesome_error::Result;
use r2d2_sqlite::{rusqlite, SqliteConnectionManager};
use tokio::task::spawn_blocking;

use crate::{Backend, Driver, Placeholder, PoolOptions, Row, Value};

pub struct SqliteDriver {
    pool: r2d2::Pool<SqliteConnectionManager>,
}

impl SqliteDriver {
    pub fn open(options: &PoolOptions) -> Result<Self> {
        let mut builder = r2d2::Pool::builder()
            .max_size(options.max_size.max(1))
            .min_idle(Some(options.min_size.min(options.max_size)))
            .connection_timeout(options.checkout_timeout);

        let mgr = match &options.backend {
            Backend::SqliteMemory => {
                // Each in-memory connection is its own database, so a single
                // connection must stay open for the pool's whole life
                log::trace!("Open in-memory database with a single pooled connection");
                builder = builder
                    .max_size(1)
                    .min_idle(Some(1))
                    .idle_timeout(None)
                    .max_lifetime(None);
                SqliteConnectionManager::memory()
            }
            Backend::SqliteFile(path) => {
                log::trace!("Open database file {:?}", path);
                SqliteConnectionManager::file(path)
            }
            other => {
                return Err(awesome_error::connection!(
                    "Sqlite driver cannot open backend {:?}",
                    other
                ))
            }
        };

        let pool = builder
            .build(mgr)
            .map_err(|e| awesome_error::connection!("SQLite connection error: {}", e))?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl Driver for SqliteDriver {
    fn placeholder(&self) -> Placeholder {
        Placeholder::Numbered
    }

    async fn query(&self, sql: String, params: Vec<Value>, size: Option<usize>) -> Result<Vec<Row>> {
        let pool = self.pool.clone();
        spawn_blocking(move || {
            log::trace!("Get connection from pool");
            let conn = pool
                .get()
                .map_err(|e| awesome_error::timeout!("Get connection from pool timeout: {}", e))?;

            log::trace!("Prepare query `{}`", sql);
            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| awesome_error::database!("Prepare query error: {}, sql: `{}`", e, sql))?;

            let sqlite_param: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();
            let mut sql_rows = stmt
                .query(&sqlite_param[..])
                .map_err(|e| awesome_error::database!("Query error: {}", e))?;

            let mut rows = Vec::<Row>::new();
            while let Some(row) = sql_rows
                .next()
                .map_err(|e| awesome_error::database!("Fetch row error: {}", e))?
            {
                if size.map_or(false, |size| rows.len() >= size) {
                    break;
                }
                let row = rusqlite_row_to_row(row)?;
                log::trace!("Append row: {:?}", row);
                rows.push(row);
            }

            Result::Ok(rows)
        })
        .await
        .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))?
    }

    async fn execute(&self, sql: String, params: Vec<Value>, autocommit: bool) -> Result<u64> {
        let pool = self.pool.clone();
        spawn_blocking(move || {
            log::trace!("Get connection from pool");
            let mut conn = pool
                .get()
                .map_err(|e| awesome_error::timeout!("Get connection from pool timeout: {}", e))?;

            let sqlite_param: Vec<&dyn rusqlite::ToSql> =
                params.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

            if autocommit {
                log::trace!("Execute `{}`", sql);
                let affected = conn
                    .execute(&sql, &sqlite_param[..])
                    .map_err(|e| awesome_error::database!("Execute error: {}, sql: `{}`", e, sql))?;

                return Result::Ok(affected as u64);
            }

            log::trace!("Start transaction");
            let tx = conn
                .transaction()
                .map_err(|e| awesome_error::database!("Start transaction error: {}", e))?;

            log::trace!("Execute `{}`", sql);
            match tx.execute(&sql, &sqlite_param[..]) {
                Ok(affected) => {
                    log::trace!("Commit transaction");
                    tx.commit()
                        .map_err(|e| awesome_error::database!("Commit error: {}", e))?;
                    Ok(affected as u64)
                }
                Err(e) => {
                    log::trace!("Rollback transaction");
                    if let Err(rollback_err) = tx.rollback() {
                        log::warn!("Rollback error: {}", rollback_err);
                    }
                    Err(awesome_error::database!("Execute error: {}, sql: `{}`", e, sql))
                }
            }
        })
        .await
        .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))?
    }

    async fn execute_script(&self, sql: String) -> Result<()> {
        let pool = self.pool.clone();
        spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| awesome_error::timeout!("Get connection from pool timeout: {}", e))?;

            log::trace!("Execute batch `{}`", sql);
            conn.execute_batch(&sql)
                .map_err(|e| awesome_error::database!("Execute batch error: {}, sql: `{}`", e, sql))
        })
        .await
        .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))?
    }
}

fn rusqlite_row_to_row(src: &rusqlite::Row<'_>) -> Result<Row> {
    use rusqlite::types::ValueRef;

    let stmt = src.as_ref();

    let mut values = HashMap::new();
    for i in 0..stmt.column_count() {
        let column_name = stmt
            .column_name(i)
            .map_err(|e| awesome_error::database!("Get column name error: {}", e))?
            .to_string();

        let value = match src
            .get_ref(i)
            .map_err(|e| awesome_error::database!("Get column `{}` error: {}", column_name, e))?
        {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(v) => Value::I64(v),
            ValueRef::Real(v) => Value::F64(v),
            ValueRef::Text(v) => Value::Str(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => Value::Bytes(v.to_vec()),
        };
        values.insert(column_name, value);
    }

    Ok(Row::new(values))
}

impl rusqlite::ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            Value::Null => <Option<u8> as rusqlite::ToSql>::to_sql(&None),
            Value::Bool(v) => <bool as rusqlite::ToSql>::to_sql(v),
            Value::I64(v) => <i64 as rusqlite::ToSql>::to_sql(v),
            Value::F64(v) => <f64 as rusqlite::ToSql>::to_sql(v),
            Value::Str(v) => <String as rusqlite::ToSql>::to_sql(v),
            Value::Bytes(v) => <Vec<u8> as rusqlite::ToSql>::to_sql(v),
        }
    }
}
