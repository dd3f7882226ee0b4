//! # MySQL driver
//!
//! Wraps the `mysql` crate's own blocking pool. Charset is applied by an
//! init statement on every new connection.

use std::collections::HashMap;

use awesome_error::Result;
use mysql_lib::prelude::Queryable;
use tokio::task::spawn_blocking;

use crate::{Backend, Driver, Placeholder, PoolOptions, Row, Value};

pub struct MysqlDriver {
    pool: mysql_lib::Pool,
    checkout_timeout: std::time::Duration,
}

impl MysqlDriver {
    pub fn open(options: &PoolOptions) -> Result<Self> {
        let (host, port, user, password, database, charset) = match &options.backend {
            Backend::Mysql {
                host,
                port,
                user,
                password,
                database,
                charset,
            } => (host, *port, user, password, database, charset),
            other => {
                return Err(awesome_error::connection!(
                    "MySQL driver cannot open backend {:?}",
                    other
                ))
            }
        };

        let max = options.max_size.max(1) as usize;
        let min = (options.min_size as usize).min(max);
        let constraints = mysql_lib::PoolConstraints::new(min, max).ok_or_else(|| {
            awesome_error::argument!("Invalid pool size, min: {}, max: {}", min, max)
        })?;

        let opts = mysql_lib::OptsBuilder::new()
            .ip_or_hostname(Some(host.as_str()))
            .tcp_port(port)
            .user(Some(user.as_str()))
            .pass(Some(password.as_str()))
            .db_name(Some(database.as_str()))
            .init(vec![format!("SET NAMES {}", charset)])
            .pool_opts(mysql_lib::PoolOpts::default().with_constraints(constraints));

        log::trace!("Connect to mysql://{}@{}:{}/{}", user, host, port, database);
        let pool = mysql_lib::Pool::new(opts)
            .map_err(|e| awesome_error::connection!("MySQL connection error: {}", e))?;

        Ok(Self {
            pool,
            checkout_timeout: options.checkout_timeout,
        })
    }

    fn get_conn(&self) -> impl FnOnce() -> Result<mysql_lib::PooledConn> {
        let pool = self.pool.clone();
        let timeout = self.checkout_timeout;
        move || {
            log::trace!("Get connection from pool");
            pool.try_get_conn(timeout)
                .map_err(|e| awesome_error::timeout!("Get connection from pool timeout: {}", e))
        }
    }
}

#[async_trait::async_trait]
impl Driver for MysqlDriver {
    fn placeholder(&self) -> Placeholder {
        Placeholder::Question
    }

    async fn query(&self, sql: String, params: Vec<Value>, size: Option<usize>) -> Result<Vec<Row>> {
        let get_conn = self.get_conn();
        spawn_blocking(move || {
            let mut conn = get_conn()?;

            log::trace!("Prepare query `{}`", sql);
            let stmt = conn
                .prep(&sql)
                .map_err(|e| awesome_error::database!("Prepare query error: {}, sql: `{}`", e, sql))?;

            let sql_rows = conn
                .exec_iter(&stmt, params)
                .map_err(|e| awesome_error::database!("Query error: {}", e))?;

            let mut rows = Vec::<Row>::new();
            for res in sql_rows {
                if size.map_or(false, |size| rows.len() >= size) {
                    break;
                }
                let mysql_row = res.map_err(|e| awesome_error::database!("Get row error: {}", e))?;
                let row = mysql_row_to_row(mysql_row)?;
                log::trace!("Append row: {:?}", row);
                rows.push(row);
            }

            Result::Ok(rows)
        })
        .await
        .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))?
    }

    async fn execute(&self, sql: String, params: Vec<Value>, autocommit: bool) -> Result<u64> {
        let get_conn = self.get_conn();
        spawn_blocking(move || {
            let mut conn = get_conn()?;

            if autocommit {
                log::trace!("Execute `{}`", sql);
                conn.exec_drop(&sql, params)
                    .map_err(|e| awesome_error::database!("Execute error: {}, sql: `{}`", e, sql))?;

                return Result::Ok(conn.affected_rows());
            }

            log::trace!("Start transaction");
            let mut tx = conn
                .start_transaction(mysql_lib::TxOpts::default())
                .map_err(|e| awesome_error::database!("Start transaction error: {}", e))?;

            log::trace!("Execute `{}`", sql);
            match tx.exec_drop(&sql, params) {
                Ok(()) => {
                    let affected = tx.affected_rows();
                    log::trace!("Commit transaction");
                    tx.commit()
                        .map_err(|e| awesome_error::database!("Commit error: {}", e))?;
                    Ok(affected)
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
        let get_conn = self.get_conn();
        spawn_blocking(move || {
            let mut conn = get_conn()?;

            log::trace!("Execute batch `{}`", sql);
            conn.query_drop(&sql)
                .map_err(|e| awesome_error::database!("Execute batch error: {}, sql: `{}`", e, sql))
        })
        .await
        .map_err(|e| awesome_error::runtime!("Tokio join error: {}", e))?
    }
}

fn mysql_row_to_row(src: mysql_lib::Row) -> Result<Row> {
    let mut values = HashMap::new();
    let cols = src.columns_ref();
    for i in 0..src.len() {
        let column_name = cols
            .get(i)
            .ok_or_else(|| awesome_error::database!("Cannot get column name of index {}", i))?
            .name_str()
            .to_string();

        if let Some(mysql_value) = src.as_ref(i) {
            let value = match mysql_value {
                mysql_lib::Value::NULL => Value::Null,
                mysql_lib::Value::Bytes(v) => Value::Bytes(v.clone()),
                mysql_lib::Value::Int(v) => Value::I64(*v),
                mysql_lib::Value::UInt(v) => Value::I64(i64::try_from(*v).map_err(|_| {
                    awesome_error::out_of_range!("Column `{}` overflows i64: {}", column_name, v)
                })?),
                mysql_lib::Value::Float(v) => Value::F64(*v as f64),
                mysql_lib::Value::Double(v) => Value::F64(*v),
                other => Value::Str(other.as_sql(true).trim_matches('\'').to_string()),
            };

            values.insert(column_name, value);
        }
    }

    Ok(Row::new(values))
}

impl From<Value> for mysql_lib::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Self::NULL,
            Value::Bool(v) => Self::Int(v as _),
            Value::I64(v) => Self::Int(v),
            Value::F64(v) => Self::Double(v),
            Value::Str(v) => Self::Bytes(v.into_bytes()),
            Value::Bytes(v) => Self::Bytes(v),
        }
    }
}
