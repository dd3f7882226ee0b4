mod drivers;
mod options;
mod placeholder;
mod pool;
mod row;
mod value;

pub use options::{Backend, PoolOptions};
pub use placeholder::{translate, Placeholder};
pub use pool::Pool;
pub use row::Row;
pub use value::{format_params, FromValue, ToValue, Value};

pub mod driver {
    #[cfg(feature = "sqlite")]
    pub use crate::drivers::sqlite::SqliteDriver;

    #[cfg(feature = "mysql")]
    pub use crate::drivers::mysql::MysqlDriver;
}

use awesome_error::Result;

/// A database backend behind the pool.
///
/// Statements handed to a driver already use its placeholder syntax. Every
/// call checks a connection out of the backend's own pool and gives it back
/// before returning, whatever the outcome.
#[async_trait::async_trait]
pub trait Driver: Sync + Send {
    fn placeholder(&self) -> Placeholder;

    /// Run a read; at most `size` rows are fetched when it is given
    async fn query(&self, sql: String, params: Vec<Value>, size: Option<usize>)
        -> Result<Vec<Row>>;

    /// Run a mutation and return the affected row count.
    ///
    /// With `autocommit == false` the statement runs inside BEGIN ... COMMIT,
    /// and a failure rolls the transaction back before the error is returned.
    async fn execute(&self, sql: String, params: Vec<Value>, autocommit: bool) -> Result<u64>;

    /// Run parameterless statements separated by `;` (schema setup)
    async fn execute_script(&self, sql: String) -> Result<()>;
}
