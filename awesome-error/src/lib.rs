//! Error kinds shared by the pool, the statement builders and the ORM.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Pool could not be created, or was used after `destroy`
    #[error("connection error: {0}")]
    Connection(String),
    /// No pooled connection became available in time
    #[error("pool checkout timed out: {0}")]
    Timeout(String),
    /// Statement preparation or execution failed
    #[error("execution failed: {0}")]
    Database(String),
    /// Blocking task could not be joined
    #[error("runtime error: {0}")]
    Runtime(String),
    /// Column value could not be converted into the field type
    #[error("cannot convert value: {0}")]
    FromValue(String),
    #[error("no such column: {0}")]
    OutOfRange(String),
    #[error("cannot build statement: {0}")]
    QueryBuilder(String),
    #[error("invalid argument: {0}")]
    Argument(String),
    /// Model schema is malformed, e.g. it has no primary key
    #[error("invalid schema: {0}")]
    Schema(String),
}

#[macro_export]
macro_rules! connection {
    ($($arg:tt)*) => { $crate::Error::Connection(format!($($arg)*)) };
}

#[macro_export]
macro_rules! timeout {
    ($($arg:tt)*) => { $crate::Error::Timeout(format!($($arg)*)) };
}

#[macro_export]
macro_rules! database {
    ($($arg:tt)*) => { $crate::Error::Database(format!($($arg)*)) };
}

#[macro_export]
macro_rules! runtime {
    ($($arg:tt)*) => { $crate::Error::Runtime(format!($($arg)*)) };
}

#[macro_export]
macro_rules! from_value {
    ($($arg:tt)*) => { $crate::Error::FromValue(format!($($arg)*)) };
}

#[macro_export]
macro_rules! out_of_range {
    ($($arg:tt)*) => { $crate::Error::OutOfRange(format!($($arg)*)) };
}

#[macro_export]
macro_rules! query_builder {
    ($($arg:tt)*) => { $crate::Error::QueryBuilder(format!($($arg)*)) };
}

#[macro_export]
macro_rules! argument {
    ($($arg:tt)*) => { $crate::Error::Argument(format!($($arg)*)) };
}

#[macro_export]
macro_rules! schema {
    ($($arg:tt)*) => { $crate::Error::Schema(format!($($arg)*)) };
}
