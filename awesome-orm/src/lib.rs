extern crate self as awesome_orm;

mod field;
mod model;
mod options;
mod schema;

pub use async_trait::async_trait;
pub use awesome_error as error;
pub use awesome_macro::Model;
pub use awesome_pool as pool;
pub use awesome_query as query;
pub use once_cell::sync::Lazy;

pub use awesome_pool::{FromValue, Pool, PoolOptions, Row, ToValue, Value};
pub use awesome_query::Limit;
pub use field::{Field, FieldDefault, FieldType};
pub use model::Model;
pub use options::FindOption;
pub use schema::Schema;
