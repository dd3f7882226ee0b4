use awesome_error::Result;
use awesome_pool::{Pool, Row, ToValue, Value};
use awesome_query::QueryBuilder;

use crate::{Field, FindOption, Schema};

/// A record type mapped onto one table.
///
/// The accessors are usually generated by `#[derive(Model)]`; the CRUD
/// operations are provided on top of them.
#[async_trait::async_trait]
pub trait Model: Sized + Send + Sync {
    /// Schema shared by every instance, built on first use
    fn schema() -> Result<&'static Schema>;

    /// Hydrate an instance from a `SELECT *` row
    fn from_row(row: &Row) -> Result<Self>;

    /// Current value of `field`, `None` when the model has no such field
    fn get_value(&self, field: &str) -> Option<Value>;

    fn set_value(&mut self, field: &str, value: Value) -> Result<()>;

    /// Current value of `field`, filled from its default when unset.
    ///
    /// A default is written back into the instance.
    fn get_value_or_default(&mut self, field: &Field) -> Result<Value> {
        let value = self.get_value(field.name()).unwrap_or(Value::Null);
        if !value.is_null() {
            return Ok(value);
        }

        match field.default().produce() {
            Some(default) => {
                log::debug!("using default value for {}: {}", field.name(), default);
                self.set_value(field.name(), default.clone())?;
                Ok(default)
            }
            None => Ok(value),
        }
    }

    fn primary_key_value(&self) -> Result<Value> {
        let pk = Self::schema()?.primary_key();
        Ok(self.get_value(pk.name()).unwrap_or(Value::Null))
    }

    /// Find objects by where clause
    async fn find_all(pool: &Pool, option: FindOption) -> Result<Vec<Self>> {
        let schema = Self::schema()?;

        let mut builder = QueryBuilder::select(schema.table());
        let params = option.update_sql_builder(&mut builder)?;
        let sql = builder.build()?;

        let rows = pool.select(&sql, params, None).await?;
        rows.iter().map(Self::from_row).collect()
    }

    /// Find a single number by select and where, e.g. `count(id)`
    async fn find_number(
        pool: &Pool,
        select_expr: &str,
        where_clause: Option<&str>,
        params: Vec<Value>,
    ) -> Result<Option<Value>> {
        let schema = Self::schema()?;

        let mut builder = QueryBuilder::select(schema.table());
        builder.column(&format!("{} _num_", select_expr));
        if let Some(clause) = where_clause {
            builder.where_clause(clause);
        }
        let sql = builder.build()?;

        let mut rows = pool.select(&sql, params, Some(1)).await?;
        Ok(rows.first_mut().and_then(|row| row.take("_num_")))
    }

    /// Find object by primary key
    async fn find<K>(pool: &Pool, pk: K) -> Result<Option<Self>>
    where
        K: ToValue + Send + Sync,
    {
        let schema = Self::schema()?;

        let sql = QueryBuilder::select(schema.table())
            .where_clause(&schema.key_filter())
            .build()?;

        let rows = pool.select(&sql, vec![pk.to_value()], Some(1)).await?;
        rows.first().map(Self::from_row).transpose()
    }

    /// Insert with every field's value, unset fields take their defaults.
    ///
    /// Returns the affected row count; anything but 1 is logged, not failed.
    async fn save(&mut self, pool: &Pool) -> Result<u64> {
        let schema = Self::schema()?;

        let mut args = Vec::with_capacity(schema.fields().len());
        for field in schema.insert_order() {
            args.push(self.get_value_or_default(field)?);
        }

        let rows = pool.execute(schema.insert_sql(), args, pool.autocommit()).await?;
        if rows != 1 {
            log::warn!("failed to insert record: affected rows: {}", rows);
        }

        Ok(rows)
    }

    async fn update(&self, pool: &Pool) -> Result<u64> {
        let schema = Self::schema()?;

        let mut args = schema
            .non_key_fields()
            .map(|f| self.get_value(f.name()).unwrap_or(Value::Null))
            .collect::<Vec<_>>();
        args.push(self.primary_key_value()?);

        let rows = pool.execute(schema.update_sql(), args, pool.autocommit()).await?;
        if rows != 1 {
            log::warn!("failed to update by primary key: affected rows: {}", rows);
        }

        Ok(rows)
    }

    async fn remove(&self, pool: &Pool) -> Result<u64> {
        let schema = Self::schema()?;

        let args = vec![self.primary_key_value()?];
        let rows = pool.execute(schema.delete_sql(), args, pool.autocommit()).await?;
        if rows != 1 {
            log::warn!("failed to remove by primary key: affected rows: {}", rows);
        }

        Ok(rows)
    }

    /// Create the table when it does not exist yet
    async fn create_table(pool: &Pool) -> Result<()> {
        let sql = Self::schema()?.create_table_sql()?;
        pool.execute_script(&sql).await
    }
}
