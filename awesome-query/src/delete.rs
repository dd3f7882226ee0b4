use awesome_error::Result;

use crate::quote;

#[derive(Debug, Default, Clone)]
pub struct DeleteBuilder {
    table: String,
    key: Option<String>,
}

impl DeleteBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Set the key column of the `WHERE key = ?` filter
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::delete("comments").key("id").build().unwrap();
    ///
    /// assert_eq!(&sql, "DELETE FROM `comments` WHERE `id` = ?");
    /// ```
    pub fn key(&mut self, col: &str) -> &mut Self {
        self.key = Some(col.into());
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        let key = self
            .key
            .as_ref()
            .ok_or_else(|| awesome_error::query_builder!("Delete without key column"))?;

        let mut parts = Vec::<String>::new();

        parts.push("DELETE".into());
        parts.push("FROM".into());
        parts.push(quote(&self.table));
        parts.push(format!("WHERE {} = ?", quote(key)));

        Ok(parts.join(" "))
    }
}
