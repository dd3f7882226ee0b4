use awesome_error::Result;

use crate::quote;

#[derive(Debug, Default, Clone)]
pub struct UpdateBuilder {
    table: String,
    columns: Vec<String>,
    key: Option<String>,
}

impl UpdateBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    pub fn column(&mut self, col: &str) -> &mut Self {
        self.columns.push(col.into());
        self
    }

    pub fn columns(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set the key column of the `WHERE key = ?` filter
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::update("blogs")
    ///     .columns(&["name", "summary"])
    ///     .key("id")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "UPDATE `blogs` SET `name` = ?, `summary` = ? WHERE `id` = ?");
    /// ```
    pub fn key(&mut self, col: &str) -> &mut Self {
        self.key = Some(col.into());
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        self.validate()?;

        let mut parts = Vec::<String>::new();

        parts.push(format!("UPDATE {} SET", quote(&self.table)));
        parts.push(
            self.columns
                .iter()
                .map(|c| format!("{} = ?", quote(c)))
                .collect::<Vec<_>>()
                .join(", "),
        );

        if let Some(key) = &self.key {
            parts.push(format!("WHERE {} = ?", quote(key)));
        }

        Ok(parts.join(" "))
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(awesome_error::query_builder!("Update empty columns"));
        }

        if self.key.is_none() {
            return Err(awesome_error::query_builder!("Update without key column"));
        }

        Ok(())
    }
}
