use awesome_error::Result;

use crate::{placeholders, quote};

#[derive(Debug, Default, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
}

impl InsertBuilder {
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

    /// Set columns, one placeholder is rendered per column
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::insert("users")
    ///     .columns(&["email", "name", "id"])
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "INSERT INTO `users` (`email`, `name`, `id`) VALUES (?, ?, ?)");
    /// ```
    pub fn columns(&mut self, cols: &[&str]) -> &mut Self {
        self.columns = cols.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        self.validate()?;

        let mut parts = Vec::<String>::new();

        parts.push(format!("INSERT INTO {}", quote(&self.table)));
        parts.push(format!(
            "({})",
            self.columns
                .iter()
                .map(|c| quote(c))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        parts.push("VALUES".into());
        parts.push(format!("({})", placeholders(self.columns.len())));

        Ok(parts.join(" "))
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(awesome_error::query_builder!("Insert empty columns"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::QueryBuilder;

    #[test]
    fn empty_columns() {
        let res = QueryBuilder::insert("users").build();
        assert!(matches!(res, Err(awesome_error::Error::QueryBuilder(_))));
    }
}
