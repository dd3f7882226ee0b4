use awesome_error::Result;

use crate::quote;

#[derive(Debug, Default, Clone)]
pub struct CreateTableBuilder {
    table: String,
    columns: Vec<(String, String)>, // (name, ddl)
    primary_key: Option<String>,
}

impl CreateTableBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append a `NOT NULL` column
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::create_table("users")
    ///     .column("id", "varchar(50)")
    ///     .column("admin", "bool")
    ///     .primary_key("id")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(
    ///     &sql,
    ///     "CREATE TABLE IF NOT EXISTS `users` (`id` varchar(50) NOT NULL, `admin` bool NOT NULL, PRIMARY KEY (`id`))"
    /// );
    /// ```
    pub fn column(&mut self, name: &str, ddl: &str) -> &mut Self {
        self.columns.push((name.into(), ddl.into()));
        self
    }

    pub fn primary_key(&mut self, name: &str) -> &mut Self {
        self.primary_key = Some(name.into());
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        self.validate()?;

        let mut defs = self
            .columns
            .iter()
            .map(|(name, ddl)| format!("{} {} NOT NULL", quote(name), ddl))
            .collect::<Vec<_>>();

        if let Some(pk) = &self.primary_key {
            defs.push(format!("PRIMARY KEY ({})", quote(pk)));
        }

        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote(&self.table),
            defs.join(", ")
        ))
    }

    fn validate(&self) -> Result<()> {
        if self.columns.is_empty() {
            return Err(awesome_error::query_builder!("Create table without columns"));
        }

        if let Some(pk) = &self.primary_key {
            if !self.columns.iter().any(|(name, _)| name == pk) {
                return Err(awesome_error::query_builder!(
                    "Primary key `{}` is not a column of `{}`",
                    pk,
                    self.table
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::QueryBuilder;

    #[test]
    fn unknown_primary_key() {
        let res = QueryBuilder::create_table("users")
            .column("email", "varchar(50)")
            .primary_key("id")
            .build();

        assert!(matches!(res, Err(awesome_error::Error::QueryBuilder(_))));
    }
}
