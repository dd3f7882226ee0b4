use awesome_error::Result;

use crate::{quote, Limit};

#[derive(Debug, Default, Clone)]
pub struct SelectBuilder {
    table: String,
    columns: Vec<String>,
    where_clause: Option<String>,
    order_by: Option<String>,
    limit: Option<Limit>,
}

impl SelectBuilder {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.into(),
            ..Default::default()
        }
    }

    /// Append a column expression, `*` is selected when none is given
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::select("blogs")
    ///     .column("count(id) _num_")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "SELECT count(id) _num_ FROM `blogs`");
    /// ```
    pub fn column(&mut self, expr: &str) -> &mut Self {
        self.columns.push(expr.into());
        self
    }

    /// Set the raw where clause, values must be `?` placeholders
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::QueryBuilder;
    ///
    /// let sql = QueryBuilder::select("users")
    ///     .where_clause("email=?")
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "SELECT * FROM `users` WHERE email=?");
    /// ```
    pub fn where_clause(&mut self, clause: &str) -> &mut Self {
        self.where_clause = Some(clause.into());
        self
    }

    pub fn order_by(&mut self, clause: &str) -> &mut Self {
        self.order_by = Some(clause.into());
        self
    }

    /// Set limit
    ///
    /// # Examples
    ///
    /// ```
    /// use awesome_query::{Limit, QueryBuilder};
    ///
    /// let sql = QueryBuilder::select("blogs")
    ///     .order_by("created_at desc")
    ///     .limit(Limit::Range(10, 5))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(&sql, "SELECT * FROM `blogs` ORDER BY created_at desc LIMIT ?, ?");
    /// ```
    pub fn limit(&mut self, limit: Limit) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Build sql
    pub fn build(&self) -> Result<String> {
        self.validate()?;

        let mut parts = Vec::<String>::new();

        parts.push("SELECT".into());
        if self.columns.is_empty() {
            parts.push("*".into());
        } else {
            parts.push(self.columns.join(", "));
        }

        parts.push("FROM".into());
        parts.push(quote(&self.table));

        if let Some(clause) = &self.where_clause {
            parts.push("WHERE".into());
            parts.push(clause.clone());
        }

        if let Some(clause) = &self.order_by {
            parts.push("ORDER BY".into());
            parts.push(clause.clone());
        }

        if let Some(limit) = &self.limit {
            parts.push(limit.to_sql().into());
        }

        Ok(parts.join(" "))
    }

    fn validate(&self) -> Result<()> {
        if self.table.is_empty() {
            return Err(awesome_error::query_builder!("Select from empty table name"));
        }

        if matches!(&self.where_clause, Some(c) if c.trim().is_empty()) {
            return Err(awesome_error::query_builder!("Empty where clause"));
        }

        if matches!(&self.order_by, Some(c) if c.trim().is_empty()) {
            return Err(awesome_error::query_builder!("Empty order by clause"));
        }

        Ok(())
    }
}
