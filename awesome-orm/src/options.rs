use awesome_error::Result;
use awesome_pool::Value;
use awesome_query::{Limit, SelectBuilder};

/// Filters of [`Model::find_all`](crate::Model::find_all)
#[derive(Debug, Default, Clone)]
pub struct FindOption {
    /// Raw clause, values bound through `?`
    pub where_clause: Option<String>,
    pub params: Vec<Value>,
    pub order_by: Option<String>,
    pub limit: Option<Limit>,
}

impl FindOption {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, clause: &str, params: Vec<Value>) -> Self {
        self.where_clause = Some(clause.into());
        self.params = params;
        self
    }

    pub fn order_by(mut self, clause: &str) -> Self {
        self.order_by = Some(clause.into());
        self
    }

    pub fn limit<L: Into<Limit>>(mut self, limit: L) -> Self {
        self.limit = Some(limit.into());
        self
    }

    /// Apply the clauses to `builder`, returns the parameters in placeholder order
    pub fn update_sql_builder(self, builder: &mut SelectBuilder) -> Result<Vec<Value>> {
        let mut params = self.params;

        if let Some(clause) = &self.where_clause {
            builder.where_clause(clause);
        }

        if let Some(clause) = &self.order_by {
            builder.order_by(clause);
        }

        if let Some(limit) = self.limit {
            builder.limit(limit);
            params.extend(limit.params()?);
        }

        Ok(params)
    }
}
