//! SQL text builders. Every value goes through a `?` placeholder, the
//! builders only ever render identifiers and clause text.

mod create_table;
mod delete;
mod insert;
mod limit;
mod select;
mod update;

pub use create_table::CreateTableBuilder;
pub use delete::DeleteBuilder;
pub use insert::InsertBuilder;
pub use limit::Limit;
pub use select::SelectBuilder;
pub use update::UpdateBuilder;

#[derive(Debug)]
pub struct QueryBuilder {}

impl QueryBuilder {
    pub fn select(table: &str) -> SelectBuilder {
        SelectBuilder::new(table)
    }

    pub fn insert(table: &str) -> InsertBuilder {
        InsertBuilder::new(table)
    }

    pub fn update(table: &str) -> UpdateBuilder {
        UpdateBuilder::new(table)
    }

    pub fn delete(table: &str) -> DeleteBuilder {
        DeleteBuilder::new(table)
    }

    pub fn create_table(table: &str) -> CreateTableBuilder {
        CreateTableBuilder::new(table)
    }
}

/// Back-quote an identifier
///
/// # Examples
///
/// ```
/// assert_eq!(awesome_query::quote("users"), "`users`");
/// ```
pub fn quote(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}
