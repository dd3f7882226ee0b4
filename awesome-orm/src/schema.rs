//! Per-model table metadata and pre-rendered statements.

use awesome_error::Result;
use awesome_query::{quote, QueryBuilder};

use crate::Field;

#[derive(Debug, Clone)]
pub struct Schema {
    table: String,
    /// Declaration order
    fields: Vec<Field>,
    primary_key: usize,
    select: String,
    insert: String,
    update: String,
    delete: String,
}

impl Schema {
    /// Validate the field list and render the CRUD statements.
    ///
    /// Fails unless exactly one field is the primary key and at least one
    /// field is not.
    pub fn new(table: &str, fields: Vec<Field>) -> Result<Self> {
        let keys = fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_primary_key())
            .map(|(i, _)| i)
            .collect::<Vec<_>>();

        let primary_key = match keys.as_slice() {
            [] => return Err(awesome_error::schema!("Primary key not found in `{}`", table)),
            [i] => *i,
            _ => {
                return Err(awesome_error::schema!(
                    "Duplicate primary key for field: {}",
                    fields[keys[1]].name()
                ))
            }
        };

        if fields.len() < 2 {
            return Err(awesome_error::schema!(
                "Table `{}` has no column besides its primary key",
                table
            ));
        }

        let mut schema = Self {
            table: table.into(),
            fields,
            primary_key,
            select: String::new(),
            insert: String::new(),
            update: String::new(),
            delete: String::new(),
        };

        let pk = schema.primary_key().name().to_string();
        let non_keys = schema.non_key_fields().map(|f| f.name()).collect::<Vec<_>>();
        let insert_cols = schema.insert_order().map(|f| f.name()).collect::<Vec<_>>();

        let select = QueryBuilder::select(table).build()?;
        let insert = QueryBuilder::insert(table).columns(&insert_cols).build()?;
        let update = QueryBuilder::update(table).columns(&non_keys).key(&pk).build()?;
        let delete = QueryBuilder::delete(table).key(&pk).build()?;

        log::debug!("found model: {} (primary key: {})", table, pk);

        schema.select = select;
        schema.insert = insert;
        schema.update = update;
        schema.delete = delete;

        Ok(schema)
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn primary_key(&self) -> &Field {
        &self.fields[self.primary_key]
    }

    pub fn non_key_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.is_primary_key())
    }

    /// Non-key fields in declaration order, then the primary key
    pub fn insert_order(&self) -> impl Iterator<Item = &Field> {
        self.non_key_fields().chain(std::iter::once(self.primary_key()))
    }

    pub fn select_sql(&self) -> &str {
        &self.select
    }

    pub fn insert_sql(&self) -> &str {
        &self.insert
    }

    pub fn update_sql(&self) -> &str {
        &self.update
    }

    pub fn delete_sql(&self) -> &str {
        &self.delete
    }

    pub fn create_table_sql(&self) -> Result<String> {
        let mut builder = QueryBuilder::create_table(&self.table);
        for field in &self.fields {
            builder.column(field.name(), field.ty().ddl());
        }
        builder.primary_key(self.primary_key().name());

        builder.build()
    }

    /// `` `pk` = ? ``
    pub(crate) fn key_filter(&self) -> String {
        format!("{} = ?", quote(self.primary_key().name()))
    }
}
