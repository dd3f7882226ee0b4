mod generator;
mod parser;

use proc_macro::TokenStream;
use proc_macro_error::proc_macro_error;
use syn::{parse_macro_input, DeriveInput};

use parser::{FieldInfo, FieldKind, ModelInfo};

/// Implement `awesome_orm::Model` for a struct with named fields.
///
/// ```ignore
/// #[derive(Model)]
/// #[orm(table_name = "users")]
/// struct User {
///     #[orm(primary_key, ddl = "varchar(50)", default = next_id)]
///     id: Option<String>,
///     #[orm(text)]
///     bio: String,
///     admin: bool,
/// }
/// ```
#[proc_macro_derive(Model, attributes(orm))]
#[proc_macro_error]
pub fn derive_model(item: TokenStream) -> TokenStream {
    let input: DeriveInput = parse_macro_input!(item);
    let info = parser::parse(input);
    let stream = generator::generate(info);

    stream.into()
}
