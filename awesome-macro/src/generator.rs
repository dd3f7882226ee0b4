use proc_macro2::TokenStream;
use quote::quote;

use crate::{parser::DefaultInfo, FieldInfo, FieldKind, ModelInfo};

const DEFAULT_STRING_DDL: &str = "varchar(100)";

pub fn generate(info: ModelInfo) -> TokenStream {
    let struct_name = &info.struct_name;
    let schema_toks = gen_schema(&info);
    let from_row_toks = gen_from_row(&info);
    let accessor_toks = gen_accessors(&info);

    quote! {
        impl awesome_orm::Model for #struct_name {
            #schema_toks

            #from_row_toks

            #accessor_toks
        }
    }
}

fn gen_schema(info: &ModelInfo) -> TokenStream {
    let table_name = &info.table_name;
    let field_toks = info.fields.iter().map(gen_field).collect::<Vec<_>>();

    quote! {
        fn schema() -> awesome_orm::error::Result<&'static awesome_orm::Schema> {
            static SCHEMA: awesome_orm::Lazy<awesome_orm::error::Result<awesome_orm::Schema>> =
                awesome_orm::Lazy::new(|| {
                    awesome_orm::Schema::new(#table_name, vec![#(#field_toks),*])
                });

            SCHEMA.as_ref().map_err(|e| e.clone())
        }
    }
}

fn gen_field(field: &FieldInfo) -> TokenStream {
    let name = &field.name;

    let ctor = match field.kind {
        FieldKind::String => {
            let ddl = field.ddl.as_deref().unwrap_or(DEFAULT_STRING_DDL);
            quote! { awesome_orm::Field::string(#name, #ddl) }
        }
        FieldKind::Boolean => quote! { awesome_orm::Field::boolean(#name) },
        FieldKind::Integer => quote! { awesome_orm::Field::integer(#name) },
        FieldKind::Float => quote! { awesome_orm::Field::float(#name) },
        FieldKind::Text => quote! { awesome_orm::Field::text(#name) },
    };

    let pk = if field.primary_key {
        quote! { .primary_key() }
    } else {
        quote! {}
    };

    let default = match &field.default {
        None => quote! {},
        Some(DefaultInfo::Literal(lit)) => quote! {
            .default_value(awesome_orm::ToValue::to_value(&#lit))
        },
        Some(DefaultInfo::Producer(path)) => quote! {
            .default_with(|| awesome_orm::ToValue::to_value(&#path()))
        },
    };

    quote! { #ctor #pk #default }
}

fn gen_from_row(info: &ModelInfo) -> TokenStream {
    let field_toks = info
        .fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name = &f.name;
            let ty = &f.ty;
            quote! {
                #ident: row.get::<#ty>(#name)?,
            }
        })
        .collect::<Vec<_>>();

    quote! {
        fn from_row(row: &awesome_orm::Row) -> awesome_orm::error::Result<Self> {
            Ok(Self {
                #(#field_toks)*
            })
        }
    }
}

fn gen_accessors(info: &ModelInfo) -> TokenStream {
    let struct_name = info.struct_name.to_string();
    let get_arms = info
        .fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name = &f.name;
            quote! {
                #name => Some(awesome_orm::ToValue::to_value(&self.#ident)),
            }
        })
        .collect::<Vec<_>>();
    let set_arms = info
        .fields
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let name = &f.name;
            let ty = &f.ty;
            quote! {
                #name => {
                    self.#ident = <#ty as awesome_orm::FromValue>::from_value(&value)?;
                    Ok(())
                }
            }
        })
        .collect::<Vec<_>>();

    quote! {
        fn get_value(&self, field: &str) -> Option<awesome_orm::Value> {
            match field {
                #(#get_arms)*
                _ => None,
            }
        }

        fn set_value(&mut self, field: &str, value: awesome_orm::Value) -> awesome_orm::error::Result<()> {
            match field {
                #(#set_arms)*
                _ => Err(awesome_orm::error::argument!(
                    "`{}` has no field `{}`",
                    #struct_name,
                    field
                )),
            }
        }
    }
}
