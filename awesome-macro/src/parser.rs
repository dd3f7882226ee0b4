use proc_macro_error::abort;
use quote::ToTokens;
use syn::{Attribute, Data, DataStruct, DeriveInput, Expr, Ident, Lit, Type};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    Float,
    Text,
}

#[derive(Debug, Clone)]
pub enum DefaultInfo {
    Literal(Lit),
    /// Zero-arg function producing the value
    Producer(Expr),
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub ident: Ident,
    pub name: String,
    pub ty: Type,
    pub kind: FieldKind,
    pub ddl: Option<String>,
    pub primary_key: bool,
    pub default: Option<DefaultInfo>,
}

#[derive(Debug)]
pub struct ModelInfo {
    pub struct_name: Ident,
    pub table_name: String,
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug)]
enum AttrInfo {
    TableName(String),
    PrimaryKey,
    Text,
    Ddl(String),
    Default(DefaultInfo),
}

const ARG_HELP: &str = r#"Syntax is orm(primary_key | text | table_name = "NAME" | ddl = "SQL TYPE" | default = (LITERAL | FUNCTION), ...)"#;

pub fn parse(input: DeriveInput) -> ModelInfo {
    let st = match &input.data {
        Data::Struct(st) => st,
        _ => abort!(input, "Model must be a struct"),
    };

    let struct_name = input.ident.clone();
    let mut table_name = struct_name.to_string().to_lowercase();

    for attr in orm_attrs(&input.attrs) {
        for attr_info in parse_orm_attr(attr) {
            match attr_info {
                AttrInfo::TableName(name) => table_name = name,
                _ => abort!(attr, "Invalid struct attr field: {:?}", attr_info),
            }
        }
    }

    let fields = parse_fields(st);

    let keys = fields.iter().filter(|f| f.primary_key).collect::<Vec<_>>();
    match keys.as_slice() {
        [] => abort!(input, "Primary key not found"),
        [_] => {}
        [_, dup, ..] => abort!(dup.ident, "Duplicate primary key for field: {}", dup.name),
    }

    if fields.len() < 2 {
        abort!(input, "Model needs at least one field besides its primary key");
    }

    ModelInfo {
        struct_name,
        table_name,
        fields,
    }
}

fn parse_fields(st: &DataStruct) -> Vec<FieldInfo> {
    let mut fields = Vec::<FieldInfo>::new();

    for field in &st.fields {
        let ident = match &field.ident {
            Some(ident) => ident.clone(),
            None => abort!(field, "Field must be named"),
        };
        let mut kind = field_kind(&field.ty);
        let mut ddl = None;
        let mut primary_key = false;
        let mut default = None;

        for attr in orm_attrs(&field.attrs) {
            for attr_info in parse_orm_attr(attr) {
                match attr_info {
                    AttrInfo::PrimaryKey => primary_key = true,
                    AttrInfo::Ddl(s) => ddl = Some(s),
                    AttrInfo::Default(d) => default = Some(d),
                    AttrInfo::Text => {
                        if kind != FieldKind::String {
                            abort!(attr, "Only string fields can be `text`");
                        }
                        kind = FieldKind::Text;
                    }
                    _ => abort!(attr, "Invalid field attr: {:?}", attr_info),
                }
            }
        }

        if ddl.is_some() && kind != FieldKind::String {
            abort!(field, "`ddl` only applies to string fields");
        }

        fields.push(FieldInfo {
            name: ident.to_string(),
            ident,
            ty: field.ty.clone(),
            kind,
            ddl,
            primary_key,
            default,
        });
    }

    fields
}

/// Map the rust type, `Option` unwrapped, onto a column kind
fn field_kind(ty: &Type) -> FieldKind {
    let s = ty.to_token_stream().to_string().replace(' ', "");
    let inner = s
        .strip_prefix("Option<")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(&s);

    match inner {
        "String" => FieldKind::String,
        "bool" => FieldKind::Boolean,
        "i64" | "i32" | "u32" => FieldKind::Integer,
        "f64" => FieldKind::Float,
        _ => abort!(ty, "Unsupported field type `{}`", s),
    }
}

fn orm_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|a| a.path.is_ident("orm"))
}

fn parse_orm_attr(attr: &Attribute) -> Vec<AttrInfo> {
    const PARSE_ERR_STR: &str = "Parse failed, syntax is #[orm(field [= value])]";

    let mut attrs = Vec::<AttrInfo>::new();

    // Reparse `orm(...)` as a function call expression
    let path = attr.path.clone();
    let toks = attr.tokens.clone();
    let call_toks = quote::quote! {#path #toks};

    let args = if let Ok(call) = syn::parse2::<syn::ExprCall>(call_toks) {
        call.args
    } else {
        abort!(attr.tokens, PARSE_ERR_STR);
    };

    for expr in &args {
        match expr {
            Expr::Path(p) => {
                let field_name = p.to_token_stream().to_string();
                match field_name.as_str() {
                    "primary_key" => attrs.push(AttrInfo::PrimaryKey),
                    "text" => attrs.push(AttrInfo::Text),
                    _ => abort!(expr, "Syntax error while decode path"; help = ARG_HELP),
                }
            }
            Expr::Assign(assign) => {
                let field_name = assign.left.to_token_stream().to_string();
                match field_name.as_str() {
                    "table_name" => attrs.push(AttrInfo::TableName(get_str(&assign.right))),
                    "ddl" => attrs.push(AttrInfo::Ddl(get_str(&assign.right))),
                    "default" => attrs.push(AttrInfo::Default(get_default(&assign.right))),
                    _ => abort!(expr, "Syntax error while decode assign"; help = ARG_HELP),
                }
            }
            _ => abort!(expr, "Syntax error while match expr"; help = ARG_HELP),
        }
    }

    attrs
}

/// Get string from expr
fn get_str(expr: &Expr) -> String {
    if let Expr::Lit(lit) = expr {
        if let Lit::Str(s) = &lit.lit {
            return s.value();
        }
    }

    abort!(expr, "Expect string")
}

/// A literal is used as-is, a path is called for every default
fn get_default(expr: &Expr) -> DefaultInfo {
    match expr {
        Expr::Lit(lit) => DefaultInfo::Literal(lit.lit.clone()),
        Expr::Path(_) => DefaultInfo::Producer(expr.clone()),
        _ => abort!(expr, "Expect literal or function path"),
    }
}
