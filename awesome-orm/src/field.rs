use awesome_pool::Value;

/// Storage type of a column
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Bounded string, carries its column ddl such as `varchar(50)`
    String(String),
    Boolean,
    Integer,
    Float,
    Text,
}

impl FieldType {
    pub fn ddl(&self) -> &str {
        match self {
            Self::String(ddl) => ddl,
            Self::Boolean => "boolean",
            Self::Integer => "bigint",
            Self::Float => "real",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldDefault {
    None,
    Literal(Value),
    /// Evaluated every time a default is needed
    Producer(fn() -> Value),
}

impl FieldDefault {
    pub fn produce(&self) -> Option<Value> {
        match self {
            Self::None => None,
            Self::Literal(v) => Some(v.clone()),
            Self::Producer(f) => Some(f()),
        }
    }
}

/// Column descriptor of a model field
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    ty: FieldType,
    primary_key: bool,
    default: FieldDefault,
}

impl Field {
    fn new(name: &str, ty: FieldType, default: FieldDefault) -> Self {
        Self {
            name: name.into(),
            ty,
            primary_key: false,
            default,
        }
    }

    pub fn string(name: &str, ddl: &str) -> Self {
        Self::new(name, FieldType::String(ddl.into()), FieldDefault::None)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, FieldType::Boolean, FieldDefault::Literal(Value::Bool(false)))
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, FieldType::Integer, FieldDefault::Literal(Value::I64(0)))
    }

    pub fn float(name: &str) -> Self {
        Self::new(name, FieldType::Float, FieldDefault::Literal(Value::F64(0.0)))
    }

    pub fn text(name: &str) -> Self {
        Self::new(name, FieldType::Text, FieldDefault::None)
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = FieldDefault::Literal(value);
        self
    }

    pub fn default_with(mut self, producer: fn() -> Value) -> Self {
        self.default = FieldDefault::Producer(producer);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &FieldType {
        &self.ty
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn default(&self) -> &FieldDefault {
        &self.default
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer() -> Value {
        Value::I64(42)
    }

    #[test]
    fn implicit_defaults() {
        assert_eq!(Field::boolean("admin").default().produce(), Some(Value::Bool(false)));
        assert_eq!(Field::integer("n").default().produce(), Some(Value::I64(0)));
        assert_eq!(Field::float("f").default().produce(), Some(Value::F64(0.0)));
        assert_eq!(Field::string("s", "varchar(50)").default().produce(), None);
        assert_eq!(Field::text("t").ty().ddl(), "text");
    }

    #[test]
    fn producer_runs_on_demand() {
        let field = Field::integer("n").default_with(answer);
        assert_eq!(field.default().produce(), Some(Value::I64(42)));
    }
}
