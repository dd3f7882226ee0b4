use std::fmt;

use awesome_error::Result;

macro_rules! impl_to_value_base {
    ($ty:ty, $enum_field:ident) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::$enum_field(self.clone())
            }
        }
    };
}

macro_rules! impl_to_value_integer {
    ($ty:ty) => {
        impl ToValue for $ty {
            fn to_value(&self) -> Value {
                Value::I64(*self as i64)
            }
        }
    };
}

macro_rules! impl_from_value_integer {
    ($ty:ty) => {
        impl FromValue for $ty {
            type Output = $ty;

            fn from_value(v: &Value) -> Result<Self::Output> {
                match v {
                    Value::I64(n) => <$ty>::try_from(*n).map_err(|_| {
                        awesome_error::from_value!("{} overflows {}", n, stringify!($ty))
                    }),
                    Value::Bool(b) => Ok(*b as $ty),
                    Value::Str(s) => s.parse::<$ty>().map_err(|e| {
                        awesome_error::from_value!("`{}` is not {}: {}", s, stringify!($ty), e)
                    }),
                    _ => Err(awesome_error::from_value!(
                        "Invalid value: {}, output type: {}",
                        v,
                        stringify!($ty)
                    )),
                }
            }
        }
    };
}

/// A column value as it travels between the drivers and the models.
///
/// The variants cover the storage types a model field can declare; every
/// driver narrows its native values into one of them.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// SQL-literal-like rendering, used when statements and their arguments are logged
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Str(v) => write!(f, "'{}'", v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

impl_to_value_base! {bool, Bool}
impl_to_value_base! {i64, I64}
impl_to_value_base! {f64, F64}
impl_to_value_base! {String, Str}
impl_to_value_base! {Vec<u8>, Bytes}

impl_to_value_integer! {i32}
impl_to_value_integer! {u32}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_string())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        if let Some(v) = self {
            T::to_value(v)
        } else {
            Value::Null
        }
    }
}

pub trait FromValue {
    type Output;

    fn from_value(v: &Value) -> Result<Self::Output>;
}

impl<T: FromValue> FromValue for Option<T> {
    type Output = Option<<T as FromValue>::Output>;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Null => Ok(None),
            _ => Ok(Some(T::from_value(v)?)),
        }
    }
}

impl FromValue for bool {
    type Output = bool;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Bool(v) => Ok(*v),
            Value::I64(v) => Ok(*v != 0),
            _ => Err(awesome_error::from_value!(
                "Invalid value: {}, output type: bool",
                v
            )),
        }
    }
}

impl_from_value_integer! {i64}
impl_from_value_integer! {i32}
impl_from_value_integer! {u32}

impl FromValue for f64 {
    type Output = f64;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::F64(v) => Ok(*v),
            Value::I64(v) => Ok(*v as f64),
            Value::Str(s) => s
                .parse::<f64>()
                .map_err(|e| awesome_error::from_value!("`{}` is not f64: {}", s, e)),
            _ => Err(awesome_error::from_value!(
                "Invalid value: {}, output type: f64",
                v
            )),
        }
    }
}

impl FromValue for String {
    type Output = String;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Str(s) => Ok(s.clone()),
            // MySQL hands text columns back as raw bytes
            Value::Bytes(b) => String::from_utf8(b.clone())
                .map_err(|e| awesome_error::from_value!("Column is not utf-8: {}", e)),
            _ => Err(awesome_error::from_value!(
                "Invalid value: {}, output type: String",
                v
            )),
        }
    }
}

impl FromValue for Vec<u8> {
    type Output = Vec<u8>;

    fn from_value(v: &Value) -> Result<Self::Output> {
        match v {
            Value::Bytes(b) => Ok(b.clone()),
            Value::Str(s) => Ok(s.clone().into_bytes()),
            _ => Err(awesome_error::from_value!(
                "Invalid value: {}, output type: Vec<u8>",
                v
            )),
        }
    }
}

impl FromValue for Value {
    type Output = Value;

    fn from_value(v: &Value) -> Result<Self::Output> {
        Ok(v.clone())
    }
}

/// Render a parameter list the way statement logging shows it: `[a, b, c]`
pub fn format_params(params: &[Value]) -> String {
    format!(
        "[{}]",
        params
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_none_is_null() {
        assert_eq!(Option::<String>::None.to_value(), Value::Null);
        assert_eq!(Some(3i64).to_value(), Value::I64(3));
    }

    #[test]
    fn integers_accept_booleans_and_text() {
        assert_eq!(i64::from_value(&Value::Bool(true)).unwrap(), 1);
        assert_eq!(i32::from_value(&Value::Str("42".into())).unwrap(), 42);
        assert!(u32::from_value(&Value::I64(-1)).is_err());
    }

    #[test]
    fn strings_accept_utf8_bytes() {
        let v = Value::Bytes(b"hello".to_vec());
        assert_eq!(String::from_value(&v).unwrap(), "hello");
        assert!(String::from_value(&Value::I64(1)).is_err());
    }

    #[test]
    fn params_render_like_sql_literals() {
        let params = vec![Value::Str("a".into()), Value::I64(1), Value::Null];
        assert_eq!(format_params(&params), "['a', 1, NULL]");
    }
}
