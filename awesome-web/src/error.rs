use serde_json::{json, Value as Json};

/// Route table could not be built
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RouteError {
    #[error("invalid path pattern `{pattern}`: {reason}")]
    Pattern { pattern: String, reason: String },
    #[error("invalid parameters of {route}: {reason}")]
    Params { route: String, reason: String },
}

/// Error returned by a handler.
///
/// Everything but [`ApiError::Internal`] is reported to the client as a JSON
/// payload `{error, data, message}` with status 200.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("value:invalid {field}: {message}")]
    Value { field: String, message: String },
    #[error("value:notfound {field}: {message}")]
    NotFound { field: String, message: String },
    #[error("permission:forbidden {message}")]
    Permission { message: String },
    #[error("{error} {data}: {message}")]
    Custom {
        error: String,
        data: String,
        message: String,
    },
    /// Failure outside the API contract, answered with 500
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn value(field: &str, message: &str) -> Self {
        Self::Value {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn not_found(field: &str, message: &str) -> Self {
        Self::NotFound {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn permission(message: &str) -> Self {
        Self::Permission {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Value { .. } => "value:invalid",
            Self::NotFound { .. } => "value:notfound",
            Self::Permission { .. } => "permission:forbidden",
            Self::Custom { error, .. } => error,
            Self::Internal(_) => "internal",
        }
    }

    /// The `{error, data, message}` payload sent to clients
    pub fn to_json(&self) -> Json {
        let (data, message) = match self {
            Self::Value { field, message } | Self::NotFound { field, message } => {
                (field.as_str(), message.as_str())
            }
            Self::Permission { message } => ("permission", message.as_str()),
            Self::Custom { data, message, .. } => (data.as_str(), message.as_str()),
            Self::Internal(message) => ("", message.as_str()),
        };

        json!({
            "error": self.code(),
            "data": data,
            "message": message,
        })
    }
}

impl From<awesome_error::Error> for ApiError {
    fn from(e: awesome_error::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

/// Template could not be rendered
#[derive(Debug, Clone, thiserror::Error)]
#[error("render template `{name}` failed: {reason}")]
pub struct RenderError {
    pub name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload() {
        assert_eq!(
            ApiError::value("email", "Invalid email.").to_json(),
            json!({"error": "value:invalid", "data": "email", "message": "Invalid email."})
        );
        assert_eq!(
            ApiError::permission("Please signin first.").to_json(),
            json!({"error": "permission:forbidden", "data": "permission", "message": "Please signin first."})
        );
    }

    #[test]
    fn data_errors_are_internal() {
        let e: ApiError = awesome_error::database!("boom").into();
        assert!(matches!(e, ApiError::Internal(_)));
    }
}
