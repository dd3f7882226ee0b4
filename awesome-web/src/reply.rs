use bytes::Bytes;
use http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde_json::{Map, Value as Json};

/// What a handler produced, before it is turned into an HTTP response
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyKind {
    Template { name: String, context: Map<String, Json> },
    Json(Json),
    /// 302 to the location
    Redirect(String),
    Html(String),
    Text(String),
    Bytes { content_type: String, data: Bytes },
    Status(StatusCode, String),
}

#[derive(Debug, Clone)]
pub struct Reply {
    pub kind: ReplyKind,
    pub headers: HeaderMap,
}

impl Reply {
    pub fn new(kind: ReplyKind) -> Self {
        Self {
            kind,
            headers: HeaderMap::new(),
        }
    }

    /// Render `name` with the fields of `context`; a non-object context is
    /// available to the template as `data`
    pub fn template(name: &str, context: Json) -> Self {
        let context = match context {
            Json::Object(map) => map,
            Json::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("data".into(), other);
                map
            }
        };

        Self::new(ReplyKind::Template {
            name: name.into(),
            context,
        })
    }

    pub fn json(value: Json) -> Self {
        Self::new(ReplyKind::Json(value))
    }

    pub fn redirect(location: &str) -> Self {
        Self::new(ReplyKind::Redirect(location.into()))
    }

    pub fn html(body: impl Into<String>) -> Self {
        Self::new(ReplyKind::Html(body.into()))
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(ReplyKind::Text(body.into()))
    }

    pub fn bytes(content_type: &str, data: impl Into<Bytes>) -> Self {
        Self::new(ReplyKind::Bytes {
            content_type: content_type.into(),
            data: data.into(),
        })
    }

    pub fn status(status: StatusCode, message: impl Into<String>) -> Self {
        Self::new(ReplyKind::Status(status, message.into()))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::status(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found() -> Self {
        Self::status(StatusCode::NOT_FOUND, "Not Found")
    }

    pub fn internal_error() -> Self {
        Self::status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
    }

    /// Status code the reply will be sent with
    pub fn status_code(&self) -> StatusCode {
        match &self.kind {
            ReplyKind::Redirect(_) => StatusCode::FOUND,
            ReplyKind::Status(code, _) => *code,
            _ => StatusCode::OK,
        }
    }

    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.append(name, v);
            }
            Err(e) => log::warn!("drop invalid header {}: {}", name, e),
        }
        self
    }

    /// Attach a `Set-Cookie` valid for the whole site, `max_age` in seconds
    pub fn set_cookie(self, name: &str, value: &str, max_age: i64) -> Self {
        let cookie = cookie::Cookie::build((name.to_string(), value.to_string()))
            .path("/")
            .max_age(cookie::time::Duration::seconds(max_age))
            .http_only(true)
            .build();

        self.with_header(header::SET_COOKIE, &cookie.to_string())
    }

    /// Insert template variables that the handler did not set itself
    pub fn merge_globals(&mut self, globals: &Map<String, Json>) {
        if let ReplyKind::Template { context, .. } = &mut self.kind {
            for (k, v) in globals {
                context.entry(k.clone()).or_insert_with(|| v.clone());
            }
        }
    }
}

/// `redirect:<url>` strings redirect, anything else is an HTML body
impl From<String> for Reply {
    fn from(s: String) -> Self {
        match s.strip_prefix("redirect:") {
            Some(location) => Self::redirect(location),
            None => Self::html(s),
        }
    }
}

impl From<&str> for Reply {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<Json> for Reply {
    fn from(v: Json) -> Self {
        Self::json(v)
    }
}

impl From<StatusCode> for Reply {
    fn from(code: StatusCode) -> Self {
        Self::status(code, code.canonical_reason().unwrap_or(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn redirect_strings() {
        let r = Reply::from("redirect:/signin");
        assert_eq!(r.kind, ReplyKind::Redirect("/signin".into()));
        assert_eq!(r.status_code(), StatusCode::FOUND);

        assert_eq!(Reply::from("<p>hi</p>").kind, ReplyKind::Html("<p>hi</p>".into()));
    }

    #[test]
    fn globals_do_not_override_handler_values() {
        let mut r = Reply::template("blog.html", json!({"__user__": "mine"}));
        let mut globals = Map::new();
        globals.insert("__user__".into(), json!("other"));
        globals.insert("extra".into(), json!(1));

        r.merge_globals(&globals);

        match r.kind {
            ReplyKind::Template { context, .. } => {
                assert_eq!(context["__user__"], json!("mine"));
                assert_eq!(context["extra"], json!(1));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn cookie_header() {
        let r = Reply::json(json!({})).set_cookie("awesession", "v", 86400);
        let v = r.headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(v.starts_with("awesession=v"));
        assert!(v.contains("Max-Age=86400"));
    }
}
