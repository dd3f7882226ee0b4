use std::{collections::HashMap, net::SocketAddr};

use bytes::Bytes;
use http::{header, HeaderMap, Method, Uri};
use serde_json::{Map, Value as Json};

/// A fully read HTTP request
#[derive(Debug)]
pub struct Request {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub remote_addr: Option<SocketAddr>,
    /// Captures of the matched route pattern
    pub match_info: HashMap<String, String>,
    /// Request scoped values set by middleware, e.g. the signed in user
    pub extensions: http::Extensions,
    template_globals: Map<String, Json>,
}

impl Request {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            method,
            uri,
            headers,
            body,
            remote_addr: None,
            match_info: HashMap::new(),
            extensions: http::Extensions::new(),
            template_globals: Map::new(),
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, Self::parse_uri(path), HeaderMap::new(), Bytes::new())
    }

    pub fn post(path: &str, content_type: &str, body: impl Into<Bytes>) -> Self {
        let mut headers = HeaderMap::new();
        if let Ok(v) = content_type.parse() {
            headers.insert(header::CONTENT_TYPE, v);
        }

        Self::new(Method::POST, Self::parse_uri(path), headers, body.into())
    }

    fn parse_uri(path: &str) -> Uri {
        path.parse().unwrap_or_else(|_| Uri::from_static("/"))
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query_string(&self) -> &str {
        self.uri.query().unwrap_or("")
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(header::CONTENT_TYPE).filter(|s| !s.is_empty())
    }

    /// Value of the named cookie, `None` when absent or malformed
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|s| cookie::Cookie::split_parse(s.to_string()))
            .filter_map(|c| c.ok())
            .find(|c| c.name() == name)
            .map(|c| c.value().to_string())
    }

    /// Variables every rendered template of this request receives
    pub fn set_template_global(&mut self, name: &str, value: Json) {
        self.template_globals.insert(name.into(), value);
    }

    pub fn template_globals(&self) -> &Map<String, Json> {
        &self.template_globals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookies() {
        let mut req = Request::get("/?page=2");
        req.headers
            .insert(header::COOKIE, "a=1; awesession=abc-123".parse().unwrap());

        assert_eq!(req.cookie("awesession").as_deref(), Some("abc-123"));
        assert_eq!(req.cookie("missing"), None);
        assert_eq!(req.query_string(), "page=2");
        assert_eq!(req.path(), "/");
    }
}
