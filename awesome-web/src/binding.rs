use serde_json::{Map, Value as Json};

use crate::{form, PathPattern, Reply, Request, RouteError};

/// How one handler parameter is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    /// Keyword argument that must be present
    Required(String),
    /// Optional keyword argument
    Named(String),
    /// Capture of the route pattern
    Path(String),
    /// Take every argument of the request
    CatchAll,
    /// The request itself, must be the last parameter
    Request,
}

impl Param {
    pub fn required(name: &str) -> Self {
        Self::Required(name.into())
    }

    pub fn named(name: &str) -> Self {
        Self::Named(name.into())
    }

    pub fn path(name: &str) -> Self {
        Self::Path(name.into())
    }

    pub fn catch_all() -> Self {
        Self::CatchAll
    }

    pub fn request() -> Self {
        Self::Request
    }
}

/// What a handler needs from a request, computed once at registration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BindingPlan {
    /// Required names, also listed in `named`
    pub required: Vec<String>,
    pub named: Vec<String>,
    pub catch_all: bool,
    pub request: bool,
}

impl BindingPlan {
    pub fn new(route: &str, pattern: &PathPattern, params: &[Param]) -> Result<Self, RouteError> {
        let err = |reason: String| RouteError::Params {
            route: route.into(),
            reason,
        };

        let mut plan = Self::default();
        for (i, param) in params.iter().enumerate() {
            match param {
                Param::Required(name) => {
                    plan.required.push(name.clone());
                    plan.named.push(name.clone());
                }
                Param::Named(name) => plan.named.push(name.clone()),
                Param::Path(name) => {
                    if !pattern.has_capture(name) {
                        return Err(err(format!("`{}` is not captured by {}", name, pattern)));
                    }
                }
                Param::CatchAll => plan.catch_all = true,
                Param::Request => {
                    if i + 1 != params.len() {
                        return Err(err("request parameter must be the last parameter".into()));
                    }
                    plan.request = true;
                }
            }
        }

        Ok(plan)
    }

    /// Whether request data beyond the path is decoded
    pub fn wants_arguments(&self) -> bool {
        self.catch_all || !self.named.is_empty() || !self.required.is_empty()
    }

    /// Build the handler arguments, a bad request is answered with 400
    pub async fn bind(&self, req: Request) -> Result<Args, Reply> {
        let mut kw: Option<Map<String, Json>> = None;

        if self.wants_arguments() {
            if req.method == http::Method::POST {
                kw = Some(form::parse_body(&req).await.map_err(|e| Reply::bad_request(e.0))?);
            } else if req.method == http::Method::GET {
                let qs = req.query_string();
                if !qs.is_empty() {
                    kw = Some(form::parse_urlencoded(qs.as_bytes()));
                }
            }
        }

        let values = match kw {
            None => req
                .match_info
                .iter()
                .map(|(k, v)| (k.clone(), Json::String(v.clone())))
                .collect(),
            Some(mut kw) => {
                if !self.catch_all && !self.named.is_empty() {
                    kw.retain(|k, _| self.named.contains(k));
                }
                for (k, v) in &req.match_info {
                    if kw.contains_key(k) {
                        log::warn!("Duplicate arg name in named arg and kw args: {}", k);
                    }
                    kw.insert(k.clone(), Json::String(v.clone()));
                }
                kw
            }
        };

        if let Some(name) = self.required.iter().find(|n| !values.contains_key(*n)) {
            return Err(Reply::bad_request(format!("Missing argument: {}", name)));
        }

        log::info!("call with args: {}", Json::Object(values.clone()));

        let request = if self.request { Some(req) } else { None };

        Ok(Args { values, request })
    }
}

/// Arguments handed to a handler
#[derive(Debug, Default)]
pub struct Args {
    values: Map<String, Json>,
    request: Option<Request>,
}

impl Args {
    pub fn new(values: Map<String, Json>) -> Self {
        Self {
            values,
            request: None,
        }
    }

    pub fn values(&self) -> &Map<String, Json> {
        &self.values
    }

    /// String form of a value; JSON numbers and booleans are rendered
    pub fn str(&self, name: &str) -> Option<String> {
        match self.values.get(name)? {
            Json::String(s) => Some(s.clone()),
            Json::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn str_or(&self, name: &str, default: &str) -> String {
        self.str(name).unwrap_or_else(|| default.into())
    }

    /// Present when the handler declared [`Param::Request`]
    pub fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }
}
