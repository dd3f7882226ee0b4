use bytes::Bytes;
use http::{header, HeaderValue, StatusCode};
use http_body_util::Full;
use serde_json::{Map, Value as Json};

use crate::{RenderError, Reply, ReplyKind};

pub type Response = hyper::Response<Full<Bytes>>;

/// Template engine used for [`ReplyKind::Template`]
pub trait Renderer: Send + Sync {
    fn render(&self, name: &str, context: &Map<String, Json>) -> Result<String, RenderError>;
}

const HTML_UTF8: &str = "text/html;charset=utf-8";
const TEXT_UTF8: &str = "text/plain;charset=utf-8";
const JSON_UTF8: &str = "application/json;charset=utf-8";

/// Turn a reply into the HTTP response sent to the client
pub fn into_response(reply: Reply, renderer: &dyn Renderer) -> Response {
    let status = reply.status_code();

    let (content_type, body, location) = match reply.kind {
        ReplyKind::Template { name, context } => match renderer.render(&name, &context) {
            Ok(html) => (HTML_UTF8.to_string(), Bytes::from(html), None),
            Err(e) => {
                log::error!("{}", e);
                return plain(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        },
        ReplyKind::Json(v) => (JSON_UTF8.to_string(), Bytes::from(v.to_string()), None),
        ReplyKind::Redirect(location) => (TEXT_UTF8.to_string(), Bytes::new(), Some(location)),
        ReplyKind::Html(s) => (HTML_UTF8.to_string(), Bytes::from(s), None),
        ReplyKind::Text(s) => (TEXT_UTF8.to_string(), Bytes::from(s), None),
        ReplyKind::Bytes { content_type, data } => (content_type, data, None),
        ReplyKind::Status(_, message) => (TEXT_UTF8.to_string(), Bytes::from(message), None),
    };

    let mut resp = hyper::Response::new(Full::new(body));
    *resp.status_mut() = status;

    let headers = resp.headers_mut();
    if let Ok(v) = HeaderValue::from_str(&content_type) {
        headers.insert(header::CONTENT_TYPE, v);
    }
    if let Some(location) = location {
        match HeaderValue::from_str(&location) {
            Ok(v) => {
                headers.insert(header::LOCATION, v);
            }
            Err(e) => log::warn!("invalid redirect location {:?}: {}", location, e),
        }
    }
    for (name, value) in reply.headers.iter() {
        headers.append(name.clone(), value.clone());
    }

    resp
}

fn plain(status: StatusCode, message: &'static str) -> Response {
    let mut resp = hyper::Response::new(Full::new(Bytes::from_static(message.as_bytes())));
    *resp.status_mut() = status;
    resp.headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(TEXT_UTF8));
    resp
}
