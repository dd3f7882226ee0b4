//! Request body decoding into an argument mapping.

use bytes::Bytes;
use futures_util::{future::ready, stream::once};
use multer::Multipart;
use serde_json::{Map, Value as Json};

use crate::Request;

/// Why a body could not become arguments, the message is sent with a 400
#[derive(Debug, Clone, PartialEq)]
pub struct BadRequest(pub String);

/// Decode a POST body by its content type.
///
/// Form and multipart bodies yield string values; only text parts of a
/// multipart body are kept.
pub async fn parse_body(req: &Request) -> Result<Map<String, Json>, BadRequest> {
    let content_type = req
        .content_type()
        .ok_or_else(|| BadRequest("Missing Content-Type.".into()))?;

    let mime: mime::Mime = content_type
        .parse()
        .map_err(|_| BadRequest(format!("Unsupported Content-Type: {}", content_type)))?;

    match (mime.type_(), mime.subtype()) {
        (mime::APPLICATION, mime::JSON) => parse_json(&req.body),
        (mime::APPLICATION, mime::WWW_FORM_URLENCODED) => Ok(parse_urlencoded(&req.body)),
        (mime::MULTIPART, mime::FORM_DATA) => {
            let boundary = multer::parse_boundary(content_type)
                .map_err(|_| BadRequest("Missing multipart boundary.".into()))?;
            parse_multipart(req.body.clone(), boundary).await
        }
        _ => Err(BadRequest(format!("Unsupported Content-Type: {}", content_type))),
    }
}

fn parse_json(body: &[u8]) -> Result<Map<String, Json>, BadRequest> {
    match serde_json::from_slice::<Json>(body) {
        Ok(Json::Object(map)) => Ok(map),
        _ => Err(BadRequest("JSON body must be object.".into())),
    }
}

/// Pairs of a query string or form body, the first value of a key wins
pub fn parse_urlencoded(data: &[u8]) -> Map<String, Json> {
    let pairs = serde_urlencoded::from_bytes::<Vec<(String, String)>>(data).unwrap_or_else(|e| {
        log::warn!("drop malformed urlencoded data: {}", e);
        Vec::new()
    });

    let mut map = Map::new();
    for (k, v) in pairs {
        map.entry(k).or_insert(Json::String(v));
    }
    map
}

async fn parse_multipart(body: Bytes, boundary: String) -> Result<Map<String, Json>, BadRequest> {
    let stream = once(ready(Ok::<_, std::io::Error>(body)));
    let mut multipart = Multipart::new(stream, boundary);
    let mut map = Map::new();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        if field.file_name().is_some() {
            continue;
        }
        let name = match field.name() {
            Some(name) => name.to_string(),
            None => continue,
        };
        let value = field.text().await.map_err(malformed)?;
        map.entry(name).or_insert(Json::String(value));
    }

    Ok(map)
}

fn malformed(e: multer::Error) -> BadRequest {
    BadRequest(format!("Malformed multipart body: {}", e))
}
