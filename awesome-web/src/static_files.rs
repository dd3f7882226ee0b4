use std::path::{Component, Path, PathBuf};

use crate::{Middleware, Next, Reply, Request};

/// Serves GET requests below `prefix` from files under `root`
pub struct StaticFiles {
    prefix: String,
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(prefix: &str, root: impl Into<PathBuf>) -> Self {
        let mut prefix = prefix.to_string();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }

        Self {
            prefix,
            root: root.into(),
        }
    }

    /// File path of a request path, `None` outside the prefix or when the
    /// path would leave `root`
    pub fn resolve(&self, path: &str) -> Option<PathBuf> {
        let rel = path.strip_prefix(&self.prefix)?;
        let rel = percent_encoding::percent_decode_str(rel).decode_utf8().ok()?;
        let rel = Path::new(&*rel);

        if rel.as_os_str().is_empty() || !rel.components().all(|c| matches!(c, Component::Normal(_))) {
            return None;
        }

        Some(self.root.join(rel))
    }

    async fn serve(&self, path: &str) -> Reply {
        let file = match self.resolve(path) {
            Some(file) => file,
            None => {
                log::warn!("reject static path {}", path);
                return Reply::not_found();
            }
        };

        match tokio::fs::read(&file).await {
            Ok(data) => {
                let mime = mime_guess::from_path(&file).first_or_octet_stream();
                Reply::bytes(mime.as_ref(), data)
            }
            Err(e) => {
                log::debug!("static file {:?}: {}", file, e);
                Reply::not_found()
            }
        }
    }
}

#[async_trait::async_trait]
impl Middleware for StaticFiles {
    async fn process(&self, req: Request, next: Next<'_>) -> Reply {
        if req.method == http::Method::GET && req.path().starts_with(&self.prefix) {
            return self.serve(req.path()).await;
        }
        next.run(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReplyKind;

    #[test]
    fn traversal_is_rejected() {
        let s = StaticFiles::new("/static", "/srv/www");

        assert_eq!(s.resolve("/static/css/a.css"), Some(PathBuf::from("/srv/www/css/a.css")));
        assert_eq!(s.resolve("/static/../etc/passwd"), None);
        assert_eq!(s.resolve("/static/%2e%2e/etc/passwd"), None);
        assert_eq!(s.resolve("/static/"), None);
        assert_eq!(s.resolve("/other/a.css"), None);
    }

    #[tokio::test]
    async fn serves_with_mime() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("app.css"), "body {}").unwrap();

        let s = StaticFiles::new("/static/", dir.path());
        match s.serve("/static/app.css").await.kind {
            ReplyKind::Bytes { content_type, data } => {
                assert_eq!(content_type, "text/css");
                assert_eq!(&data[..], b"body {}");
            }
            other => panic!("unexpected {:?}", other),
        }

        assert_eq!(s.serve("/static/missing.css").await.status_code(), http::StatusCode::NOT_FOUND);
    }
}
