use std::collections::HashMap;

use percent_encoding::percent_decode_str;

use crate::RouteError;

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    /// Must equal the path segment exactly
    Literal(String),
    /// `{name}`, matches one non-empty segment
    Capture(String),
}

/// Route path such as `/api/blogs/{id}/comments`
#[derive(Clone, Debug, PartialEq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, RouteError> {
        let err = |reason: &str| RouteError::Pattern {
            pattern: raw.into(),
            reason: reason.into(),
        };

        let rest = raw.strip_prefix('/').ok_or_else(|| err("must start with '/'"))?;

        let mut segments = Vec::new();
        let mut names = Vec::<&str>::new();
        for seg in rest.split('/') {
            if let Some(name) = seg.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(err("capture name must be a non-empty identifier"));
                }
                if names.contains(&name) {
                    return Err(err("duplicate capture name"));
                }
                names.push(name);
                segments.push(Segment::Capture(name.into()));
            } else if seg.contains('{') || seg.contains('}') {
                return Err(err("a capture must span the whole segment"));
            } else {
                segments.push(Segment::Literal(seg.into()));
            }
        }

        Ok(Self {
            raw: raw.into(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn has_capture(&self, name: &str) -> bool {
        self.segments
            .iter()
            .any(|s| matches!(s, Segment::Capture(n) if n == name))
    }

    /// Captures of `path` when it matches the whole pattern
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let parts = rest.split('/').collect::<Vec<_>>();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captures = HashMap::new();
        for (seg, part) in self.segments.iter().zip(parts) {
            match seg {
                Segment::Literal(lit) => {
                    if lit != part {
                        return None;
                    }
                }
                Segment::Capture(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(part).decode_utf8_lossy().into_owned();
                    captures.insert(name.clone(), value);
                }
            }
        }

        Some(captures)
    }
}

impl std::fmt::Display for PathPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures() {
        let p = PathPattern::parse("/api/blogs/{id}/comments").unwrap();

        let m = p.matches("/api/blogs/0015/comments").unwrap();
        assert_eq!(m["id"], "0015");

        assert!(p.matches("/api/blogs//comments").is_none());
        assert!(p.matches("/api/blogs/1").is_none());
        assert!(p.matches("/api/blogs/1/comments/x").is_none());
    }

    #[test]
    fn trailing_slash_is_significant() {
        let p = PathPattern::parse("/manage/").unwrap();
        assert!(p.matches("/manage/").is_some());
        assert!(p.matches("/manage").is_none());

        let root = PathPattern::parse("/").unwrap();
        assert!(root.matches("/").is_some());
        assert!(root.matches("/x").is_none());
    }

    #[test]
    fn bad_patterns() {
        for raw in ["api", "/a/{}", "/a/x{id}", "/{id}/{id}"] {
            assert!(PathPattern::parse(raw).is_err(), "{}", raw);
        }
    }
}
