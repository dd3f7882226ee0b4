use std::{error::Error as _, path::Path};

use awesome_web::{RenderError, Renderer};
use serde_json::{Map, Value as Json};
use tera::{Context, Tera};

use crate::markup;

/// Tera templates loaded once from a directory
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    pub fn new(dir: &Path) -> tera::Result<Self> {
        let glob = format!("{}/**/*.html", dir.display());
        log::info!("load templates from {}", dir.display());

        let tera = Tera::new(&glob)?;
        Ok(Self::from_tera(tera))
    }

    /// Register the filters on an already built `Tera`
    pub fn from_tera(mut tera: Tera) -> Self {
        tera.register_filter("datetime", markup::datetime_filter);
        Self { tera }
    }
}

impl Renderer for TeraRenderer {
    fn render(&self, name: &str, context: &Map<String, Json>) -> Result<String, RenderError> {
        let render_err = |reason: String| RenderError {
            name: name.into(),
            reason,
        };

        let context = Context::from_value(Json::Object(context.clone())).map_err(|e| render_err(e.to_string()))?;
        self.tera.render(name, &context).map_err(|e| {
            // tera keeps the useful part of the message in the source chain
            let mut reason = e.to_string();
            let mut source = e.source();
            while let Some(s) = source {
                reason = format!("{}: {}", reason, s);
                source = s.source();
            }
            render_err(reason)
        })
    }
}
