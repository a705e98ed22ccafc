//! Template engine for rendering page sources.

use std::fs;
use std::path::Path;

use minijinja::{path_loader, Environment};

use crate::builder::BuildError;

/// Template engine using minijinja.
///
/// Templates are looked up by their path relative to the HTML source
/// directory, so pages can `{% include "blocks/header.html" %}`.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create an engine that loads templates from `html_dir`.
    pub fn new(html_dir: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(html_dir));
        env.set_keep_trailing_newline(true);

        Self { env }
    }

    #[cfg(test)]
    fn empty() -> Self {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);

        Self { env }
    }

    #[cfg(test)]
    fn add_template(&mut self, name: &str, source: &str) -> Result<(), minijinja::Error> {
        self.env
            .add_template_owned(name.to_string(), source.to_string())
    }

    /// Render the template `name` with `data` as the global context.
    pub fn render_page(
        &self,
        name: &str,
        data: &serde_json::Value,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(name)?;
        tmpl.render(data)
    }
}

/// Load the optional global template context from `path`.
///
/// A missing file is an empty object. A malformed one fails the whole build
/// as a read error rather than being recorded per page.
pub fn load_data(path: &Path) -> Result<serde_json::Value, BuildError> {
    if !path.exists() {
        return Ok(serde_json::Value::Object(Default::default()));
    }

    let content = fs::read_to_string(path)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))?;

    serde_json::from_str(&content)
        .map_err(|e| BuildError::ReadError(format!("{}: {}", path.display(), e)))
}
