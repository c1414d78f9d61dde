use std::path::Path;

use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template error: {0}")]
    Tera(#[from] tera::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("theme directory {0} does not exist")]
    MissingTheme(String),
}

/// Tera templates plus the context every page shares.
pub struct TemplateRenderer {
    tera: Tera,
    global: Context,
}

impl TemplateRenderer {
    /// Load every `*.html` template below `theme_dir`.
    pub fn new<P: AsRef<Path>>(theme_dir: P) -> Result<Self, TemplateError> {
        let theme_dir = theme_dir.as_ref();
        if !theme_dir.is_dir() {
            return Err(TemplateError::MissingTheme(theme_dir.display().to_string()));
        }
        let glob = format!("{}/**/*.html", theme_dir.display());
        Ok(Self::with_tera(Tera::new(&glob)?))
    }

    /// Build from in-memory `(name, source)` pairs.
    pub fn from_raw(templates: &[(&str, &str)]) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(templates.iter().copied())?;
        Ok(Self::with_tera(tera))
    }

    fn with_tera(mut tera: Tera) -> Self {
        tera.autoescape_on(vec![".html"]);
        Self {
            tera,
            global: Context::new(),
        }
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|t| t == name)
    }

    /// Add a value visible to every render.
    pub fn set_global<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        self.global.insert(key, value);
    }

    /// Render `template` with the global context extended by `page`.
    pub fn render(&self, template: &str, page: &Context) -> Result<String, TemplateError> {
        let mut context = self.global.clone();
        context.extend(page.clone());
        Ok(self.tera.render(template, &context)?)
    }

    pub fn render_to_file(
        &self,
        template: &str,
        page: &Context,
        output_path: &Path,
    ) -> Result<(), TemplateError> {
        let rendered = self.render(template, page)?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(output_path, rendered)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_context_overrides_globals() {
        let mut renderer =
            TemplateRenderer::from_raw(&[("t.html", "{{ site }}:{{ title }}")]).unwrap();
        renderer.set_global("site", "kiln");
        renderer.set_global("title", "default");

        let mut page = Context::new();
        page.insert("title", "Hello");
        assert_eq!(renderer.render("t.html", &page).unwrap(), "kiln:Hello");
    }

    #[test]
    fn html_is_escaped_unless_marked_safe() {
        let renderer = TemplateRenderer::from_raw(&[(
            "t.html",
            "{{ body }}|{{ body | safe }}",
        )])
        .unwrap();
        let mut page = Context::new();
        page.insert("body", "<b>x</b>");
        assert_eq!(
            renderer.render("t.html", &page).unwrap(),
            "&lt;b&gt;x&lt;&#x2F;b&gt;|<b>x</b>"
        );
    }

    #[test]
    fn loads_from_theme_dir_and_writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let theme = dir.path().join("theme");
        std::fs::create_dir_all(&theme).unwrap();
        std::fs::write(theme.join("page.html"), "<h1>{{ title }}</h1>").unwrap();

        let renderer = TemplateRenderer::new(&theme).unwrap();
        assert!(renderer.has_template("page.html"));

        let mut page = Context::new();
        page.insert("title", "Hi");
        let out = dir.path().join("out/a/index.html");
        renderer.render_to_file("page.html", &page, &out).unwrap();
        assert_eq!(std::fs::read_to_string(out).unwrap(), "<h1>Hi</h1>");
    }

    #[test]
    fn missing_theme_is_reported() {
        let err = TemplateRenderer::new("/no/such/theme").err().unwrap();
        assert!(matches!(err, TemplateError::MissingTheme(_)));
    }
}
