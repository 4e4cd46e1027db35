//! Template engine for the HTML report
//!
//! Uses Tera templates (Jinja2-like); `.html` templates are autoescaped.

use std::path::Path;
use serde::Serialize;
use tera::{Context, Tera};

use super::error::ReportResult;

/// Landing page with the list of data types
const INDEX_TEMPLATE: &str = include_str!("templates/index.html");

/// One page per data type
const DATA_TYPE_TEMPLATE: &str = include_str!("templates/data_type.html");

/// Stylesheet copied next to the pages
pub const REPORT_CSS: &str = include_str!("templates/report.css");

const TEMPLATE_NAMES: [(&str, &str); 2] = [
    ("index.html", INDEX_TEMPLATE),
    ("data_type.html", DATA_TYPE_TEMPLATE),
];

/// Template engine for rendering report pages
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    /// Create a template engine with the built-in templates
    pub fn new() -> ReportResult<Self> {
        let mut tera = Tera::default();
        for (name, content) in TEMPLATE_NAMES {
            tera.add_raw_template(name, content)?;
        }
        Ok(Self { tera })
    }

    /// Load templates from a directory, falling back to the built-in ones
    pub fn with_directory(template_dir: impl AsRef<Path>) -> ReportResult<Self> {
        let glob_pattern = format!("{}/**/*.html", template_dir.as_ref().display());
        let mut tera = Tera::new(&glob_pattern)?;

        for (name, content) in TEMPLATE_NAMES {
            if !tera.get_template_names().any(|n| n == name) {
                tera.add_raw_template(name, content)?;
            }
        }
        Ok(Self { tera })
    }

    /// Render the index page
    pub fn render_index<P: Serialize>(
        &self,
        case_name: &str,
        generated_at: &str,
        pages: &[P],
    ) -> ReportResult<String> {
        let mut context = Context::new();
        context.insert("case_name", case_name);
        context.insert("generated_at", generated_at);
        context.insert("pages", pages);
        Ok(self.tera.render("index.html", &context)?)
    }

    /// Render one data type page
    pub fn render_data_type<P: Serialize>(&self, case_name: &str, page: &P) -> ReportResult<String> {
        let mut context = Context::new();
        context.insert("case_name", case_name);
        context.insert("page", page);
        Ok(self.tera.render("data_type.html", &context)?)
    }

    /// List available templates
    pub fn list_templates(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_template_engine_creation() {
        let engine = TemplateEngine::new().unwrap();
        let mut names = engine.list_templates();
        names.sort();
        assert_eq!(names, vec!["data_type.html", "index.html"]);
    }

    #[test]
    fn test_index_escapes_names() {
        let engine = TemplateEngine::new().unwrap();
        let pages = vec![json!({"name": "<b>Bookmarks</b>", "file_name": "Web Bookmarks.html", "rows": 3})];
        let html = engine.render_index("Case & Co", "now", &pages).unwrap();
        assert!(html.contains("Case &amp; Co"));
        assert!(html.contains("&lt;b&gt;Bookmarks&lt;&#x2F;b&gt;"));
        assert!(html.contains("content/Web%20Bookmarks.html"));
    }

    #[test]
    fn test_directory_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "custom {{ case_name }}").unwrap();
        let engine = TemplateEngine::with_directory(dir.path()).unwrap();
        let html = engine.render_index::<serde_json::Value>("X", "now", &[]).unwrap();
        assert_eq!(html, "custom X");
        assert_eq!(engine.list_templates().len(), 2);
    }
}
