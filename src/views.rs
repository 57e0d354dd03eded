//! Page rendering: HTML files under `templates/` with `{{name}}` placeholders.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use crate::errors::{AppError, AppResult};

const TEMPLATE_DIR: &str = "templates";

/// A template plus the values substituted into it.
pub struct Page {
    name: &'static str,
    vars: Vec<(&'static str, String)>,
}

impl Page {
    pub fn new(name: &'static str) -> Self {
        Self { name, vars: Vec::new() }
    }

    /// Substitutes user-supplied text, HTML-escaped.
    pub fn text(mut self, key: &'static str, value: &str) -> Self {
        self.vars.push((key, escape_html(value)));
        self
    }

    /// Substitutes markup built by the caller, verbatim.
    pub fn html(mut self, key: &'static str, markup: String) -> Self {
        self.vars.push((key, markup));
        self
    }

    pub fn render(self) -> AppResult<Html<String>> {
        let path = format!("{}/{}", TEMPLATE_DIR, self.name);
        let template = std::fs::read_to_string(&path).map_err(|e| {
            tracing::error!("Failed to read template {}: {}", path, e);
            AppError::Template(format!("{}: {}", path, e))
        })?;

        Ok(Html(fill(&template, &self.vars)))
    }
}

// One pass over the template; substituted values are never scanned again.
fn fill(template: &str, vars: &[(&'static str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            rest = &rest[start..];
            break;
        };

        let key = &after[..end];
        match vars.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => out.push_str(value),
            // unknown placeholders are left as written
            None => out.push_str(&rest[start..start + end + 4]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Status page used by the error mapping and the fallback route.
/// Falls back to plain text when the template itself is unavailable.
pub fn status_page(status: StatusCode, name: &'static str, fallback: &str) -> Response {
    match Page::new(name).render() {
        Ok(html) => (status, html).into_response(),
        Err(_) => (status, fallback.to_string()).into_response(),
    }
}
