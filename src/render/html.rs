//! File-backed HTML templates
//!
//! Templates are read once at startup from `<dir>/<name>.html`. Placeholders
//! `{{prefix}}`, `{{title}}` and `{{body}}` are replaced with HTML-escaped
//! page values in a single pass, so placeholder text inside a page body is
//! never expanded. Unknown placeholders are left as written.

use std::fs;
use std::path::Path;

use super::{Renderer, Template};
use crate::error::RenderError;
use crate::storage::Page;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// Parsed `view` and `edit` templates
#[derive(Debug, Clone)]
pub struct HtmlTemplates {
    view: String,
    edit: String,
}

impl HtmlTemplates {
    /// Load every template from `dir`. A missing template is an error.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, RenderError> {
        let dir = dir.as_ref();
        let read = |template: Template| {
            let path = dir.join(format!("{}.html", template.name()));
            fs::read_to_string(&path).map_err(|source| RenderError::Load { path, source })
        };
        Ok(Self {
            view: read(Template::View)?,
            edit: read(Template::Edit)?,
        })
    }

    #[cfg(test)]
    pub fn from_sources(view: &str, edit: &str) -> Self {
        Self {
            view: view.to_string(),
            edit: edit.to_string(),
        }
    }

    fn source(&self, template: Template) -> &str {
        match template {
            Template::View => &self.view,
            Template::Edit => &self.edit,
        }
    }
}

impl Renderer for HtmlTemplates {
    fn render(&self, template: Template, page: &Page) -> Result<Vec<u8>, RenderError> {
        let body = std::str::from_utf8(&page.body).map_err(|_| RenderError::InvalidBody {
            title: page.title.clone(),
        })?;
        Ok(substitute(self.source(template), |name| match name {
            "prefix" => Some(escape_html(&page.prefix)),
            "title" => Some(escape_html(&page.title)),
            "body" => Some(escape_html(body)),
            _ => None,
        })
        .into_bytes())
    }
}

fn substitute(source: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let Some(end) = after_open.find(CLOSE) else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = after_open[..end].trim();
        match lookup(name) {
            Some(value) => out.push_str(&value),
            None => out.push_str(&rest[start..start + OPEN.len() + end + CLOSE.len()]),
        }
        rest = &after_open[end + CLOSE.len()..];
    }
    out.push_str(rest);
    out
}

/// Escape HTML special characters.
#[must_use]
fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}
