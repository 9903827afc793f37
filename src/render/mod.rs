//! Page rendering module
//!
//! The request handlers only depend on the [`Renderer`] capability; the
//! file-backed [`HtmlTemplates`] is the implementation used at runtime.

mod html;

pub use html::HtmlTemplates;

use crate::error::RenderError;
use crate::storage::Page;

/// Named template a page can be rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Template {
    View,
    Edit,
}

impl Template {
    pub const fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
        }
    }
}

/// Turns a page plus a template into response bytes
pub trait Renderer: Send + Sync {
    fn render(&self, template: Template, page: &Page) -> Result<Vec<u8>, RenderError>;
}
