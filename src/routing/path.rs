//! Path grammar matching
//!
//! The grammar is compiled once from the mount prefix and shared read-only.

use regex::Regex;
use std::fmt;

/// Operation requested on a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Save,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }

    fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "view" => Some(Self::View),
            "edit" => Some(Self::Edit),
            "save" => Some(Self::Save),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path that satisfied the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub action: Action,
    pub title: String,
}

/// Compiled path grammar for one mount prefix
#[derive(Debug, Clone)]
pub struct PathRouter {
    prefix: String,
    pattern: Regex,
}

impl PathRouter {
    /// Compile the grammar for `prefix`. The prefix is matched literally.
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^{}/(view|edit|save)/([a-zA-Z0-9]+)$",
            regex::escape(prefix)
        ))?;
        Ok(Self {
            prefix: prefix.to_string(),
            pattern,
        })
    }

    /// Match a request path, returning `None` when it does not fit the grammar
    pub fn match_path(&self, path: &str) -> Option<Route> {
        let caps = self.pattern.captures(path)?;
        let action = Action::from_keyword(caps.get(1)?.as_str())?;
        Some(Route {
            action,
            title: caps.get(2)?.as_str().to_string(),
        })
    }

    /// Build the path of `action` for `title` under this router's prefix
    pub fn link(&self, action: Action, title: &str) -> String {
        format!("{}/{}/{}", self.prefix, action, title)
    }
}
