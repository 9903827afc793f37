//! Routing module
//!
//! Validates request paths against the wiki grammar
//! `<prefix>/(view|edit|save)/<title>` and extracts the action and title.

mod path;

pub use path::{Action, PathRouter, Route};
