//! Request handler module
//!
//! Routes validated wiki requests to the view, edit, and save handlers.

pub mod router;
pub mod wiki;

// Re-export main entry point
pub use router::handle_request;
