//! Page storage module
//!
//! One `<title>.txt` file per page inside a fixed directory. The file always
//! holds the full current body; the last completed save wins.

mod page;
mod store;

pub use page::Page;
pub use store::PageStore;
