/// A wiki page for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Mount prefix, carried to rendering so links match the routes
    pub prefix: String,
    pub title: String,
    pub body: Vec<u8>,
}

impl Page {
    pub fn new(prefix: &str, title: &str, body: Vec<u8>) -> Self {
        Self {
            prefix: prefix.to_string(),
            title: title.to_string(),
            body,
        }
    }

    /// Page with no content yet, shown when editing a title that was never saved
    pub fn empty(prefix: &str, title: &str) -> Self {
        Self::new(prefix, title, Vec::new())
    }
}
