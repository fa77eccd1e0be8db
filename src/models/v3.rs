//! Cloud Controller v3 list wrapper

use serde::Deserialize;

/// Generic v3 response with a resources array
#[derive(Debug, Deserialize)]
pub struct V3List<T> {
    pub resources: Vec<T>,

    #[serde(default)]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub next: Option<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    pub href: String,
}

impl<T> V3List<T> {
    /// URL of the next page, if there is one
    pub fn next_page(&self) -> Option<&str> {
        self.pagination
            .as_ref()
            .and_then(|p| p.next.as_ref())
            .map(|link| link.href.as_str())
    }
}
