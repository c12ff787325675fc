use serde::{Deserialize, Serialize};

/// Provider news record as received; field names and types vary per article.
pub type RawArticle = serde_json::Value;

/// Link value used when an article has no usable URL.
pub const ABSENT_LINK: &str = "#";

/// Canonical news article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    /// Article URL, or [`ABSENT_LINK`].
    pub link: String,
    pub source: String,
}

impl NewsArticle {
    /// The article URL, if one is present.
    pub fn href(&self) -> Option<&str> {
        let link = self.link.trim();
        if link.is_empty() || link == ABSENT_LINK {
            None
        } else {
            Some(link)
        }
    }
}
