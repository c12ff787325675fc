//! News normalization.
//!
//! Provider records are loosely shaped: the same field may appear under
//! different names, be missing, or hold a non-string. Each canonical field
//! has an ordered list of JSON pointers. The first one that resolves to a
//! non-empty string wins, and the lists are evaluated independently, so a
//! title may come from `headline` while the source comes from `source`.

use serde_json::Value;

use crate::{NewsArticle, RawArticle, ABSENT_LINK};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_SOURCE: &str = "Financial News";
/// Title placeholder that the render pass replaces with a synthesized label.
pub const UNTITLED_ARTICLE: &str = "Untitled Article";
pub const DEFAULT_ARTICLE_LIMIT: usize = 5;

const TITLE_FIELDS: &[&str] = &["/title", "/headline", "/content/title"];
const LINK_FIELDS: &[&str] = &[
    "/link",
    "/url",
    "/content/canonicalUrl/url",
    "/content/clickThroughUrl/url",
];
const SOURCE_FIELDS: &[&str] = &["/source", "/publisher", "/content/provider/displayName"];

fn first_string<'a>(raw: &'a Value, pointers: &[&str]) -> Option<&'a str> {
    pointers
        .iter()
        .filter_map(|pointer| raw.pointer(pointer))
        .filter_map(Value::as_str)
        .find(|value| !value.is_empty())
}

/// Extract the canonical `{title, link, source}` from a raw record.
pub fn normalize_article(raw: &RawArticle) -> NewsArticle {
    NewsArticle {
        title: first_string(raw, TITLE_FIELDS)
            .unwrap_or(DEFAULT_TITLE)
            .to_owned(),
        link: first_string(raw, LINK_FIELDS)
            .unwrap_or(ABSENT_LINK)
            .to_owned(),
        source: first_string(raw, SOURCE_FIELDS)
            .unwrap_or(DEFAULT_SOURCE)
            .to_owned(),
    }
}

/// Render-time pass over an already normalized article.
///
/// Trims every field. An empty link becomes [`ABSENT_LINK`] and an empty
/// source becomes [`DEFAULT_SOURCE`]. A missing or placeholder title is
/// replaced with `"Article {index + 1} from {source}"`, where `index` is the
/// article's position within its ticker's list.
pub fn revalidate_article(article: &NewsArticle, index: usize) -> NewsArticle {
    let source = match article.source.trim() {
        "" => DEFAULT_SOURCE,
        source => source,
    };
    let link = match article.link.trim() {
        "" => ABSENT_LINK,
        link => link,
    };
    let title = match article.title.trim() {
        "" | UNTITLED_ARTICLE | DEFAULT_TITLE => format!("Article {} from {source}", index + 1),
        title => title.to_owned(),
    };

    NewsArticle {
        title,
        link: link.to_owned(),
        source: source.to_owned(),
    }
}

/// The first `limit` items, in provider order.
pub fn select_top_articles<T>(articles: &[T], limit: usize) -> &[T] {
    &articles[..articles.len().min(limit)]
}

/// Truncate, normalize and re-validate one ticker's raw news list.
pub fn normalize_feed(raw: &[RawArticle], limit: usize) -> Vec<NewsArticle> {
    select_top_articles(raw, limit)
        .iter()
        .enumerate()
        .map(|(index, item)| revalidate_article(&normalize_article(item), index))
        .collect()
}
