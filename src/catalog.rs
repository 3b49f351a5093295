//! Open Library lookup used by the "Fetch from Open Library" screen.
//!
//! A single blocking GET against the title search endpoint; the first returned
//! document becomes a pre-filled book the user may accept into the library.

use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info, warn};
use serde::Deserialize;

use crate::config::AppConfig;
use crate::models::Book;

/// Placeholder for catalog fields that are missing in the response.
pub const UNKNOWN: &str = "Unknown";

/// Anything that can turn a title into catalog metadata. The TUI only talks to
/// this trait so tests can drive it with canned answers.
pub trait CatalogLookup {
    /// `Ok(None)` means the catalog answered but had nothing for `title`.
    fn lookup(&self, title: &str) -> Result<Option<CatalogBook>>;
}

/// A fetched record: the book as it would be added plus display-only extras.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogBook {
    pub book: Book,
    pub cover_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    num_found: u64,
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    first_publish_year: Option<i64>,
    key: Option<String>,
    cover_i: Option<i64>,
}

/// Endpoints used to turn a search document into links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogUrls {
    pub search_url: String,
    pub base_url: String,
    pub cover_base_url: String,
}

impl CatalogUrls {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            search_url: config.catalog_search_url.clone(),
            base_url: config.catalog_base_url.clone(),
            cover_base_url: config.cover_base_url.clone(),
        }
    }

    /// Large cover image for a cover id.
    pub fn cover_url(&self, cover_id: i64) -> String {
        format!("{}/b/id/{cover_id}-L.jpg", self.cover_base_url)
    }
}

/// Map a raw search response body to the first matching book.
pub fn parse_search_response(body: &str, urls: &CatalogUrls) -> Result<Option<CatalogBook>> {
    let response: SearchResponse =
        serde_json::from_str(body).context("catalog returned an unexpected response")?;
    Ok(first_book(response, urls))
}

fn first_book(response: SearchResponse, urls: &CatalogUrls) -> Option<CatalogBook> {
    if response.num_found == 0 {
        return None;
    }
    let doc = response.docs.into_iter().next()?;

    let link = doc
        .key
        .filter(|key| !key.is_empty())
        .map(|key| format!("{}{key}", urls.base_url))
        .unwrap_or_default();
    let book = Book {
        title: doc.title.unwrap_or_else(|| UNKNOWN.to_string()),
        author: doc
            .author_name
            .into_iter()
            .next()
            .unwrap_or_else(|| UNKNOWN.to_string()),
        year: doc.first_publish_year.unwrap_or(0),
        genre: UNKNOWN.to_string(),
        read: false,
        link,
    };

    Some(CatalogBook {
        book,
        cover_url: doc.cover_i.map(|id| urls.cover_url(id)),
    })
}

/// HTTP client for the public Open Library search API.
pub struct OpenLibraryClient {
    agent: ureq::Agent,
    urls: CatalogUrls,
}

impl OpenLibraryClient {
    pub fn new(config: &AppConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout)
            .timeout_read(config.read_timeout)
            .timeout_write(Duration::from_secs(5))
            .user_agent(concat!("library-manager/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            agent,
            urls: CatalogUrls::from_config(config),
        }
    }
}

impl CatalogLookup for OpenLibraryClient {
    fn lookup(&self, title: &str) -> Result<Option<CatalogBook>> {
        debug!("catalog search {} title={title:?}", self.urls.search_url);
        let response = self
            .agent
            .get(&self.urls.search_url)
            .query("title", title)
            .call()
            .inspect_err(|err| warn!("catalog request for {title:?} failed: {err}"))
            .context("catalog request failed")?;
        let body = response
            .into_string()
            .context("failed to read catalog response")?;
        let found = parse_search_response(&body, &self.urls)
            .inspect_err(|err| warn!("catalog response for {title:?}: {err:#}"))?;
        match &found {
            Some(hit) => info!("catalog matched {title:?} to {:?}", hit.book.title),
            None => info!("catalog has no match for {title:?}"),
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls() -> CatalogUrls {
        CatalogUrls {
            search_url: "https://openlibrary.org/search.json".to_string(),
            base_url: "https://openlibrary.org".to_string(),
            cover_base_url: "https://covers.openlibrary.org".to_string(),
        }
    }

    #[test]
    fn maps_first_document() {
        let body = r#"{
            "numFound": 1,
            "docs": [{
                "title": "Dune",
                "author_name": ["Frank Herbert"],
                "first_publish_year": 1965,
                "key": "/works/OL1W"
            }]
        }"#;
        let hit = parse_search_response(body, &urls()).unwrap().unwrap();
        assert_eq!(
            hit.book,
            Book::new(
                "Dune",
                "Frank Herbert",
                1965,
                "Unknown",
                false,
                "https://openlibrary.org/works/OL1W"
            )
        );
        assert_eq!(hit.cover_url, None);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let body = r#"{"numFound": 3, "docs": [{"cover_i": 42}, {"title": "Other"}]}"#;
        let hit = parse_search_response(body, &urls()).unwrap().unwrap();
        assert_eq!(hit.book.title, "Unknown");
        assert_eq!(hit.book.author, "Unknown");
        assert_eq!(hit.book.year, 0);
        assert_eq!(hit.book.link, "");
        assert_eq!(
            hit.cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/42-L.jpg")
        );
    }

    #[test]
    fn zero_results_is_none() {
        let body = r#"{"numFound": 0, "docs": []}"#;
        assert_eq!(parse_search_response(body, &urls()).unwrap(), None);
    }

    #[test]
    fn positive_count_without_docs_is_none() {
        let body = r#"{"numFound": 5}"#;
        assert_eq!(parse_search_response(body, &urls()).unwrap(), None);
    }

    #[test]
    fn unexpected_body_is_an_error() {
        assert!(parse_search_response("<html>busy</html>", &urls()).is_err());
        assert!(parse_search_response(r#"{"docs": []}"#, &urls()).is_err());
    }

    #[test]
    fn ignores_unknown_fields() {
        let body = r#"{"numFound": 1, "start": 0, "docs": [{"title": "Emma", "ratings_count": 9}]}"#;
        let hit = parse_search_response(body, &urls()).unwrap().unwrap();
        assert_eq!(hit.book.title, "Emma");
    }
}
