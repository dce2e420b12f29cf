//! Outbound collaborators: page fetching, profile lookup and keyword search.
//!
//! The checker only talks to these traits. Call sites go through
//! `fetch_or_empty`, `profile_or_minimal` and `search_or_zero`, which turn an
//! error into an empty result and a warning so one failing branch never
//! aborts a check.

pub mod html;
pub mod http;

use crate::models::Profile;
use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

pub use http::{HttpFetcher, HttpProfileSource, HttpSearcher};

/// A fetched page and the URL it ended up at after redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    pub body: String,
    pub final_url: String,
}

impl FetchedPage {
    /// Empty page standing in for a failed fetch of `url`.
    pub fn empty(url: &str) -> Self {
        Self {
            body: String::new(),
            final_url: url.to_string(),
        }
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}

#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn fetch_profile(&self, handle: &str) -> Result<Profile>;
}

/// What one search-result page says about the target platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHits {
    /// Total occurrences of every pattern.
    pub count: usize,
    /// Patterns that matched at least once, in configured order.
    pub matched: Vec<String>,
}

#[async_trait]
pub trait KeywordSearcher: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchHits>;
}

/// Fetch `url`, degrading to an empty page on failure.
pub async fn fetch_or_empty(fetcher: &dyn PageFetcher, url: &str) -> FetchedPage {
    match fetcher.fetch(url).await {
        Ok(page) => page,
        Err(e) => {
            warn!("Fetch failed for {}: {:#}", url, e);
            FetchedPage::empty(url)
        }
    }
}

/// Look up `handle`, degrading to a minimal profile on failure.
pub async fn profile_or_minimal(source: &dyn ProfileSource, handle: &str) -> Profile {
    match source.fetch_profile(handle).await {
        Ok(profile) => profile,
        Err(e) => {
            warn!("Profile lookup failed for {}: {:#}", handle, e);
            Profile::minimal(handle)
        }
    }
}

/// Run `query`, degrading to zero matches on failure.
pub async fn search_or_zero(searcher: &dyn KeywordSearcher, query: &str) -> SearchHits {
    match searcher.search(query).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!("Search failed for {}: {:#}", query, e);
            SearchHits::default()
        }
    }
}
