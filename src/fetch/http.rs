//! reqwest-backed collaborators.

use super::html::{extract_links, extract_meta, host_within, registrable_domain};
use super::{FetchedPage, KeywordSearcher, PageFetcher, ProfileSource, SearchHits};
use crate::config::{HttpConfig, PlatformConfig, SearchConfig};
use crate::models::Profile;
use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Build the shared HTTP client. Redirects are followed (reqwest default).
pub fn build_client(config: &HttpConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.clone())
        .build()
        .context("Failed to create HTTP client")
}

/// Fetch a URL and return its body text and post-redirect URL.
async fn get_text(client: &reqwest::Client, url: &str) -> Result<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Request to {} failed", url))?;

    let final_url = response.url().to_string();
    let response = response
        .error_for_status()
        .with_context(|| format!("Bad status from {}", url))?;
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read body from {}", url))?;

    debug!("Fetched {} ({} bytes, final URL {})", url, body.len(), final_url);
    Ok(FetchedPage { body, final_url })
}

/// Generic page fetcher.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        get_text(&self.client, url).await
    }
}

/// Profile lookup: structured API first when configured, HTML page otherwise.
pub struct HttpProfileSource {
    client: reqwest::Client,
    page_template: String,
    api_template: Option<String>,
    ignored_domains: Vec<String>,
}

impl HttpProfileSource {
    pub fn new(client: reqwest::Client, platform: &PlatformConfig) -> Self {
        Self {
            client,
            page_template: platform.profile_url_template.clone(),
            api_template: platform.profile_api_template.clone(),
            ignored_domains: platform.ignored_link_domains.clone(),
        }
    }

    async fn fetch_from_api(&self, template: &str, handle: &str) -> Result<Profile> {
        let url = profile_url(template, handle);
        let page = get_text(&self.client, &url).await?;
        let value: Value = serde_json::from_str(&page.body)
            .with_context(|| format!("Profile API returned invalid JSON for {}", handle))?;
        parse_api_profile(&value, handle)
    }

    async fn fetch_from_page(&self, handle: &str) -> Result<Profile> {
        let url = profile_url(&self.page_template, handle);
        let page = get_text(&self.client, &url).await?;
        Ok(parse_profile_page(
            &page.body,
            &page.final_url,
            handle,
            &self.ignored_domains,
        ))
    }
}

#[async_trait]
impl ProfileSource for HttpProfileSource {
    async fn fetch_profile(&self, handle: &str) -> Result<Profile> {
        if let Some(ref template) = self.api_template {
            match self.fetch_from_api(template, handle).await {
                Ok(profile) => return Ok(profile),
                Err(e) => debug!("Profile API unavailable for {}, using page: {:#}", handle, e),
            }
        }
        self.fetch_from_page(handle).await
    }
}

/// Substitute the percent-encoded `handle` into a profile URL template.
pub fn profile_url(template: &str, handle: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(handle.as_bytes()).collect();
    template.replace("{handle}", &encoded)
}

/// Read a profile from a `data.user` JSON document.
pub fn parse_api_profile(value: &Value, handle: &str) -> Result<Profile> {
    let user = value
        .pointer("/data/user")
        .context("Profile API response has no data.user")?;

    let text = |key: &str| -> String {
        user.get(key)
            .and_then(Value::as_str)
            .unwrap_or("")
            .to_string()
    };

    let mut bio_links: Vec<String> = Vec::new();
    let external = text("external_url");
    if !external.is_empty() {
        bio_links.push(external);
    }
    if let Some(links) = user.get("bio_links").and_then(Value::as_array) {
        for link in links {
            if let Some(url) = link.get("url").and_then(Value::as_str) {
                push_unique(&mut bio_links, url.to_string());
            }
        }
    }

    let username = text("username");
    Ok(Profile {
        handle: if username.is_empty() {
            handle.to_string()
        } else {
            username
        },
        display_name: text("full_name"),
        biography: text("biography"),
        avatar_url: text("profile_pic_url"),
        bio_links,
    })
}

/// Read a profile from its HTML page: meta tags for the text fields and
/// anchors leaving the profile's site for the bio links.
///
/// Links within the page's registrable domain or any of `ignored_domains`
/// are navigation and footer chrome.
pub fn parse_profile_page(
    html: &str,
    page_url: &str,
    handle: &str,
    ignored_domains: &[String],
) -> Profile {
    let meta = extract_meta(html);
    let own_domain = Url::parse(page_url)
        .ok()
        .and_then(|u| u.host_str().map(registrable_domain));

    let mut bio_links: Vec<String> = Vec::new();
    for link in extract_links(html, page_url) {
        let host = match Url::parse(&link).ok().and_then(|u| u.host_str().map(str::to_string)) {
            Some(h) => h,
            None => continue,
        };
        if own_domain.as_deref() == Some(registrable_domain(&host).as_str())
            || ignored_domains.iter().any(|d| host_within(&host, d))
        {
            continue;
        }
        push_unique(&mut bio_links, link);
    }

    Profile {
        handle: handle.to_string(),
        display_name: meta
            .title
            .as_deref()
            .map(display_name_from_title)
            .unwrap_or_default(),
        biography: meta.description.unwrap_or_default(),
        avatar_url: meta.image.unwrap_or_default(),
        bio_links,
    }
}

/// `"Jane Doe (@jane) • Instagram"` → `"Jane Doe"`.
fn display_name_from_title(title: &str) -> String {
    title
        .split(" (@")
        .next()
        .unwrap_or(title)
        .trim()
        .to_string()
}

fn push_unique(links: &mut Vec<String>, link: String) {
    if !links.contains(&link) {
        links.push(link);
    }
}

/// Search-engine scraper that counts target-pattern occurrences in the
/// result page.
pub struct HttpSearcher {
    client: reqwest::Client,
    engine_template: String,
    /// Configured pattern text alongside its compiled form.
    patterns: Vec<(String, Regex)>,
}

impl HttpSearcher {
    pub fn new(client: reqwest::Client, config: &SearchConfig) -> Result<Self> {
        let patterns = config
            .match_patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("(?i){}", p))
                    .map(|re| (p.clone(), re))
                    .with_context(|| format!("Invalid search match pattern: {}", p))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            engine_template: config.engine_url_template.clone(),
            patterns,
        })
    }

    /// Occurrences of every pattern in `text`, and which patterns hit.
    pub fn scan(&self, text: &str) -> SearchHits {
        let mut hits = SearchHits::default();
        for (source, re) in &self.patterns {
            let found = re.find_iter(text).count();
            if found > 0 {
                hits.count += found;
                hits.matched.push(source.clone());
            }
        }
        hits
    }
}

/// Substitute the URL-encoded `query` into an engine URL template.
pub fn search_url(template: &str, query: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    template.replace("{query}", &encoded)
}

#[async_trait]
impl KeywordSearcher for HttpSearcher {
    async fn search(&self, query: &str) -> Result<SearchHits> {
        let url = search_url(&self.engine_template, query);
        let page = get_text(&self.client, &url).await?;
        let hits = self.scan(&page.body);
        debug!("Search {:?}: {} matches of {:?}", query, hits.count, hits.matched);
        Ok(hits)
    }
}
