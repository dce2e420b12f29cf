//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.subscout.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = ".subscout.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound HTTP client settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Target platform and profile source settings.
    #[serde(default)]
    pub platform: PlatformConfig,

    /// Link resolver settings.
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Search signal settings.
    #[serde(default)]
    pub search: SearchConfig,
}

fn default_ignored_link_domains() -> Vec<String> {
    vec![
        "instagram.com",
        "cdninstagram.com",
        "facebook.com",
        "fb.com",
        "fbcdn.net",
        "meta.com",
        "threads.net",
        "threads.com",
        "whatsapp.com",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Inbound API server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

/// Outbound HTTP settings shared by every fetch and search call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    5
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

/// Target platform and profile source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Hostname of the subscription platform. Matched as a substring.
    #[serde(default = "default_target_domain")]
    pub target_domain: String,

    /// Keyword appended to search queries.
    #[serde(default = "default_search_keyword")]
    pub search_keyword: String,

    /// Profile page URL; `{handle}` is replaced.
    #[serde(default = "default_profile_url_template")]
    pub profile_url_template: String,

    /// Optional structured profile API URL; `{handle}` is replaced.
    #[serde(default)]
    pub profile_api_template: Option<String>,

    /// Link-in-bio aggregator domains.
    #[serde(default = "default_aggregator_domains")]
    pub aggregator_domains: Vec<String>,

    /// Domains whose links on a profile page are site chrome, not bio links.
    /// Subdomains are covered.
    #[serde(default = "default_ignored_link_domains")]
    pub ignored_link_domains: Vec<String>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            target_domain: default_target_domain(),
            search_keyword: default_search_keyword(),
            profile_url_template: default_profile_url_template(),
            profile_api_template: None,
            aggregator_domains: default_aggregator_domains(),
            ignored_link_domains: default_ignored_link_domains(),
        }
    }
}

fn default_target_domain() -> String {
    "onlyfans.com".to_string()
}

fn default_search_keyword() -> String {
    "onlyfans".to_string()
}

fn default_profile_url_template() -> String {
    "https://www.instagram.com/{handle}/".to_string()
}

fn default_aggregator_domains() -> Vec<String> {
    vec![
        "linktr.ee",
        "beacons.ai",
        "carrd.co",
        "allmylinks.com",
        "linkin.bio",
        "lnk.bio",
        "bio.link",
        "solo.to",
        "tap.bio",
        "hoo.be",
        "campsite.bio",
        "snipfeed.co",
        "msha.ke",
        "linkbio.co",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Link resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Maximum traversal depth from the bio links.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Pause after each fetched page, in milliseconds.
    #[serde(default = "default_link_delay")]
    pub delay_ms: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            delay_ms: default_link_delay(),
        }
    }
}

impl ResolverConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_max_depth() -> usize {
    2
}

fn default_link_delay() -> u64 {
    300
}

/// Search signal settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Number of name variations to query.
    #[serde(default = "default_max_variations")]
    pub max_variations: usize,

    /// Pause between queries, in milliseconds.
    #[serde(default = "default_search_delay")]
    pub delay_ms: u64,

    /// Search engine URL; `{query}` is replaced with the encoded query.
    #[serde(default = "default_engine_url_template")]
    pub engine_url_template: String,

    /// Query shapes issued per name, in order; `{name}` and `{keyword}` are
    /// replaced. A leading `site:<domain>` tags findings with that site.
    #[serde(default = "default_query_templates")]
    pub query_templates: Vec<String>,

    /// Case-insensitive patterns counted in search result pages.
    #[serde(default = "default_match_patterns")]
    pub match_patterns: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_variations: default_max_variations(),
            delay_ms: default_search_delay(),
            engine_url_template: default_engine_url_template(),
            query_templates: default_query_templates(),
            match_patterns: default_match_patterns(),
        }
    }
}

impl SearchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

fn default_max_variations() -> usize {
    3
}

fn default_search_delay() -> u64 {
    500
}

fn default_engine_url_template() -> String {
    "https://www.google.com/search?q={query}".to_string()
}

fn default_query_templates() -> Vec<String> {
    vec![crate::search::DEFAULT_QUERY_TEMPLATE.to_string()]
}

fn default_match_patterns() -> Vec<String> {
    vec![
        r"onlyfans\.com/\w+",
        r"only\s*fans",
        r"\bOF\b.*link",
        r"subscribe.*exclusive",
        r"link\s+in\s+bio.*only",
        r"spicy.*content",
        r"exclusive.*content",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE_NAME);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when the CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref host) = args.host {
            self.server.host = host.clone();
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }

        if let Some(timeout) = args.timeout {
            self.http.timeout_seconds = timeout;
        }

        if let Some(depth) = args.max_depth {
            self.resolver.max_depth = depth;
        }
        if let Some(variations) = args.max_variations {
            self.search.max_variations = variations;
        }

        if args.no_delay {
            self.resolver.delay_ms = 0;
            self.search.delay_ms = 0;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
