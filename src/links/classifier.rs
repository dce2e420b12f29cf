//! Domain membership tests for aggregator and target-platform URLs.

use crate::config::PlatformConfig;

/// Classifies URLs by case-insensitive substring match on known domains.
#[derive(Debug, Clone)]
pub struct LinkClassifier {
    target_domain: String,
    aggregator_domains: Vec<String>,
}

impl LinkClassifier {
    pub fn new(target_domain: &str, aggregator_domains: &[String]) -> Self {
        Self {
            target_domain: target_domain.to_lowercase(),
            aggregator_domains: aggregator_domains
                .iter()
                .map(|d| d.to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn from_platform(platform: &PlatformConfig) -> Self {
        Self::new(&platform.target_domain, &platform.aggregator_domains)
    }

    /// Whether `url` belongs to a link-in-bio aggregator.
    pub fn is_aggregator(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.aggregator_domains.iter().any(|d| url.contains(d.as_str()))
    }

    /// Whether `url` points at the target platform.
    pub fn is_target(&self, url: &str) -> bool {
        !self.target_domain.is_empty() && url.to_lowercase().contains(&self.target_domain)
    }
}

impl Default for LinkClassifier {
    fn default() -> Self {
        Self::from_platform(&PlatformConfig::default())
    }
}
