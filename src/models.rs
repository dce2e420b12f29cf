//! Data models for the profile checker.
//!
//! This module contains the core data structures shared by the scorer,
//! the link resolver, the search collector and the HTTP layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete classification of a check result, ordered by strength of evidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Confidence below 15
    NotFound,
    /// Confidence 15-39
    LowConfidence,
    /// Confidence 40-69
    Possibly,
    /// Confidence 70 or more
    HighlyLikely,
    /// A target-platform link was resolved
    Confirmed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotFound => write!(f, "Not Found"),
            Status::LowConfidence => write!(f, "Low Confidence"),
            Status::Possibly => write!(f, "Possibly"),
            Status::HighlyLikely => write!(f, "Highly Likely"),
            Status::Confirmed => write!(f, "Confirmed"),
        }
    }
}

impl Status {
    /// Returns an emoji representation of the status.
    pub fn emoji(&self) -> &'static str {
        match self {
            Status::NotFound => "🟢",
            Status::LowConfidence => "🟡",
            Status::Possibly => "🟠",
            Status::HighlyLikely => "🔴",
            Status::Confirmed => "⛔",
        }
    }
}

/// A social profile as seen by the checker.
///
/// Built once per request from the profile source and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account handle without the leading `@`.
    pub handle: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Biography text.
    pub biography: String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Outbound links shown on the profile, in page order.
    pub bio_links: Vec<String>,
}

impl Profile {
    /// Minimal profile used when the profile cannot be retrieved.
    pub fn minimal(handle: &str) -> Self {
        Self {
            handle: handle.to_string(),
            ..Self::default()
        }
    }

    /// Name variations in discovery order: handle, display name, the display
    /// name's whitespace-separated parts, then those parts concatenated.
    ///
    /// Duplicates and empty strings are dropped; the first occurrence wins.
    pub fn name_variations(&self) -> Vec<String> {
        let parts: Vec<&str> = self.display_name.split_whitespace().collect();
        let joined = parts.concat();

        let candidates = std::iter::once(self.handle.trim())
            .chain(std::iter::once(self.display_name.trim()))
            .chain(parts.iter().copied())
            .chain(std::iter::once(joined.as_str()));

        let mut variations: Vec<String> = Vec::new();
        for candidate in candidates {
            if !candidate.is_empty() && !variations.iter().any(|v| v == candidate) {
                variations.push(candidate.to_string());
            }
        }
        variations
    }
}

/// Where an indicator finding came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    /// Found in profile text.
    General,
    /// General web search.
    Search,
    /// Search restricted to one site.
    SiteSearch(String),
}

/// A single weighted signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicatorFinding {
    pub source: FindingSource,
    pub description: String,
    pub weight: u32,
    /// Search patterns behind the finding, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matched_patterns: Vec<String>,
}

impl IndicatorFinding {
    pub fn new(source: FindingSource, description: impl Into<String>, weight: u32) -> Self {
        Self {
            source,
            description: description.into(),
            weight,
            matched_patterns: Vec::new(),
        }
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.matched_patterns = patterns;
        self
    }
}

/// The public part of a profile returned with a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSummary {
    pub handle: String,
    pub display_name: String,
    pub biography: String,
    pub avatar_url: String,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            handle: profile.handle.clone(),
            display_name: profile.display_name.clone(),
            biography: profile.biography.clone(),
            avatar_url: profile.avatar_url.clone(),
        }
    }
}

/// Evidence collected during a check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evidence {
    /// Descriptions of signals found in the biography.
    pub bio_indicators: Vec<String>,
    /// Descriptions of search-engine signals.
    pub search_findings: Vec<String>,
    /// Number of bio links on the profile.
    pub links_checked: usize,
}

/// The complete result of one check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationResult {
    pub profile: ProfileSummary,
    /// Always within 0..=100.
    pub confidence_score: u8,
    pub status: Status,
    pub resolved_target_links: Vec<String>,
    pub evidence: Evidence,
    pub checked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_ordering() {
        assert!(Status::NotFound < Status::LowConfidence);
        assert!(Status::LowConfidence < Status::Possibly);
        assert!(Status::Possibly < Status::HighlyLikely);
        assert!(Status::HighlyLikely < Status::Confirmed);
    }

    #[test]
    fn test_status_display_and_serde() {
        assert_eq!(Status::HighlyLikely.to_string(), "Highly Likely");
        assert_eq!(
            serde_json::to_string(&Status::LowConfidence).unwrap(),
            "\"low_confidence\""
        );
    }

    #[test]
    fn test_name_variations_order() {
        let profile = Profile {
            handle: "jane_doe".to_string(),
            display_name: "Jane Doe".to_string(),
            ..Profile::default()
        };
        assert_eq!(
            profile.name_variations(),
            vec!["jane_doe", "Jane Doe", "Jane", "Doe", "JaneDoe"]
        );
    }

    #[test]
    fn test_name_variations_collapse_duplicates() {
        let profile = Profile {
            handle: "luna".to_string(),
            display_name: "luna".to_string(),
            ..Profile::default()
        };
        assert_eq!(profile.name_variations(), vec!["luna"]);
    }

    #[test]
    fn test_minimal_profile() {
        let profile = Profile::minimal("ghost");
        assert_eq!(profile.handle, "ghost");
        assert!(profile.biography.is_empty());
        assert!(profile.bio_links.is_empty());
        assert_eq!(profile.name_variations(), vec!["ghost"]);
    }
}
