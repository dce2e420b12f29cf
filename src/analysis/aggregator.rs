//! Evidence aggregation and status classification.
//!
//! This module runs the check pipeline (profile, bio indicators, link
//! resolution, search signal) and fuses the partial scores into one
//! confidence value and status.

use crate::analysis::indicators;
use crate::config::Config;
use crate::fetch::{
    self, profile_or_minimal, HttpFetcher, HttpProfileSource, HttpSearcher, KeywordSearcher,
    PageFetcher, ProfileSource,
};
use crate::links::{LinkClassifier, LinkResolver};
use crate::models::{AggregationResult, Evidence, ProfileSummary, Status};
use crate::search::SearchSignalCollector;
use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Cap applied to the summed search score before fusion.
pub const SEARCH_SCORE_CAP: u32 = 40;

/// Highest confidence value.
pub const MAX_CONFIDENCE: u8 = 100;

/// Fuse the partial scores. Any resolved target link forces full confidence.
pub fn fuse(bio_score: u32, search_score: u32, resolved: &[String]) -> u8 {
    if !resolved.is_empty() {
        return MAX_CONFIDENCE;
    }
    let total = bio_score.saturating_add(search_score.min(SEARCH_SCORE_CAP));
    total.min(u32::from(MAX_CONFIDENCE)) as u8
}

/// Map a confidence value to a status; the first matching rule wins.
pub fn classify(confidence: u8, has_resolved_links: bool) -> Status {
    if has_resolved_links {
        Status::Confirmed
    } else if confidence >= 70 {
        Status::HighlyLikely
    } else if confidence >= 40 {
        Status::Possibly
    } else if confidence >= 15 {
        Status::LowConfidence
    } else {
        Status::NotFound
    }
}

/// Runs checks against a set of collaborators.
pub struct Checker {
    profiles: Arc<dyn ProfileSource>,
    resolver: LinkResolver,
    collector: SearchSignalCollector,
}

impl Checker {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        resolver: LinkResolver,
        collector: SearchSignalCollector,
    ) -> Self {
        Self {
            profiles,
            resolver,
            collector,
        }
    }

    /// Build a checker backed by real HTTP collaborators.
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = fetch::http::build_client(&config.http)?;

        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(client.clone()));
        let profiles: Arc<dyn ProfileSource> =
            Arc::new(HttpProfileSource::new(client.clone(), &config.platform));
        let searcher: Arc<dyn KeywordSearcher> =
            Arc::new(HttpSearcher::new(client, &config.search)?);

        let resolver = LinkResolver::new(fetcher, LinkClassifier::from_platform(&config.platform))
            .with_max_depth(config.resolver.max_depth)
            .with_delay(config.resolver.delay());

        let collector = SearchSignalCollector::new(searcher, &config.platform.search_keyword)
            .with_query_templates(&config.search.query_templates)
            .with_max_variations(config.search.max_variations)
            .with_delay(config.search.delay());

        Ok(Self::new(profiles, resolver, collector))
    }

    /// Check one handle. Never fails: every collaborator error degrades to
    /// an empty signal for its stage.
    pub async fn check(&self, handle: &str) -> AggregationResult {
        info!("Checking @{}", handle);

        let profile = profile_or_minimal(self.profiles.as_ref(), handle).await;
        info!(
            "Profile: {:?}, {} bio link(s)",
            profile.display_name,
            profile.bio_links.len()
        );

        let (bio_score, bio_indicators) = indicators::score(&profile.biography);
        info!("Bio score {} ({} indicator(s))", bio_score, bio_indicators.len());

        let resolved = self.resolver.resolve(&profile.bio_links).await;

        let names = profile.name_variations();
        let search = self.collector.collect(&names).await;

        let confidence = fuse(bio_score, search.score, &resolved);
        let status = classify(confidence, !resolved.is_empty());
        info!("@{}: confidence {} → {}", handle, confidence, status);

        AggregationResult {
            profile: ProfileSummary::from(&profile),
            confidence_score: confidence,
            status,
            resolved_target_links: resolved,
            evidence: Evidence {
                bio_indicators,
                search_findings: search.descriptions(),
                links_checked: profile.bio_links.len(),
            },
            checked_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::{FakeProfiles, FakeSearch, FakeWeb};
    use crate::models::Profile;
    use std::time::Duration;

    fn checker(profile: Option<Profile>, web: FakeWeb, search: FakeSearch) -> Checker {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(web);
        let searcher: Arc<dyn KeywordSearcher> = Arc::new(search);
        Checker::new(
            Arc::new(FakeProfiles(profile)),
            LinkResolver::new(fetcher, LinkClassifier::default()).with_delay(Duration::ZERO),
            SearchSignalCollector::new(searcher, "onlyfans").with_delay(Duration::ZERO),
        )
    }

    #[test]
    fn test_fuse_search_cap() {
        assert_eq!(fuse(10, 60, &[]), 50);
        assert_eq!(fuse(10, 30, &[]), 40);
    }

    #[test]
    fn test_fuse_clamps_to_100() {
        assert_eq!(fuse(95, 40, &[]), 100);
        assert_eq!(fuse(u32::MAX, u32::MAX, &[]), 100);
        assert_eq!(fuse(0, 0, &[]), 0);
    }

    #[test]
    fn test_fuse_bounds() {
        for bio in (0..300).step_by(7) {
            for search in (0..200).step_by(11) {
                assert!(fuse(bio, search, &[]) <= 100);
            }
        }
    }

    #[test]
    fn test_resolved_links_override() {
        let resolved = vec!["https://onlyfans.com/x".to_string()];
        assert_eq!(fuse(0, 0, &resolved), 100);
        assert_eq!(classify(fuse(0, 0, &resolved), true), Status::Confirmed);
        assert_eq!(classify(0, true), Status::Confirmed);
    }

    #[test]
    fn test_classify_thresholds() {
        assert_eq!(classify(100, false), Status::HighlyLikely);
        assert_eq!(classify(70, false), Status::HighlyLikely);
        assert_eq!(classify(69, false), Status::Possibly);
        assert_eq!(classify(40, false), Status::Possibly);
        assert_eq!(classify(39, false), Status::LowConfidence);
        assert_eq!(classify(15, false), Status::LowConfidence);
        assert_eq!(classify(14, false), Status::NotFound);
        assert_eq!(classify(0, false), Status::NotFound);
    }

    #[test]
    fn test_bio_and_search_scenario() {
        let confidence = fuse(10, 60, &[]);
        assert_eq!(confidence, 50);
        assert_eq!(classify(confidence, false), Status::Possibly);
    }

    #[tokio::test]
    async fn test_check_confirmed_via_aggregator() {
        let profile = Profile {
            handle: "jane".to_string(),
            display_name: "Jane".to_string(),
            biography: "coffee".to_string(),
            avatar_url: String::new(),
            bio_links: vec!["https://linktr.ee/jane".to_string()],
        };
        let web = FakeWeb::new().links("https://linktr.ee/jane", &["https://onlyfans.com/jane"]);
        let search = FakeSearch::new().count("\"jane\" onlyfans", 0);

        let result = checker(Some(profile), web, search).check("jane").await;

        assert_eq!(result.status, Status::Confirmed);
        assert_eq!(result.confidence_score, 100);
        assert_eq!(result.resolved_target_links, vec!["https://onlyfans.com/jane"]);
        assert_eq!(result.evidence.links_checked, 1);
        assert!(result.evidence.bio_indicators.is_empty());
    }

    #[tokio::test]
    async fn test_check_fuses_bio_and_search() {
        let profile = Profile {
            handle: "mia".to_string(),
            display_name: "Mia Rose".to_string(),
            biography: "VIP 🔥".to_string(),
            avatar_url: "https://cdn.example/mia.jpg".to_string(),
            bio_links: vec![],
        };
        let search = FakeSearch::new()
            .count("\"mia\" onlyfans", 30)
            .count("\"Mia Rose\" onlyfans", 30)
            .count("\"Mia\" onlyfans", 30)
            .count("\"Rose\" onlyfans", 30);

        let search = Arc::new(search);
        let searcher: Arc<dyn KeywordSearcher> = search.clone();
        let checker = Checker::new(
            Arc::new(FakeProfiles(Some(profile))),
            LinkResolver::new(Arc::new(FakeWeb::new()), LinkClassifier::default())
                .with_delay(Duration::ZERO),
            SearchSignalCollector::new(searcher, "onlyfans").with_delay(Duration::ZERO),
        );

        let result = checker.check("mia").await;

        // bio: emoji 10 + vip 15; search: 75 capped at 40
        assert_eq!(result.confidence_score, 65);
        assert_eq!(result.status, Status::Possibly);
        assert_eq!(
            result.evidence.bio_indicators,
            vec!["1 suggestive emoji(s)", "Premium indicators: vip"]
        );
        assert_eq!(result.evidence.search_findings.len(), 3);
        assert_eq!(search.issued().len(), 3);
        assert_eq!(result.profile.avatar_url, "https://cdn.example/mia.jpg");
    }

    #[tokio::test]
    async fn test_check_degrades_when_everything_fails() {
        let result = checker(None, FakeWeb::new(), FakeSearch::new())
            .check("ghost")
            .await;

        assert_eq!(result.profile.handle, "ghost");
        assert_eq!(result.confidence_score, 0);
        assert_eq!(result.status, Status::NotFound);
        assert!(result.resolved_target_links.is_empty());
        assert_eq!(result.evidence, Evidence::default());
    }

    #[test]
    fn test_from_config() {
        assert!(Checker::from_config(&Config::default()).is_ok());

        let mut config = Config::default();
        config.search.match_patterns = vec!["[".to_string()];
        assert!(Checker::from_config(&config).is_err());
    }
}
