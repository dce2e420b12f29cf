//! Search-engine signal collection.
//!
//! Each name variation is queried once per configured query shape. A name's
//! queries add up to a capped contribution to the search score.

use crate::fetch::{search_or_zero, KeywordSearcher};
use crate::models::{FindingSource, IndicatorFinding};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default number of name variations queried.
pub const DEFAULT_MAX_VARIATIONS: usize = 3;

/// Points per match before capping.
pub const POINTS_PER_MATCH: u32 = 2;

/// Maximum contribution of a single variation.
pub const PER_VARIATION_CAP: u32 = 25;

/// Default pause between queries.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

/// Default query shape.
pub const DEFAULT_QUERY_TEMPLATE: &str = "\"{name}\" {keyword}";

/// Matched patterns quoted in a finding description.
pub const MAX_QUOTED_PATTERNS: usize = 3;

/// Summed search score and the findings behind it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSignal {
    /// Sum of per-variation contributions. Not capped here.
    pub score: u32,
    pub findings: Vec<IndicatorFinding>,
}

impl SearchSignal {
    pub fn descriptions(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.description.clone()).collect()
    }
}

/// `site:reddit.com "{name}"` → `SiteSearch("reddit.com")`; otherwise `Search`.
pub fn finding_source(query_template: &str) -> FindingSource {
    query_template
        .split_whitespace()
        .find_map(|token| token.strip_prefix("site:"))
        .filter(|domain| !domain.is_empty())
        .map(|domain| FindingSource::SiteSearch(domain.to_string()))
        .unwrap_or(FindingSource::Search)
}

/// Points for one query with `matches` occurrences.
pub fn variation_points(matches: usize) -> u32 {
    let raw = u32::try_from(matches)
        .unwrap_or(u32::MAX)
        .saturating_mul(POINTS_PER_MATCH);
    raw.min(PER_VARIATION_CAP)
}

/// `"jane: 4 mentions"`, with up to three matched patterns in parentheses.
fn describe(name: &str, matches: usize, patterns: &[String]) -> String {
    if patterns.is_empty() {
        return format!("{}: {} mentions", name, matches);
    }
    let quoted: Vec<&str> = patterns
        .iter()
        .take(MAX_QUOTED_PATTERNS)
        .map(String::as_str)
        .collect();
    format!("{}: {} mentions ({})", name, matches, quoted.join(", "))
}

#[derive(Debug, Clone)]
struct QueryShape {
    template: String,
    source: FindingSource,
}

impl QueryShape {
    fn new(template: &str) -> Self {
        Self {
            template: template.to_string(),
            source: finding_source(template),
        }
    }
}

pub struct SearchSignalCollector {
    searcher: Arc<dyn KeywordSearcher>,
    keyword: String,
    shapes: Vec<QueryShape>,
    max_variations: usize,
    delay: Duration,
}

impl SearchSignalCollector {
    pub fn new(searcher: Arc<dyn KeywordSearcher>, keyword: &str) -> Self {
        Self {
            searcher,
            keyword: keyword.to_string(),
            shapes: vec![QueryShape::new(DEFAULT_QUERY_TEMPLATE)],
            max_variations: DEFAULT_MAX_VARIATIONS,
            delay: DEFAULT_DELAY,
        }
    }

    /// Replace the query shapes. An empty list keeps the default shape.
    pub fn with_query_templates(mut self, templates: &[String]) -> Self {
        if !templates.is_empty() {
            self.shapes = templates.iter().map(|t| QueryShape::new(t)).collect();
        }
        self
    }

    pub fn with_max_variations(mut self, max_variations: usize) -> Self {
        self.max_variations = max_variations;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn fill(&self, template: &str, name: &str) -> String {
        template
            .replace("{name}", name)
            .replace("{keyword}", &self.keyword)
    }

    /// Query texts for one name, one per shape.
    pub fn queries_for(&self, name: &str) -> Vec<String> {
        self.shapes
            .iter()
            .map(|shape| self.fill(&shape.template, name))
            .collect()
    }

    /// Query the first `max_variations` names in order and sum their points.
    pub async fn collect(&self, names: &[String]) -> SearchSignal {
        let mut signal = SearchSignal::default();
        let mut issued = 0usize;

        for name in names.iter().take(self.max_variations) {
            let mut name_points: u32 = 0;

            for shape in &self.shapes {
                if issued > 0 && !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                issued += 1;

                let query = self.fill(&shape.template, name);
                let hits = search_or_zero(self.searcher.as_ref(), &query).await;
                let points = variation_points(hits.count);
                debug!("Query {:?}: {} matches, {} points", query, hits.count, points);

                name_points = name_points.saturating_add(points);
                if hits.count > 0 {
                    signal.findings.push(
                        IndicatorFinding::new(
                            shape.source.clone(),
                            describe(name, hits.count, &hits.matched),
                            points,
                        )
                        .with_patterns(hits.matched),
                    );
                }
            }

            signal.score = signal
                .score
                .saturating_add(name_points.min(PER_VARIATION_CAP));
        }

        info!(
            "Search signal: score {} from {} finding(s) over {} queries",
            signal.score,
            signal.findings.len(),
            issued
        );
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::testing::FakeSearch;
    use std::time::Instant;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn templates(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn collector(search: &Arc<FakeSearch>) -> SearchSignalCollector {
        let searcher: Arc<dyn KeywordSearcher> = search.clone();
        SearchSignalCollector::new(searcher, "onlyfans").with_delay(Duration::ZERO)
    }

    #[test]
    fn test_variation_points_cap() {
        assert_eq!(variation_points(0), 0);
        assert_eq!(variation_points(3), 6);
        assert_eq!(variation_points(12), 24);
        assert_eq!(variation_points(13), 25);
        assert_eq!(variation_points(usize::MAX), 25);
    }

    #[test]
    fn test_query_shape() {
        let search = Arc::new(FakeSearch::new());
        assert_eq!(
            collector(&search).queries_for("Jane Doe"),
            vec!["\"Jane Doe\" onlyfans"]
        );

        let custom = collector(&search).with_query_templates(&templates(&[
            "\"{name}\" {keyword}",
            "site:reddit.com \"{name}\" OF",
        ]));
        assert_eq!(
            custom.queries_for("jane"),
            vec!["\"jane\" onlyfans", "site:reddit.com \"jane\" OF"]
        );

        let unchanged = collector(&search).with_query_templates(&[]);
        assert_eq!(unchanged.queries_for("jane"), vec!["\"jane\" onlyfans"]);
    }

    #[test]
    fn test_describe() {
        assert_eq!(describe("jane", 4, &[]), "jane: 4 mentions");
        let patterns = templates(&["a", "b", "c", "d"]);
        assert_eq!(describe("jane", 9, &patterns), "jane: 9 mentions (a, b, c)");
    }

    #[tokio::test]
    async fn test_collect_sums_and_reports() {
        let search = Arc::new(
            FakeSearch::new()
                .count("\"jane\" onlyfans", 4)
                .count("\"Jane Doe\" onlyfans", 0)
                .count("\"Jane\" onlyfans", 20),
        );
        let signal = collector(&search)
            .collect(&names(&["jane", "Jane Doe", "Jane"]))
            .await;

        assert_eq!(signal.score, 8 + 0 + 25);
        assert_eq!(
            signal.descriptions(),
            vec!["jane: 4 mentions", "Jane: 20 mentions"]
        );
        assert!(signal
            .findings
            .iter()
            .all(|f| f.source == FindingSource::Search));
    }

    #[tokio::test]
    async fn test_matched_patterns_are_kept() {
        let search = Arc::new(FakeSearch::new().hits(
            "\"jane\" onlyfans",
            3,
            &[r"onlyfans\.com/\w+", r"only\s*fans"],
        ));
        let signal = collector(&search).collect(&names(&["jane"])).await;

        assert_eq!(
            signal.descriptions(),
            vec![r"jane: 3 mentions (onlyfans\.com/\w+, only\s*fans)"]
        );
        assert_eq!(
            signal.findings[0].matched_patterns,
            vec![r"onlyfans\.com/\w+", r"only\s*fans"]
        );
    }

    #[test]
    fn test_finding_source() {
        assert_eq!(finding_source(DEFAULT_QUERY_TEMPLATE), FindingSource::Search);
        assert_eq!(
            finding_source("site:reddit.com \"{name}\" OF"),
            FindingSource::SiteSearch("reddit.com".to_string())
        );
        assert_eq!(finding_source("site: {name}"), FindingSource::Search);
    }

    #[tokio::test]
    async fn test_every_shape_is_queried_per_name() {
        let search = Arc::new(
            FakeSearch::new()
                .count("\"jane\" onlyfans", 1)
                .count("site:twitter.com \"jane\" onlyfans.com", 2)
                .count("site:reddit.com \"jane\" OF", 0)
                .count("\"Jane\" onlyfans", 0)
                .count("site:twitter.com \"Jane\" onlyfans.com", 0)
                .count("site:reddit.com \"Jane\" OF", 3),
        );
        let signal = collector(&search)
            .with_query_templates(&templates(&[
                "\"{name}\" {keyword}",
                "site:twitter.com \"{name}\" onlyfans.com",
                "site:reddit.com \"{name}\" OF",
            ]))
            .collect(&names(&["jane", "Jane"]))
            .await;

        assert_eq!(search.issued().len(), 6);
        assert_eq!(signal.score, (2 + 4) + 6);
        let sources: Vec<FindingSource> =
            signal.findings.iter().map(|f| f.source.clone()).collect();
        assert_eq!(
            sources,
            vec![
                FindingSource::Search,
                FindingSource::SiteSearch("twitter.com".to_string()),
                FindingSource::SiteSearch("reddit.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_variation_cap_spans_all_shapes() {
        let search = Arc::new(
            FakeSearch::new()
                .count("\"jane\" onlyfans", 10)
                .count("site:reddit.com \"jane\" OF", 10),
        );
        let signal = collector(&search)
            .with_query_templates(&templates(&[
                "\"{name}\" {keyword}",
                "site:reddit.com \"{name}\" OF",
            ]))
            .collect(&names(&["jane"]))
            .await;

        assert_eq!(signal.score, PER_VARIATION_CAP);
        assert_eq!(signal.findings.len(), 2);
    }

    #[tokio::test]
    async fn test_at_most_max_variations() {
        let search = Arc::new(FakeSearch::new());
        collector(&search)
            .with_max_variations(2)
            .collect(&names(&["a", "b", "c", "d"]))
            .await;
        assert_eq!(search.issued(), vec!["\"a\" onlyfans", "\"b\" onlyfans"]);
    }

    #[tokio::test]
    async fn test_failed_query_contributes_zero() {
        let search = Arc::new(FakeSearch::new().count("\"b\" onlyfans", 5));
        let signal = collector(&search).collect(&names(&["a", "b"])).await;

        assert_eq!(signal.score, 10);
        assert_eq!(signal.descriptions(), vec!["b: 5 mentions"]);
        assert_eq!(search.issued().len(), 2);
    }

    #[tokio::test]
    async fn test_score_is_not_capped_in_total() {
        let search = Arc::new(
            FakeSearch::new()
                .count("\"a\" onlyfans", 50)
                .count("\"b\" onlyfans", 50)
                .count("\"c\" onlyfans", 50),
        );
        let signal = collector(&search).collect(&names(&["a", "b", "c"])).await;
        assert_eq!(signal.score, 75);
    }

    #[tokio::test]
    async fn test_no_names() {
        let search = Arc::new(FakeSearch::new());
        let signal = collector(&search).collect(&[]).await;
        assert_eq!(signal, SearchSignal::default());
        assert!(search.issued().is_empty());
    }

    #[tokio::test]
    async fn test_delay_between_queries() {
        let search = Arc::new(FakeSearch::new());
        let delayed = collector(&search).with_delay(Duration::from_millis(20));

        let start = Instant::now();
        delayed.collect(&names(&["a", "b", "c"])).await;
        assert_eq!(search.issued().len(), 3);
        assert!(start.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn test_no_delay_after_last_query() {
        let search = Arc::new(FakeSearch::new());
        let delayed = collector(&search).with_delay(Duration::from_secs(5));

        let start = Instant::now();
        delayed.collect(&names(&["only"])).await;
        assert_eq!(search.issued().len(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
