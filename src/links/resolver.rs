//! Bounded traversal from bio links to target-platform URLs.
//!
//! The traversal is depth-first over an explicit worklist. A page's links are
//! only followed when that page is a known aggregator, so arbitrary sites are
//! never crawled. Target-platform URLs are terminal: they are recorded, never
//! fetched for further links.

use super::classifier::LinkClassifier;
use crate::fetch::html::extract_links;
use crate::fetch::{fetch_or_empty, PageFetcher};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Default maximum depth below the seed links.
pub const DEFAULT_MAX_DEPTH: usize = 2;

/// Default pause after each fetched page.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(300);

/// Outcome of one resolve call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    /// Target-platform URLs in discovery order. May contain duplicates.
    pub targets: Vec<String>,
    /// Every URL fetched, in visit order. Never contains duplicates.
    pub visited: Vec<String>,
}

enum Step {
    Visit { url: String, depth: usize },
    Record(String),
}

pub struct LinkResolver {
    fetcher: Arc<dyn PageFetcher>,
    classifier: LinkClassifier,
    max_depth: usize,
    delay: Duration,
}

impl LinkResolver {
    pub fn new(fetcher: Arc<dyn PageFetcher>, classifier: LinkClassifier) -> Self {
        Self {
            fetcher,
            classifier,
            max_depth: DEFAULT_MAX_DEPTH,
            delay: DEFAULT_DELAY,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Target-platform URLs reachable from `seeds`.
    pub async fn resolve(&self, seeds: &[String]) -> Vec<String> {
        self.resolve_with_trace(seeds).await.targets
    }

    /// Like [`resolve`](Self::resolve), also reporting the visited URLs.
    pub async fn resolve_with_trace(&self, seeds: &[String]) -> Resolution {
        let mut visited: HashSet<String> = HashSet::new();
        let mut resolution = Resolution::default();

        // Popped from the back, so pushed in reverse to keep page order.
        let mut stack: Vec<Step> = seeds
            .iter()
            .rev()
            .map(|url| Step::Visit {
                url: url.clone(),
                depth: 0,
            })
            .collect();

        while let Some(step) = stack.pop() {
            let (url, depth) = match step {
                Step::Record(url) => {
                    debug!("Resolved target link {}", url);
                    resolution.targets.push(url);
                    continue;
                }
                Step::Visit { url, depth } => (url, depth),
            };

            if depth > self.max_depth || url.is_empty() || visited.contains(&url) {
                continue;
            }
            visited.insert(url.clone());
            resolution.visited.push(url.clone());

            debug!("Visiting {} at depth {}", url, depth);
            let page = fetch_or_empty(self.fetcher.as_ref(), &url).await;

            if self.classifier.is_target(&page.final_url) {
                debug!("{} landed on target {}", url, page.final_url);
                resolution.targets.push(page.final_url);
                continue;
            }

            let descend = depth < self.max_depth
                && (self.classifier.is_aggregator(&url)
                    || self.classifier.is_aggregator(&page.final_url));

            let mut next: Vec<Step> = Vec::new();
            for link in extract_links(&page.body, &page.final_url) {
                if self.classifier.is_target(&link) {
                    next.push(Step::Record(link));
                } else if descend {
                    next.push(Step::Visit {
                        url: link,
                        depth: depth + 1,
                    });
                }
            }
            stack.extend(next.into_iter().rev());

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!(
            "Link resolution: {} seed(s), {} page(s) visited, {} target link(s)",
            seeds.len(),
            resolution.visited.len(),
            resolution.targets.len()
        );
        resolution
    }
}
