//! Lexical and emoji signals in free text.
//!
//! Every rule contributes independently, so scores are additive. The
//! total is not clamped here; the aggregator clamps the fused score.

use crate::models::{FindingSource, IndicatorFinding};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Points per suggestive emoji occurrence.
pub const EMOJI_WEIGHT: u32 = 10;

/// Points per distinct premium word.
pub const PREMIUM_WORD_WEIGHT: u32 = 15;

/// Points per distinct suggestive word.
pub const SUGGESTIVE_WORD_WEIGHT: u32 = 10;

/// A phrase rule: fires at most once per text regardless of match count.
#[derive(Debug, Clone, Copy)]
pub struct IndicatorRule {
    pub pattern: &'static str,
    pub weight: u32,
    pub description: &'static str,
}

pub const PHRASE_RULES: &[IndicatorRule] = &[
    IndicatorRule {
        pattern: r"exclusive.*?(content|access|link|subscribe|see)",
        weight: 25,
        description: "Exclusive content language",
    },
    IndicatorRule {
        pattern: r"link.*?bio",
        weight: 20,
        description: "Link in bio reference",
    },
    IndicatorRule {
        pattern: r"subscribe.*?(exclusive|content|more|see|unlock|access|premium)",
        weight: 25,
        description: "Subscription call to action",
    },
    IndicatorRule {
        pattern: r"18\+|21\+|adults?\s+only|nsfw",
        weight: 20,
        description: "Age restriction marker",
    },
    IndicatorRule {
        pattern: r"what\s+you.*?(here\s+for|looking\s+for)",
        weight: 30,
        description: "Direct invitation phrasing",
    },
    IndicatorRule {
        pattern: r"(see|find\s+out)\s+(more|what)",
        weight: 15,
        description: "Teaser phrasing",
    },
];

pub const SUGGESTIVE_EMOJI: &[&str] = &[
    "🔥", "💦", "🍑", "🍆", "😈", "👅", "💋", "🔞", "😏", "🥵", "🍒", "💕",
];

pub const PREMIUM_WORDS: &[&str] = &["premium", "vip", "private", "special", "unlock", "paid"];

pub const SUGGESTIVE_WORDS: &[&str] = &[
    "spicy",
    "naughty",
    "wild",
    "uncensored",
    "unfiltered",
    "raw",
    "explicit",
];

static COMPILED_RULES: LazyLock<Vec<(Regex, IndicatorRule)>> = LazyLock::new(|| {
    PHRASE_RULES
        .iter()
        .map(|rule| {
            let regex = Regex::new(&format!("(?i){}", rule.pattern))
                .expect("phrase rule patterns are valid");
            (regex, *rule)
        })
        .collect()
});

/// Result of scoring one piece of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndicatorScore {
    pub points: u32,
    pub findings: Vec<IndicatorFinding>,
}

impl IndicatorScore {
    fn add(&mut self, description: String, weight: u32) {
        self.points = self.points.saturating_add(weight);
        self.findings
            .push(IndicatorFinding::new(FindingSource::General, description, weight));
    }

    /// Human-readable descriptions in rule order.
    pub fn descriptions(&self) -> Vec<String> {
        self.findings.iter().map(|f| f.description.clone()).collect()
    }
}

/// Score `text`, returning the total points and one description per signal.
pub fn score(text: &str) -> (u32, Vec<String>) {
    let result = score_text(text);
    let descriptions = result.descriptions();
    (result.points, descriptions)
}

/// Score `text`, keeping the weight of each finding.
pub fn score_text(text: &str) -> IndicatorScore {
    let mut result = IndicatorScore::default();
    if text.is_empty() {
        return result;
    }

    let emoji_count: usize = SUGGESTIVE_EMOJI
        .iter()
        .map(|emoji| text.matches(emoji).count())
        .sum();
    if emoji_count > 0 {
        result.add(
            format!("{} suggestive emoji(s)", emoji_count),
            weighted(emoji_count, EMOJI_WEIGHT),
        );
    }

    for (regex, rule) in COMPILED_RULES.iter() {
        if regex.is_match(text) {
            result.add(rule.description.to_string(), rule.weight);
        }
    }

    let lowered = text.to_lowercase();
    let words: HashSet<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    let premium = present_words(&words, PREMIUM_WORDS);
    if !premium.is_empty() {
        result.add(
            format!("Premium indicators: {}", premium.join(", ")),
            weighted(premium.len(), PREMIUM_WORD_WEIGHT),
        );
    }

    let suggestive = present_words(&words, SUGGESTIVE_WORDS);
    if !suggestive.is_empty() {
        result.add(
            format!("Suggestive language: {}", suggestive.join(", ")),
            weighted(suggestive.len(), SUGGESTIVE_WORD_WEIGHT),
        );
    }

    result
}

fn weighted(count: usize, weight: u32) -> u32 {
    u32::try_from(count)
        .unwrap_or(u32::MAX)
        .saturating_mul(weight)
}

fn present_words(words: &HashSet<&str>, table: &[&'static str]) -> Vec<&'static str> {
    table
        .iter()
        .copied()
        .filter(|w| words.contains(w))
        .collect()
}
