//! Markdown and JSON rendering of check results.

use crate::models::{AggregationResult, Evidence, ProfileSummary};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(result: &AggregationResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("# SubScout Report: @{}\n\n", result.profile.handle));
    output.push_str(&generate_verdict_section(result));
    output.push_str(&generate_profile_section(&result.profile));
    output.push_str(&generate_links_section(&result.resolved_target_links));
    output.push_str(&generate_evidence_section(&result.evidence));
    output.push_str(&generate_footer(result));

    output
}

fn generate_verdict_section(result: &AggregationResult) -> String {
    let mut section = String::new();

    section.push_str("## Verdict\n\n");
    section.push_str(&format!(
        "| Status | Confidence |\n|:---:|:---:|\n| {} {} | **{}/100** |\n\n",
        result.status.emoji(),
        result.status,
        result.confidence_score
    ));

    section
}

fn generate_profile_section(profile: &ProfileSummary) -> String {
    let mut section = String::new();

    section.push_str("## Profile\n\n");
    section.push_str(&format!("- **Handle:** @{}\n", profile.handle));
    if !profile.display_name.is_empty() {
        section.push_str(&format!("- **Name:** {}\n", profile.display_name));
    }
    if !profile.avatar_url.is_empty() {
        section.push_str(&format!("- **Avatar:** {}\n", profile.avatar_url));
    }
    if !profile.biography.is_empty() {
        section.push_str("\n> ");
        section.push_str(&profile.biography.replace('\n', "\n> "));
        section.push('\n');
    }
    section.push('\n');

    section
}

fn generate_links_section(links: &[String]) -> String {
    if links.is_empty() {
        return String::new();
    }

    let mut section = String::new();
    section.push_str("## Resolved Target Links\n\n");
    for link in links {
        section.push_str(&format!("- {}\n", link));
    }
    section.push('\n');

    section
}

fn generate_evidence_section(evidence: &Evidence) -> String {
    let mut section = String::new();

    section.push_str("## Evidence\n\n");
    section.push_str(&format!("- **Bio links checked:** {}\n\n", evidence.links_checked));

    section.push_str("### Bio Indicators\n\n");
    push_list(&mut section, &evidence.bio_indicators);

    section.push_str("### Search Findings\n\n");
    push_list(&mut section, &evidence.search_findings);

    section
}

fn push_list(section: &mut String, items: &[String]) {
    if items.is_empty() {
        section.push_str("_None_\n\n");
        return;
    }
    for item in items {
        section.push_str(&format!("- {}\n", item));
    }
    section.push('\n');
}

fn generate_footer(result: &AggregationResult) -> String {
    format!(
        "---\n\n*Checked {} by SubScout. Scores are heuristic estimates from public signals.*\n",
        result.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
}

/// Generate a JSON report.
pub fn generate_json_report(result: &AggregationResult) -> Result<String> {
    serde_json::to_string_pretty(result).map_err(Into::into)
}
