//! Gherkin `.feature` file parsing.
//!
//! Extracts the feature title, `@tag` annotations, the free-text
//! description between the `Feature:` line and the first scenario, and
//! one [`ScenarioBlock`](crate::ScenarioBlock) per `Scenario:` /
//! `Scenario Outline:` heading.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use graphloom_shared::{GraphloomError, Result};

use crate::{ParsedContent, ScenarioBlock, SourceFormat, content_hash};

/// Matches `Feature: Title`.
static FEATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Feature:\s*(.+)$").expect("feature regex"));

/// Matches `Scenario: Name` or `Scenario Outline: Name`.
static SCENARIO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Scenario(?: Outline)?:\s*(.+)$").expect("scenario regex"));

/// Matches a line of `@tag` annotations.
static TAG_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@[A-Za-z0-9_@\s-]+$").expect("tag line regex"));

/// Parse a feature file into [`ParsedContent`].
pub(crate) fn parse_feature(source_path: &str, content: &str) -> Result<ParsedContent> {
    let hash = content_hash(content);

    let mut title: Option<String> = None;
    let mut tags: Vec<String> = Vec::new();
    let mut scenarios: Vec<ScenarioBlock> = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in content.lines() {
        if TAG_LINE_RE.is_match(line) {
            for tag in line.split_whitespace() {
                if let Some(name) = tag.strip_prefix('@') {
                    if !name.is_empty() {
                        tags.push(name.to_string());
                    }
                }
            }
            continue;
        }

        if let Some(caps) = FEATURE_RE.captures(line) {
            if title.is_none() {
                title = Some(caps[1].trim().to_string());
            }
            continue;
        }

        if let Some(caps) = SCENARIO_RE.captures(line) {
            if let Some((name, body)) = current.take() {
                scenarios.push(ScenarioBlock {
                    name,
                    body: body.join("\n"),
                });
            }
            current = Some((caps[1].trim().to_string(), Vec::new()));
            continue;
        }

        if let Some((_, ref mut body)) = current {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                body.push(trimmed.to_string());
            }
        }
    }

    if let Some((name, body)) = current.take() {
        scenarios.push(ScenarioBlock {
            name,
            body: body.join("\n"),
        });
    }

    let title = title.ok_or_else(|| {
        GraphloomError::parse(format!("{source_path}: missing Feature: declaration"))
    })?;

    Ok(ParsedContent {
        source_path: source_path.to_string(),
        format: SourceFormat::Feature,
        title,
        frontmatter: BTreeMap::new(),
        tags,
        raw_content: content.to_string(),
        content_hash: hash,
        scenarios,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
@governance @trust
Feature: Community voting

  As a community member I want transparent votes.

  Scenario: Cast a vote
    Given an open proposal
    When I cast my vote
    Then the tally updates

  Scenario Outline: Delegate a vote
    Given a trusted delegate <name>
    When I delegate my vote
    Then <name> votes on my behalf
";

    #[test]
    fn parses_title_tags_and_scenarios() {
        let parsed = parse_feature("gov/voting.feature", SAMPLE).unwrap();

        assert_eq!(parsed.title, "Community voting");
        assert_eq!(parsed.tags, vec!["governance", "trust"]);
        assert_eq!(parsed.scenarios.len(), 2);
        assert_eq!(parsed.scenarios[0].name, "Cast a vote");
        assert!(parsed.scenarios[0].body.contains("Given an open proposal"));
        assert_eq!(parsed.scenarios[1].name, "Delegate a vote");
    }

    #[test]
    fn missing_feature_line_fails() {
        let result = parse_feature("bad.feature", "Scenario: Orphan\n  Given nothing\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Feature:"));
    }

    #[test]
    fn feature_without_scenarios() {
        let parsed = parse_feature("empty.feature", "Feature: Placeholder\n").unwrap();
        assert!(parsed.scenarios.is_empty());
        assert_eq!(parsed.title, "Placeholder");
    }

    #[test]
    fn scenario_bodies_do_not_bleed() {
        let parsed = parse_feature("gov/voting.feature", SAMPLE).unwrap();
        assert!(!parsed.scenarios[0].body.contains("delegate"));
        assert!(!parsed.scenarios[1].body.contains("tally"));
    }
}
