//! Markdown parsing with `---`-delimited frontmatter.
//!
//! Frontmatter is a flat block of `key: value` lines between two `---`
//! delimiters at the top of the file. Nested structures are not supported;
//! list-valued keys (`tags`) use comma separation.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use graphloom_shared::Result;

use crate::{ParsedContent, SourceFormat, content_hash, title_from_stem};

/// Matches a `key: value` frontmatter line.
static FRONTMATTER_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_-]*):\s*(.*)$").expect("frontmatter regex"));

/// Matches `# Title` at the start of a line.
static H1_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#\s+(.+)$").expect("H1 regex"));

/// Parse a Markdown document into [`ParsedContent`].
pub(crate) fn parse_markdown(source_path: &str, content: &str) -> Result<ParsedContent> {
    let hash = content_hash(content);
    let (frontmatter, body) = split_frontmatter(content);

    let title = frontmatter
        .get("title")
        .cloned()
        .or_else(|| first_heading(body))
        .unwrap_or_else(|| title_from_stem(source_path));

    let tags = frontmatter
        .get("tags")
        .map(|raw| split_list(raw))
        .unwrap_or_default();

    Ok(ParsedContent {
        source_path: source_path.to_string(),
        format: SourceFormat::Markdown,
        title,
        frontmatter,
        tags,
        raw_content: body.to_string(),
        content_hash: hash,
        scenarios: Vec::new(),
    })
}

/// Split a document into its frontmatter map and remaining body.
///
/// Returns an empty map when no well-formed frontmatter block is present;
/// a malformed block (missing closing `---`) is treated as body text.
fn split_frontmatter(content: &str) -> (BTreeMap<String, String>, &str) {
    let mut frontmatter = BTreeMap::new();

    let Some(rest) = content.strip_prefix("---") else {
        return (frontmatter, content);
    };
    let Some(rest) = rest.strip_prefix('\n').or_else(|| rest.strip_prefix("\r\n")) else {
        return (frontmatter, content);
    };

    let mut offset = 0usize;
    for line in rest.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\n', '\r']).trim();
        if trimmed == "---" {
            return (frontmatter, &rest[offset + line.len()..]);
        }
        if !trimmed.is_empty() {
            if let Some(caps) = FRONTMATTER_KEY_RE.captures(trimmed) {
                frontmatter.insert(caps[1].to_string(), caps[2].trim().to_string());
            }
        }
        offset += line.len();
    }

    // No closing delimiter: not frontmatter after all.
    frontmatter.clear();
    (frontmatter, content)
}

/// Extract the first `# Heading` from body text.
fn first_heading(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| H1_RE.captures(line.trim()).map(|caps| caps[1].trim().to_string()))
}

/// Split a comma-separated list value, dropping empties.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
