//! Document parsing for Graphloom.
//!
//! Converts raw source text into [`ParsedContent`], the structured
//! intermediate form consumed by the transformer. Two formats are
//! supported:
//! - Markdown with optional `---`-delimited frontmatter
//! - Gherkin `.feature` files (feature title, tags, scenario blocks)
//!
//! Parsing is deterministic: identical bytes always produce an identical
//! result, including the content hash.

mod feature;
mod markdown;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use graphloom_shared::{GraphloomError, Result};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Source document format, detected from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Markdown,
    Feature,
}

/// A named scenario block extracted from a feature file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBlock {
    /// Scenario name (text after `Scenario:`).
    pub name: String,
    /// Step lines belonging to the scenario, joined verbatim.
    pub body: String,
}

/// Structured intermediate form of a parsed source document.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedContent {
    /// Path of the source file, relative to the scan root.
    pub source_path: String,
    /// Detected format.
    pub format: SourceFormat,
    /// Document title (frontmatter `title`, first heading, or file stem).
    pub title: String,
    /// Frontmatter key/value pairs (empty for feature files).
    pub frontmatter: BTreeMap<String, String>,
    /// Tags declared in frontmatter or as `@tag` lines.
    pub tags: Vec<String>,
    /// Body text with frontmatter stripped.
    pub raw_content: String,
    /// SHA-256 hex digest of the full original text.
    pub content_hash: String,
    /// Scenario blocks (feature files only).
    pub scenarios: Vec<ScenarioBlock>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Parse a source document, dispatching on the file extension.
pub fn parse(source_path: &str, content: &str) -> Result<ParsedContent> {
    let extension = Path::new(source_path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension {
        "md" | "markdown" => markdown::parse_markdown(source_path, content),
        "feature" => feature::parse_feature(source_path, content),
        other => Err(GraphloomError::parse(format!(
            "unsupported source format '.{other}' at {source_path}"
        ))),
    }
}

/// SHA-256 hex digest of a text's bytes. Pure function of the bytes only.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Derive a display title from a file path stem (`intro-to-trust` → `Intro To Trust`).
pub(crate) fn title_from_stem(source_path: &str) -> String {
    let stem = Path::new(source_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");

    stem.split(['-', '_'])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_by_extension() {
        let md = parse("docs/intro.md", "# Intro\n\nBody.").unwrap();
        assert_eq!(md.format, SourceFormat::Markdown);

        let feat = parse("docs/login.feature", "Feature: Login\n").unwrap();
        assert_eq!(feat.format, SourceFormat::Feature);

        assert!(parse("docs/data.json", "{}").is_err());
    }

    #[test]
    fn content_hash_depends_only_on_bytes() {
        let a = parse("a/one.md", "# Same\n\nText.").unwrap();
        let b = parse("b/two.md", "# Same\n\nText.").unwrap();
        assert_eq!(a.content_hash, b.content_hash);

        let c = parse("a/one.md", "# Same\n\nText!").unwrap();
        assert_ne!(a.content_hash, c.content_hash);
    }

    #[test]
    fn title_from_stem_formats_words() {
        assert_eq!(title_from_stem("docs/intro-to-trust.md"), "Intro To Trust");
        assert_eq!(title_from_stem("user_guide.md"), "User Guide");
    }
}
