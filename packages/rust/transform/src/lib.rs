//! Content-type classification and node transforms.
//!
//! Takes the parser's [`ParsedContent`] intermediate form and produces
//! typed [`ContentNode`]s. Classification is predicate-driven: an explicit
//! `node_type` frontmatter key wins, then structural signals (a `user_type`
//! key marks an archetype, a feature file marks scenarios, an
//! `epic.md`/`manifesto.md` filename marks an epic), and everything else
//! is a resource.
//!
//! Node ids are derived deterministically from the source path, so a
//! re-import of the same file replaces its nodes rather than duplicating
//! them.

use std::collections::BTreeSet;
use std::path::Path;

use graphloom_parser::{ParsedContent, SourceFormat};
use graphloom_shared::{ContentNode, ContentType, NodeMetadata};

// ---------------------------------------------------------------------------
// Classification predicates
// ---------------------------------------------------------------------------

/// Explicit `node_type` frontmatter value, when present and recognized.
fn declared_type(parsed: &ParsedContent) -> Option<ContentType> {
    parsed
        .frontmatter
        .get("node_type")
        .and_then(|v| v.parse().ok())
}

/// Whether the document describes a top-level epic.
pub fn is_epic_content(parsed: &ParsedContent) -> bool {
    if declared_type(parsed) == Some(ContentType::Epic) {
        return true;
    }
    let file_name = Path::new(&parsed.source_path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    matches!(file_name, "epic.md" | "manifesto.md")
}

/// Whether the document describes a user archetype.
pub fn is_archetype_content(parsed: &ParsedContent) -> bool {
    declared_type(parsed) == Some(ContentType::Archetype)
        || parsed.frontmatter.contains_key("user_type")
}

/// Whether the document describes behavioral scenarios.
pub fn is_scenario_content(parsed: &ParsedContent) -> bool {
    declared_type(parsed) == Some(ContentType::Scenario) || parsed.format == SourceFormat::Feature
}

/// Whether the document falls through to the generic resource type.
pub fn is_resource_content(parsed: &ParsedContent) -> bool {
    !is_epic_content(parsed) && !is_archetype_content(parsed) && !is_scenario_content(parsed)
}

/// Whether a provenance "source" node should accompany this document.
pub fn should_create_source_node(parsed: &ParsedContent) -> bool {
    !parsed.raw_content.trim().is_empty()
}

/// Resolve the content type for a parsed document.
pub fn classify(parsed: &ParsedContent) -> ContentType {
    if let Some(declared) = declared_type(parsed) {
        return declared;
    }
    if is_archetype_content(parsed) {
        ContentType::Archetype
    } else if is_scenario_content(parsed) {
        ContentType::Scenario
    } else if is_epic_content(parsed) {
        ContentType::Epic
    } else {
        ContentType::Resource
    }
}

// ---------------------------------------------------------------------------
// Transform context
// ---------------------------------------------------------------------------

/// Per-file inputs threaded into the transforms.
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    /// Id of the provenance source node for this file, when one was emitted.
    pub provenance_id: Option<String>,
    /// Split feature files into one node per scenario block.
    pub split_scenarios: bool,
}

// ---------------------------------------------------------------------------
// Transforms
// ---------------------------------------------------------------------------

/// Transform a parsed document into zero or more content nodes.
pub fn transform(parsed: &ParsedContent, ctx: &TransformContext) -> Vec<ContentNode> {
    let content_type = classify(parsed);
    tracing::debug!(
        path = %parsed.source_path,
        content_type = %content_type,
        "classified document"
    );

    match content_type {
        ContentType::Scenario if ctx.split_scenarios && !parsed.scenarios.is_empty() => {
            scenario_nodes(parsed, ctx)
        }
        other => vec![single_node(parsed, other, ctx)],
    }
}

/// Build the provenance "source" node for a document.
pub fn source_node(parsed: &ParsedContent) -> ContentNode {
    let slug = path_slug(&parsed.source_path);
    ContentNode {
        id: format!("source-{slug}"),
        content_type: ContentType::Source,
        title: parsed.title.clone(),
        description: format!("Source document {}", parsed.source_path),
        content: String::new(),
        tags: BTreeSet::from(["source".to_string()]),
        related_node_ids: Vec::new(),
        metadata: NodeMetadata::default(),
        source_path: Some(parsed.source_path.clone()),
    }
}

/// Build the single node for a non-split document.
fn single_node(parsed: &ParsedContent, content_type: ContentType, ctx: &TransformContext) -> ContentNode {
    ContentNode {
        id: node_id(parsed, content_type),
        content_type,
        title: parsed.title.clone(),
        description: first_paragraph(&parsed.raw_content),
        content: parsed.raw_content.clone(),
        tags: node_tags(parsed, content_type),
        related_node_ids: related_ids(parsed),
        metadata: node_metadata(parsed, ctx),
        source_path: Some(parsed.source_path.clone()),
    }
}

/// Build one scenario node per scenario block of a feature file.
fn scenario_nodes(parsed: &ParsedContent, ctx: &TransformContext) -> Vec<ContentNode> {
    let file_slug = path_slug(&parsed.source_path);
    parsed
        .scenarios
        .iter()
        .map(|scenario| {
            let metadata = node_metadata(parsed, ctx);
            ContentNode {
                id: format!("{file_slug}-{}", slugify(&scenario.name)),
                content_type: ContentType::Scenario,
                title: scenario.name.clone(),
                description: format!("{}: {}", parsed.title, scenario.name),
                content: scenario.body.clone(),
                tags: node_tags(parsed, ContentType::Scenario),
                related_node_ids: related_ids(parsed),
                metadata,
                source_path: Some(parsed.source_path.clone()),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Deterministic node id from the source path (plus type disambiguation).
fn node_id(parsed: &ParsedContent, content_type: ContentType) -> String {
    let slug = path_slug(&parsed.source_path);
    // Avoid "governance-epic-epic" when the path already carries the type.
    if slug.ends_with(content_type.as_str()) {
        slug
    } else {
        format!("{slug}-{}", content_type.as_str())
    }
}

fn node_tags(parsed: &ParsedContent, content_type: ContentType) -> BTreeSet<String> {
    let mut tags: BTreeSet<String> = parsed.tags.iter().map(|t| slugify(t)).collect();
    tags.insert(content_type.as_str().to_string());
    tags
}

fn related_ids(parsed: &ParsedContent) -> Vec<String> {
    parsed
        .frontmatter
        .get("related")
        .map(|raw| {
            raw.split(',')
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

fn node_metadata(parsed: &ParsedContent, ctx: &TransformContext) -> NodeMetadata {
    NodeMetadata {
        epic: epic_group(parsed),
        user_type: parsed.frontmatter.get("user_type").map(|v| slugify(v)),
        derived_from: parsed
            .frontmatter
            .get("derived_from")
            .cloned()
            .or_else(|| ctx.provenance_id.clone()),
        parent_id: ctx.provenance_id.clone(),
        extra: Default::default(),
    }
}

/// Grouping value for the path-based relationship strategy: frontmatter
/// `epic` wins, else the leading path segment of a nested file.
fn epic_group(parsed: &ParsedContent) -> Option<String> {
    if let Some(epic) = parsed.frontmatter.get("epic") {
        let slug = slugify(epic);
        if slug.is_empty() || slug == "none" {
            return None;
        }
        return Some(slug);
    }
    let path = Path::new(&parsed.source_path);
    let mut components = path.components();
    let first = components.next()?.as_os_str().to_str()?;
    // A bare filename has no grouping directory.
    components.next()?;
    Some(slugify(first))
}

/// First non-heading, non-empty line of the body.
fn first_paragraph(body: &str) -> String {
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .unwrap_or("")
        .to_string()
}

/// Lowercase, hyphen-separated slug of an arbitrary string.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut last_was_sep = true;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            slug.push('-');
            last_was_sep = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Slug of a source path with its extension removed.
pub fn path_slug(source_path: &str) -> String {
    let without_ext = Path::new(source_path)
        .with_extension("")
        .to_string_lossy()
        .into_owned();
    slugify(&without_ext)
}
