//! Core domain types for Graphloom knowledge graphs.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// The type of a content node, assigned by the transformer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// A top-level initiative document grouping related content.
    Epic,
    /// A user archetype / role description.
    Archetype,
    /// A behavioral scenario (typically from a `.feature` file).
    Scenario,
    /// Any other substantive document.
    Resource,
    /// A provenance node representing the source file itself.
    Source,
}

impl ContentType {
    /// Stable lowercase name, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Epic => "epic",
            ContentType::Archetype => "archetype",
            ContentType::Scenario => "scenario",
            ContentType::Resource => "resource",
            ContentType::Source => "source",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "epic" => Ok(ContentType::Epic),
            "archetype" | "user_type" | "role" => Ok(ContentType::Archetype),
            "scenario" | "feature" => Ok(ContentType::Scenario),
            "resource" => Ok(ContentType::Resource),
            "source" => Ok(ContentType::Source),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// NodeMetadata
// ---------------------------------------------------------------------------

/// Typed metadata carried by a content node.
///
/// The relationship extraction strategies read only the named fields;
/// `extra` is a residual map preserved for forward compatibility and
/// included in node hashing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Grouping attribute used by the path-based relationship strategy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epic: Option<String>,

    /// Secondary grouping attribute (audience / archetype slug).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,

    /// Id of the node this one was derived from (provenance link).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,

    /// Id of the parent node when this node was split out of a larger one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Residual open fields not interpreted by the engine.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

// ---------------------------------------------------------------------------
// ContentNode
// ---------------------------------------------------------------------------

/// A typed unit of content produced from a source file.
///
/// Nodes are immutable once produced within a run; a later run may replace
/// a node wholesale under the same id (last write wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentNode {
    /// Stable identifier, derived from the source path by the transformer.
    pub id: String,
    /// Assigned content type.
    pub content_type: ContentType,
    /// Display title.
    pub title: String,
    /// Short description (may be empty).
    #[serde(default)]
    pub description: String,
    /// Full body text.
    #[serde(default)]
    pub content: String,
    /// Classification tags.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
    /// Explicitly declared related node ids.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_node_ids: Vec<String>,
    /// Typed metadata.
    #[serde(default)]
    pub metadata: NodeMetadata,
    /// Originating source file path, when the node came from a file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,
}

// ---------------------------------------------------------------------------
// Relationships
// ---------------------------------------------------------------------------

/// Semantic type of an inferred relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipType {
    RelatesTo,
    Contains,
    DerivedFrom,
    SourceOf,
    References,
}

/// Which heuristic signal produced a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferenceSource {
    /// Declared in the node's own `relatedNodeIds` or provenance metadata.
    Explicit,
    /// Shared grouping attributes (epic / user type / content type).
    Path,
    /// Overlapping meaningful tags.
    Tag,
    /// Title or id mention found in body text.
    Semantic,
}

impl std::fmt::Display for InferenceSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            InferenceSource::Explicit => "explicit",
            InferenceSource::Path => "path",
            InferenceSource::Tag => "tag",
            InferenceSource::Semantic => "semantic",
        };
        f.write_str(s)
    }
}

/// A typed edge between two content nodes.
///
/// Each instance stores a direction, but the unordered endpoint pair is
/// what makes a relationship unique: the extraction engine never emits
/// two relationships connecting the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRelationship {
    pub id: String,
    pub source_node_id: String,
    pub target_node_id: String,
    pub relationship_type: RelationshipType,
    /// Inference confidence in `[0, 1]`.
    pub confidence: f64,
    pub inference_source: InferenceSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_node() -> ContentNode {
        ContentNode {
            id: "governance-epic".into(),
            content_type: ContentType::Epic,
            title: "Governance".into(),
            description: "Shared decision making".into(),
            content: "# Governance\n...".into(),
            tags: ["governance", "coordination"]
                .into_iter()
                .map(String::from)
                .collect(),
            related_node_ids: vec!["trust-scenario".into()],
            metadata: NodeMetadata {
                epic: Some("governance".into()),
                ..Default::default()
            },
            source_path: Some("governance/epic.md".into()),
        }
    }

    #[test]
    fn content_node_roundtrip() {
        let node = sample_node();
        let json = serde_json::to_string(&node).expect("serialize");
        assert!(json.contains("\"contentType\":\"epic\""));
        assert!(json.contains("\"relatedNodeIds\""));
        let parsed: ContentNode = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, node);
    }

    #[test]
    fn metadata_preserves_unknown_fields() {
        let json = r#"{"epic":"governance","reviewStatus":"draft"}"#;
        let meta: NodeMetadata = serde_json::from_str(json).expect("deserialize");
        assert_eq!(meta.epic.as_deref(), Some("governance"));
        assert_eq!(
            meta.extra.get("reviewStatus").and_then(|v| v.as_str()),
            Some("draft")
        );
        let back = serde_json::to_string(&meta).expect("serialize");
        assert!(back.contains("reviewStatus"));
    }

    #[test]
    fn relationship_type_wire_format() {
        let json = serde_json::to_string(&RelationshipType::DerivedFrom).unwrap();
        assert_eq!(json, "\"DERIVED_FROM\"");
        let json = serde_json::to_string(&RelationshipType::RelatesTo).unwrap();
        assert_eq!(json, "\"RELATES_TO\"");
    }

    #[test]
    fn inference_source_wire_format() {
        let json = serde_json::to_string(&InferenceSource::Explicit).unwrap();
        assert_eq!(json, "\"explicit\"");
        assert_eq!(InferenceSource::Semantic.to_string(), "semantic");
    }

    #[test]
    fn content_type_parsing_accepts_aliases() {
        assert_eq!("user_type".parse::<ContentType>(), Ok(ContentType::Archetype));
        assert_eq!("feature".parse::<ContentType>(), Ok(ContentType::Scenario));
        assert!("widget".parse::<ContentType>().is_err());
    }
}
