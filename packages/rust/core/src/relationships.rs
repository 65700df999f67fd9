//! Relationship extraction: infers a bounded, deduplicated set of edges
//! between content nodes from four independent heuristic signals.
//!
//! The engine is pure and synchronous. Candidates carry an internal score
//! and reason while they flow through scoring, deduplication, and fan-out
//! capping; both are stripped before anything leaves this module.
//!
//! Relationship ids are derived from the endpoint pair and signal plus a
//! per-call sequence number, so repeated extraction over the same input
//! produces identical output with no shared state between calls.

use std::collections::{BTreeSet, HashMap};

use sha2::{Digest, Sha256};

use graphloom_shared::{
    ContentNode, ContentRelationship, ContentType, InferenceSource, RelationshipType,
};

use crate::graph;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Tuning knobs for one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Enable the shared-grouping (epic) strategy.
    pub include_path: bool,
    /// Enable the shared-tags strategy.
    pub include_tags: bool,
    /// Enable the body-text mention strategy. The only strategy that scans
    /// content pairwise, so it is opt-in for cost reasons.
    pub include_content: bool,
    /// Candidates scoring below this are discarded before deduplication.
    pub min_score: f64,
    /// Maximum relationships retained per source node after ranking.
    pub max_per_node: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            include_path: true,
            include_tags: true,
            include_content: false,
            min_score: 0.5,
            max_per_node: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

/// Tags too generic to signal a real connection between two nodes.
const GENERIC_TAGS: [&str; 8] = [
    "source",
    "resource",
    "scenario",
    "epic",
    "role",
    "archetype",
    "feature",
    "documentation",
];

/// Grouping value treated as "no grouping".
const GROUP_NONE: &str = "none";

/// Minimum shared meaningful tags for the tag strategy to consider a pair.
const TAG_MIN_SHARED: usize = 2;
/// Minimum Jaccard similarity for a tag candidate.
const TAG_SCORE_FLOOR: f64 = 0.5;

/// Base score for two nodes sharing a grouping value.
const PATH_BASE_SCORE: f64 = 0.4;
/// Bonus when the secondary grouping (user type) also matches.
const PATH_USER_TYPE_BONUS: f64 = 0.3;
/// Bonus when the content types match.
const PATH_TYPE_BONUS: f64 = 0.2;
/// Minimum combined score for a path candidate.
const PATH_SCORE_FLOOR: f64 = 0.5;

/// Score for a body-text title mention.
const CONTENT_TITLE_SCORE: f64 = 0.6;
/// Score for a body-text id mention.
const CONTENT_ID_SCORE: f64 = 0.8;
/// Titles this short match too promiscuously to count as mentions.
const CONTENT_MIN_TITLE_LEN: usize = 3;

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// A scored relationship candidate. Internal to the engine.
#[derive(Debug, Clone)]
struct Candidate {
    source_node_id: String,
    target_node_id: String,
    relationship_type: RelationshipType,
    inference_source: InferenceSource,
    score: f64,
    #[allow(dead_code)]
    reason: &'static str,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Infer relationships over the full node set.
///
/// Runs each enabled signal extractor once per node against the full set,
/// deduplicates by unordered endpoint pair (highest score wins, earlier
/// discovery breaks ties), and caps fan-out per source node.
pub fn extract(nodes: &[ContentNode], options: &ExtractOptions) -> Vec<ContentRelationship> {
    let by_id: HashMap<&str, &ContentNode> =
        nodes.iter().map(|n| (n.id.as_str(), n)).collect();

    let mut candidates: Vec<Candidate> = Vec::new();
    for node in nodes {
        explicit_candidates(node, &by_id, &mut candidates);
        if options.include_path {
            path_candidates(node, nodes, &mut candidates);
        }
        if options.include_tags {
            tag_candidates(node, nodes, &mut candidates);
        }
        if options.include_content {
            content_candidates(node, nodes, &mut candidates);
        }
    }

    tracing::debug!(
        nodes = nodes.len(),
        candidates = candidates.len(),
        "relationship candidates collected"
    );

    let deduped = dedupe(candidates, options.min_score);
    cap_and_strip(deduped, options.max_per_node)
}

/// Summary statistics over an extraction result (analytics path).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionStats {
    pub relationships: usize,
    pub connected_components: usize,
    pub isolated_nodes: usize,
}

/// Component-level statistics for a node/relationship set.
pub fn extraction_stats(
    nodes: &[ContentNode],
    relationships: &[ContentRelationship],
) -> ExtractionStats {
    let graph = graph::build_graph(nodes.iter().map(|n| n.id.as_str()), relationships);
    let components = graph::connected_components(&graph);
    let isolated = components.iter().filter(|c| c.len() == 1).count();
    ExtractionStats {
        relationships: relationships.len(),
        connected_components: components.len(),
        isolated_nodes: isolated,
    }
}

// ---------------------------------------------------------------------------
// Signal extractors
// ---------------------------------------------------------------------------

/// Declared references: `relatedNodeIds` entries and provenance links.
fn explicit_candidates(
    node: &ContentNode,
    by_id: &HashMap<&str, &ContentNode>,
    out: &mut Vec<Candidate>,
) {
    for related_id in &node.related_node_ids {
        if related_id == &node.id {
            continue;
        }
        if let Some(target) = by_id.get(related_id.as_str()) {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: target.id.clone(),
                relationship_type: infer_relationship_type(node, target),
                inference_source: InferenceSource::Explicit,
                score: 1.0,
                reason: "explicit-reference",
            });
        }
    }

    if let Some(origin_id) = node.metadata.derived_from.as_deref() {
        if origin_id != node.id && by_id.contains_key(origin_id) {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: origin_id.to_string(),
                relationship_type: RelationshipType::DerivedFrom,
                inference_source: InferenceSource::Explicit,
                score: 1.0,
                reason: "provenance-link",
            });
        }
    }
}

/// Shared grouping: nodes under the same epic, boosted by matching user
/// type and content type. Source nodes never participate.
fn path_candidates(node: &ContentNode, nodes: &[ContentNode], out: &mut Vec<Candidate>) {
    if node.content_type == ContentType::Source {
        return;
    }
    let Some(group) = usable_group(node) else {
        return;
    };

    for other in nodes {
        if other.id == node.id || other.content_type == ContentType::Source {
            continue;
        }
        if usable_group(other) != Some(group) {
            continue;
        }

        let mut score = PATH_BASE_SCORE;
        if let (Some(a), Some(b)) = (
            node.metadata.user_type.as_deref(),
            other.metadata.user_type.as_deref(),
        ) {
            if a == b {
                score += PATH_USER_TYPE_BONUS;
            }
        }
        if node.content_type == other.content_type {
            score += PATH_TYPE_BONUS;
        }

        if score >= PATH_SCORE_FLOOR {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: other.id.clone(),
                relationship_type: infer_relationship_type(node, other),
                inference_source: InferenceSource::Path,
                score,
                reason: "shared-epic",
            });
        }
    }
}

/// The node's grouping value, unless absent or the "none" sentinel.
fn usable_group(node: &ContentNode) -> Option<&str> {
    node.metadata
        .epic
        .as_deref()
        .filter(|group| !group.is_empty() && *group != GROUP_NONE)
}

/// Shared tags: Jaccard similarity over tags with the generic stoplist
/// stripped from both sides.
fn tag_candidates(node: &ContentNode, nodes: &[ContentNode], out: &mut Vec<Candidate>) {
    if node.content_type == ContentType::Source || node.tags.is_empty() {
        return;
    }
    let meaningful = meaningful_tags(node);
    if meaningful.is_empty() {
        return;
    }

    for other in nodes {
        if other.id == node.id
            || other.content_type == ContentType::Source
            || other.tags.is_empty()
        {
            continue;
        }
        let other_meaningful = meaningful_tags(other);
        if other_meaningful.is_empty() {
            continue;
        }

        let shared = meaningful.intersection(&other_meaningful).count();
        if shared < TAG_MIN_SHARED {
            continue;
        }
        let union = meaningful.union(&other_meaningful).count();
        let score = shared as f64 / union as f64;

        if score >= TAG_SCORE_FLOOR {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: other.id.clone(),
                relationship_type: infer_relationship_type(node, other),
                inference_source: InferenceSource::Tag,
                score,
                reason: "shared-tags",
            });
        }
    }
}

/// Tags left after stripping the generic stoplist.
fn meaningful_tags(node: &ContentNode) -> BTreeSet<&str> {
    node.tags
        .iter()
        .map(String::as_str)
        .filter(|tag| !GENERIC_TAGS.contains(tag))
        .collect()
}

/// Body-text mentions: the node's content containing another node's title
/// (case-folded) or id. The only strategy that scans text pairwise.
fn content_candidates(node: &ContentNode, nodes: &[ContentNode], out: &mut Vec<Candidate>) {
    let content_lower = node.content.to_lowercase();
    if content_lower.is_empty() {
        return;
    }

    for other in nodes {
        if other.id == node.id {
            continue;
        }

        if other.title.len() > CONTENT_MIN_TITLE_LEN
            && content_lower.contains(&other.title.to_lowercase())
        {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: other.id.clone(),
                relationship_type: RelationshipType::References,
                inference_source: InferenceSource::Semantic,
                score: CONTENT_TITLE_SCORE,
                reason: "title-mention",
            });
            continue;
        }

        if content_lower.contains(&other.id) {
            out.push(Candidate {
                source_node_id: node.id.clone(),
                target_node_id: other.id.clone(),
                relationship_type: RelationshipType::References,
                inference_source: InferenceSource::Semantic,
                score: CONTENT_ID_SCORE,
                reason: "id-mention",
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Type inference
// ---------------------------------------------------------------------------

/// Classify a candidate edge's semantic type from its endpoints.
fn infer_relationship_type(source: &ContentNode, target: &ContentNode) -> RelationshipType {
    let derived_from_source = target.metadata.derived_from.as_deref() == Some(source.id.as_str());
    if source.content_type == ContentType::Source
        || target.content_type == ContentType::Source
        || derived_from_source
    {
        return RelationshipType::SourceOf;
    }
    if source.metadata.derived_from.as_deref() == Some(target.id.as_str()) {
        return RelationshipType::DerivedFrom;
    }

    let contains = matches!(
        (source.content_type, target.content_type),
        (ContentType::Epic, ContentType::Archetype)
            | (ContentType::Epic, ContentType::Scenario)
            | (ContentType::Archetype, ContentType::Scenario)
    );
    if contains {
        return RelationshipType::Contains;
    }

    RelationshipType::RelatesTo
}

// ---------------------------------------------------------------------------
// Dedup + capping
// ---------------------------------------------------------------------------

/// Discard candidates below `min_score`, then keep the highest-scoring
/// candidate per unordered endpoint pair. Pair order follows discovery
/// order; ties keep the earlier candidate.
fn dedupe(candidates: Vec<Candidate>, min_score: f64) -> Vec<Candidate> {
    let mut best: Vec<Candidate> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for candidate in candidates {
        if candidate.score < min_score {
            continue;
        }
        let key = pair_key(&candidate.source_node_id, &candidate.target_node_id);
        match index.get(&key) {
            Some(&i) => {
                if candidate.score > best[i].score {
                    best[i] = candidate;
                }
            }
            None => {
                index.insert(key, best.len());
                best.push(candidate);
            }
        }
    }

    best
}

/// Unordered endpoint pair.
fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Group by source node, keep the top `max_per_node` by score (stable sort,
/// discovery order breaks ties), and strip scores into the public shape.
fn cap_and_strip(candidates: Vec<Candidate>, max_per_node: usize) -> Vec<ContentRelationship> {
    let mut group_order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<Candidate>> = HashMap::new();

    for candidate in candidates {
        let key = candidate.source_node_id.clone();
        if !groups.contains_key(&key) {
            group_order.push(key.clone());
        }
        groups.entry(key).or_default().push(candidate);
    }

    let mut relationships = Vec::new();
    for source_id in group_order {
        let mut group = groups.remove(&source_id).unwrap_or_default();
        group.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        group.truncate(max_per_node);

        for candidate in group {
            let seq = relationships.len();
            relationships.push(ContentRelationship {
                id: relationship_id(
                    &candidate.source_node_id,
                    &candidate.target_node_id,
                    candidate.inference_source,
                    seq,
                ),
                source_node_id: candidate.source_node_id,
                target_node_id: candidate.target_node_id,
                relationship_type: candidate.relationship_type,
                confidence: candidate.score,
                inference_source: candidate.inference_source,
            });
        }
    }

    relationships
}

/// Deterministic relationship id: endpoint pair + signal hashed, plus the
/// position in this call's output.
fn relationship_id(
    source: &str,
    target: &str,
    inference: InferenceSource,
    seq: usize,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"|");
    hasher.update(target.as_bytes());
    hasher.update(b"|");
    hasher.update(inference.to_string().as_bytes());
    let digest = hasher.finalize();
    let short: String = digest[..6].iter().map(|b| format!("{b:02x}")).collect();
    format!("rel-{seq:04}-{short}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphloom_shared::NodeMetadata;
    use std::collections::BTreeSet as TagSet;

    fn node(id: &str, content_type: ContentType) -> ContentNode {
        ContentNode {
            id: id.into(),
            content_type,
            title: id.into(),
            description: String::new(),
            content: String::new(),
            tags: TagSet::new(),
            related_node_ids: Vec::new(),
            metadata: NodeMetadata::default(),
            source_path: None,
        }
    }

    fn with_tags(mut n: ContentNode, tags: &[&str]) -> ContentNode {
        n.tags = tags.iter().map(|t| t.to_string()).collect();
        n
    }

    fn with_group(mut n: ContentNode, epic: &str, user_type: Option<&str>) -> ContentNode {
        n.metadata.epic = Some(epic.into());
        n.metadata.user_type = user_type.map(String::from);
        n
    }

    #[test]
    fn explicit_reference_end_to_end() {
        let mut e1 = node("e1", ContentType::Epic);
        e1.related_node_ids = vec!["s1".into()];
        let s1 = node("s1", ContentType::Scenario);

        let rels = extract(&[e1, s1], &ExtractOptions::default());

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].source_node_id, "e1");
        assert_eq!(rels[0].target_node_id, "s1");
        assert_eq!(rels[0].inference_source, InferenceSource::Explicit);
        assert_eq!(rels[0].relationship_type, RelationshipType::Contains);
        assert_eq!(rels[0].confidence, 1.0);
    }

    #[test]
    fn explicit_reference_to_absent_node_is_dropped() {
        let mut e1 = node("e1", ContentType::Epic);
        e1.related_node_ids = vec!["missing".into()];

        let rels = extract(&[e1], &ExtractOptions::default());
        assert!(rels.is_empty());
    }

    #[test]
    fn provenance_link_is_derived_from() {
        let mut doc = node("governance-epic", ContentType::Epic);
        doc.metadata.derived_from = Some("source-governance".into());
        let src = node("source-governance", ContentType::Source);

        let rels = extract(&[doc, src], &ExtractOptions::default());

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].relationship_type, RelationshipType::DerivedFrom);
        assert_eq!(rels[0].source_node_id, "governance-epic");
        assert_eq!(rels[0].target_node_id, "source-governance");
        assert_eq!(rels[0].inference_source, InferenceSource::Explicit);
    }

    #[test]
    fn path_full_match_scores_high_and_connects() {
        let a = with_group(node("a", ContentType::Scenario), "gov", Some("citizen"));
        let b = with_group(node("b", ContentType::Scenario), "gov", Some("citizen"));

        let rels = extract(&[a, b], &ExtractOptions::default());

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].inference_source, InferenceSource::Path);
        assert!((rels[0].confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn path_group_only_does_not_connect() {
        // Same epic, different user types, different content types: 0.4.
        let a = with_group(node("a", ContentType::Scenario), "gov", Some("citizen"));
        let b = with_group(node("b", ContentType::Resource), "gov", Some("builder"));

        let rels = extract(&[a, b], &ExtractOptions::default());
        assert!(rels.is_empty());
    }

    #[test]
    fn path_skips_source_nodes_and_none_sentinel() {
        let a = with_group(node("a", ContentType::Scenario), "gov", None);
        let src = with_group(node("s", ContentType::Source), "gov", None);
        let rels = extract(&[a.clone(), src], &ExtractOptions::default());
        assert!(rels.is_empty());

        let b = with_group(node("b", ContentType::Scenario), "none", None);
        let c = with_group(node("c", ContentType::Scenario), "none", None);
        let rels = extract(&[b, c], &ExtractOptions::default());
        assert!(rels.is_empty());
    }

    #[test]
    fn tag_threshold_behavior() {
        // One shared meaningful tag: below the pair minimum, no edge.
        let a = with_tags(node("a", ContentType::Resource), &["trust", "alpha"]);
        let b = with_tags(node("b", ContentType::Resource), &["trust", "beta"]);
        assert!(extract(&[a, b], &ExtractOptions::default()).is_empty());

        // Two shared of union three: 0.667, exactly one edge.
        let a = with_tags(node("a", ContentType::Resource), &["trust", "voting"]);
        let b = with_tags(node("b", ContentType::Resource), &["trust", "voting", "delegation"]);
        let rels = extract(&[a, b], &ExtractOptions::default());
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].inference_source, InferenceSource::Tag);
        assert!((rels[0].confidence - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn generic_tags_are_ignored() {
        let a = with_tags(node("a", ContentType::Resource), &["epic", "scenario", "role"]);
        let b = with_tags(node("b", ContentType::Resource), &["epic", "scenario", "role"]);
        assert!(extract(&[a, b], &ExtractOptions::default()).is_empty());
    }

    #[test]
    fn pairwise_dedup_keeps_highest_score() {
        // a↔b proposed by both the explicit (1.0) and tag (1.0 → 2/2) strategies.
        let mut a = with_tags(node("a", ContentType::Resource), &["trust", "voting"]);
        a.related_node_ids = vec!["b".into()];
        let b = with_tags(node("b", ContentType::Resource), &["trust", "voting"]);

        let rels = extract(&[a, b], &ExtractOptions::default());

        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].inference_source, InferenceSource::Explicit);
        assert_eq!(rels[0].confidence, 1.0);
    }

    #[test]
    fn fan_out_cap_keeps_best_ranked() {
        let mut hub = node("hub", ContentType::Epic);
        hub.related_node_ids = vec!["t1".into(), "t2".into(), "t3".into()];
        let t1 = node("t1", ContentType::Resource);
        let t2 = node("t2", ContentType::Resource);
        let t3 = node("t3", ContentType::Resource);

        let options = ExtractOptions {
            max_per_node: 2,
            ..Default::default()
        };
        let rels = extract(&[hub, t1, t2, t3], &options);

        let from_hub: Vec<_> = rels.iter().filter(|r| r.source_node_id == "hub").collect();
        assert_eq!(from_hub.len(), 2);
        // Stable ranking: equal scores keep discovery order.
        assert_eq!(from_hub[0].target_node_id, "t1");
        assert_eq!(from_hub[1].target_node_id, "t2");
    }

    #[test]
    fn fan_out_bound_holds_for_every_source() {
        let nodes: Vec<ContentNode> = (0..8)
            .map(|i| {
                with_tags(
                    node(&format!("n{i}"), ContentType::Resource),
                    &["trust", "voting"],
                )
            })
            .collect();

        let options = ExtractOptions {
            max_per_node: 3,
            ..Default::default()
        };
        let rels = extract(&nodes, &options);

        let mut per_source: HashMap<&str, usize> = HashMap::new();
        for rel in &rels {
            *per_source.entry(rel.source_node_id.as_str()).or_insert(0) += 1;
        }
        assert!(per_source.values().all(|&count| count <= 3));
    }

    #[test]
    fn content_strategy_is_opt_in() {
        let mut a = node("a", ContentType::Resource);
        a.content = "See the Delegation Rules for details.".into();
        let mut b = node("b", ContentType::Resource);
        b.title = "Delegation Rules".into();

        assert!(extract(&[a.clone(), b.clone()], &ExtractOptions::default()).is_empty());

        let options = ExtractOptions {
            include_content: true,
            ..Default::default()
        };
        let rels = extract(&[a, b], &options);
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].relationship_type, RelationshipType::References);
        assert_eq!(rels[0].inference_source, InferenceSource::Semantic);
        assert!((rels[0].confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn content_id_mention_scores_higher_than_title() {
        let mut a = node("a", ContentType::Resource);
        a.content = "depends on trust-scenario for onboarding".into();
        let mut b = node("trust-scenario", ContentType::Scenario);
        b.title = "Unrelated Title Words".into();

        let options = ExtractOptions {
            include_content: true,
            include_path: false,
            include_tags: false,
            ..Default::default()
        };
        let rels = extract(&[a, b], &options);
        assert_eq!(rels.len(), 1);
        assert!((rels[0].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn content_short_titles_do_not_match() {
        let mut a = node("alpha-note", ContentType::Resource);
        a.content = "to be or not to be".into();
        let mut b = node("beta-note", ContentType::Resource);
        b.title = "be".into();

        let options = ExtractOptions {
            include_content: true,
            ..Default::default()
        };
        assert!(extract(&[a, b], &options).is_empty());
    }

    #[test]
    fn min_score_discards_weak_candidates() {
        let a = with_group(node("a", ContentType::Scenario), "gov", Some("citizen"));
        let b = with_group(node("b", ContentType::Scenario), "gov", Some("citizen"));

        let options = ExtractOptions {
            min_score: 0.95,
            ..Default::default()
        };
        // 0.9 path candidate falls below the raised floor.
        assert!(extract(&[a, b], &options).is_empty());
    }

    #[test]
    fn extraction_is_deterministic() {
        let a = with_tags(node("a", ContentType::Resource), &["trust", "voting"]);
        let b = with_tags(node("b", ContentType::Resource), &["trust", "voting"]);
        let c = with_group(node("c", ContentType::Scenario), "gov", Some("citizen"));
        let d = with_group(node("d", ContentType::Scenario), "gov", Some("citizen"));
        let nodes = vec![a, b, c, d];

        let first = extract(&nodes, &ExtractOptions::default());
        let second = extract(&nodes, &ExtractOptions::default());
        assert_eq!(first, second);
        assert!(first.iter().all(|r| r.id.starts_with("rel-")));
    }

    #[test]
    fn source_typed_endpoint_classifies_source_of() {
        let src = node("source-doc", ContentType::Source);
        let mut doc = node("doc", ContentType::Resource);
        doc.related_node_ids = vec!["source-doc".into()];

        let rels = extract(&[doc, src], &ExtractOptions::default());
        assert_eq!(rels.len(), 1);
        assert_eq!(rels[0].relationship_type, RelationshipType::SourceOf);
    }

    #[test]
    fn stats_reports_components() {
        let a = with_tags(node("a", ContentType::Resource), &["trust", "voting"]);
        let b = with_tags(node("b", ContentType::Resource), &["trust", "voting"]);
        let lone = node("lone", ContentType::Resource);
        let nodes = vec![a, b, lone];

        let rels = extract(&nodes, &ExtractOptions::default());
        let stats = extraction_stats(&nodes, &rels);

        assert_eq!(stats.relationships, 1);
        assert_eq!(stats.connected_components, 2);
        assert_eq!(stats.isolated_nodes, 1);
    }
}
