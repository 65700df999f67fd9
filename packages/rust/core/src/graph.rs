//! Graph utilities: adjacency construction and connected-component
//! analysis over a node/relationship set.
//!
//! Used by the analytics path and by `graphloom components`; the
//! relationship extraction engine's scoring logic does not depend on this
//! module.

use std::collections::{BTreeMap, BTreeSet};

use graphloom_shared::ContentRelationship;

/// Undirected adjacency map: node id → neighbor ids.
pub type Graph = BTreeMap<String, BTreeSet<String>>;

/// Build an undirected adjacency map.
///
/// Every node id is initialized with an empty neighbor set (isolated nodes
/// included); each relationship then adds both endpoints to each other's
/// neighbor set. Endpoints not present in `node_ids` are added implicitly.
pub fn build_graph<'a, I>(node_ids: I, relationships: &[ContentRelationship]) -> Graph
where
    I: IntoIterator<Item = &'a str>,
{
    let mut graph: Graph = node_ids
        .into_iter()
        .map(|id| (id.to_string(), BTreeSet::new()))
        .collect();

    for rel in relationships {
        graph
            .entry(rel.source_node_id.clone())
            .or_default()
            .insert(rel.target_node_id.clone());
        graph
            .entry(rel.target_node_id.clone())
            .or_default()
            .insert(rel.source_node_id.clone());
    }

    graph
}

/// Find the connected components of an undirected graph.
///
/// Iterative depth-first traversal, starting from every unvisited node in
/// lexicographic id order; neighbor sets also iterate lexicographically,
/// so output order is deterministic for a given input. Every node appears
/// in exactly one component; isolated nodes form singletons.
pub fn connected_components(graph: &Graph) -> Vec<Vec<String>> {
    let mut visited: BTreeSet<&str> = BTreeSet::new();
    let mut components = Vec::new();

    for start in graph.keys() {
        if visited.contains(start.as_str()) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start.as_str()];
        visited.insert(start.as_str());

        while let Some(id) = stack.pop() {
            component.push(id.to_string());
            if let Some(neighbors) = graph.get(id) {
                for neighbor in neighbors {
                    if visited.insert(neighbor.as_str()) {
                        stack.push(neighbor.as_str());
                    }
                }
            }
        }

        components.push(component);
    }

    components
}
