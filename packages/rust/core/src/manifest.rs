//! The import manifest: a durable record of which source files and content
//! nodes have been imported, used to compute incremental diffs.
//!
//! The manifest is a single versioned JSON document (`import-manifest.json`
//! under the output root). Loading is total (a missing or corrupt file
//! degrades to a fresh empty manifest with a warning) while save failures
//! surface to the caller, since there is no safe fallback for a failed
//! write.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use graphloom_shared::{ContentNode, ContentType, GraphloomError, Result};

/// Well-known manifest file name under the output root.
pub const MANIFEST_FILE_NAME: &str = "import-manifest.json";

/// Current manifest document version.
pub const MANIFEST_VERSION: u32 = 1;

/// Current node schema version recorded in the manifest.
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Tracking record for one source file ever seen by the importer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    /// Source file path, relative to the scan root.
    pub path: String,
    /// SHA-256 of the file bytes at last import.
    pub content_hash: String,
    /// File modification time at last import.
    pub last_modified: DateTime<Utc>,
    /// Ids of the nodes generated from this file, in generation order.
    pub generated_node_ids: Vec<String>,
}

/// Tracking record for one generated content node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeHashEntry {
    pub node_id: String,
    /// Hash of the node's identity-relevant fields (id, content, metadata).
    pub hash: String,
    pub source_path: String,
    pub content_type: ContentType,
    pub generated_at: DateTime<Utc>,
}

/// Append-only record of a schema migration applied to the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationRecord {
    pub id: String,
    pub from_version: u32,
    pub to_version: u32,
    pub applied_at: DateTime<Utc>,
    pub rules_applied: Vec<String>,
    pub nodes_migrated: u64,
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// The manifest aggregate root. Owned by exactly one import run at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub manifest_version: u32,
    pub schema_version: u32,
    pub last_updated: DateTime<Utc>,
    /// Source file records, keyed by path.
    #[serde(default)]
    pub source_hashes: BTreeMap<String, SourceEntry>,
    /// Node records, keyed by node id.
    #[serde(default)]
    pub node_hashes: BTreeMap<String, NodeHashEntry>,
    pub total_source_files: usize,
    pub total_nodes: usize,
    pub total_relationships: usize,
    #[serde(default)]
    pub migrations: Vec<MigrationRecord>,
}

impl Default for Manifest {
    fn default() -> Self {
        Self::new()
    }
}

impl Manifest {
    /// A fresh, empty manifest at the current versions.
    pub fn new() -> Self {
        Self {
            manifest_version: MANIFEST_VERSION,
            schema_version: MANIFEST_SCHEMA_VERSION,
            last_updated: Utc::now(),
            source_hashes: BTreeMap::new(),
            node_hashes: BTreeMap::new(),
            total_source_files: 0,
            total_nodes: 0,
            total_relationships: 0,
            migrations: Vec::new(),
        }
    }

    /// Load a manifest from `path`.
    ///
    /// Never fails the caller: a missing file or malformed content falls
    /// back to a fresh empty manifest with a non-fatal warning.
    pub fn load(path: &Path) -> Manifest {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(?path, "no prior manifest, starting fresh");
                return Manifest::new();
            }
            Err(e) => {
                tracing::warn!(?path, error = %e, "manifest unreadable, starting fresh");
                return Manifest::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!(?path, error = %e, "manifest malformed, starting fresh");
                Manifest::new()
            }
        }
    }

    /// Whether a prior manifest document exists at `path`.
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Persist the manifest to `path`, stamping `last_updated`.
    ///
    /// Creates missing parent directories. Write failures surface to the
    /// caller.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        self.last_updated = Utc::now();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GraphloomError::io(parent, e))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| GraphloomError::validation(format!("manifest serialization: {e}")))?;
        std::fs::write(path, json).map_err(|e| GraphloomError::io(path, e))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Change detection
    // -----------------------------------------------------------------------

    /// True if `path` is unknown or its stored hash differs from `current_hash`.
    pub fn has_changed(&self, path: &str, current_hash: &str) -> bool {
        match self.source_hashes.get(path) {
            Some(entry) => entry.content_hash != current_hash,
            None => true,
        }
    }

    /// Every path in the current scan whose content is new or changed.
    pub fn diff_new_or_changed(&self, current_hashes: &BTreeMap<String, String>) -> Vec<String> {
        current_hashes
            .iter()
            .filter(|(path, hash)| self.has_changed(path, hash))
            .map(|(path, _)| path.clone())
            .collect()
    }

    /// Every path in the manifest that is absent from the current scan.
    pub fn diff_removed(&self, current_paths: &BTreeSet<String>) -> Vec<String> {
        self.source_hashes
            .keys()
            .filter(|path| !current_paths.contains(*path))
            .cloned()
            .collect()
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Upsert a source entry. `total_source_files` is recomputed from the
    /// map size, so repeated calls for the same path stay correct.
    pub fn update_source(
        &mut self,
        path: &str,
        content_hash: &str,
        last_modified: DateTime<Utc>,
        generated_node_ids: Vec<String>,
    ) {
        self.source_hashes.insert(
            path.to_string(),
            SourceEntry {
                path: path.to_string(),
                content_hash: content_hash.to_string(),
                last_modified,
                generated_node_ids,
            },
        );
        self.total_source_files = self.source_hashes.len();
    }

    /// Upsert a node hash entry; recomputes `total_nodes` from the map size.
    pub fn update_node(
        &mut self,
        node_id: &str,
        hash: &str,
        source_path: &str,
        content_type: ContentType,
    ) {
        self.node_hashes.insert(
            node_id.to_string(),
            NodeHashEntry {
                node_id: node_id.to_string(),
                hash: hash.to_string(),
                source_path: source_path.to_string(),
                content_type,
                generated_at: Utc::now(),
            },
        );
        self.total_nodes = self.node_hashes.len();
    }

    /// Delete a source entry and every node entry it generated.
    ///
    /// Returns the removed node ids so the caller can prune them from the
    /// persisted node set. Unknown paths are a no-op returning an empty
    /// list.
    pub fn remove_source(&mut self, path: &str) -> Vec<String> {
        let Some(entry) = self.source_hashes.remove(path) else {
            return Vec::new();
        };

        let mut removed = Vec::new();
        for node_id in entry.generated_node_ids {
            if self.node_hashes.remove(&node_id).is_some() {
                removed.push(node_id);
            }
        }

        self.total_source_files = self.source_hashes.len();
        self.total_nodes = self.node_hashes.len();
        removed
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check the manifest's internal invariants.
    ///
    /// Returns human-readable violations, empty when consistent. This is a
    /// diagnostic operation; it is not run automatically on mutation and
    /// never auto-corrects.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if self.total_source_files != self.source_hashes.len() {
            violations.push(format!(
                "totalSourceFiles is {} but sourceHashes has {} entries",
                self.total_source_files,
                self.source_hashes.len()
            ));
        }
        if self.total_nodes != self.node_hashes.len() {
            violations.push(format!(
                "totalNodes is {} but nodeHashes has {} entries",
                self.total_nodes,
                self.node_hashes.len()
            ));
        }

        // Count how many source entries claim each node id.
        let mut owners: BTreeMap<&str, usize> = BTreeMap::new();
        for entry in self.source_hashes.values() {
            for node_id in &entry.generated_node_ids {
                *owners.entry(node_id.as_str()).or_insert(0) += 1;
                if !self.node_hashes.contains_key(node_id) {
                    violations.push(format!(
                        "source {} lists node {} with no nodeHashes entry",
                        entry.path, node_id
                    ));
                }
            }
        }

        for node_id in self.node_hashes.keys() {
            match owners.get(node_id.as_str()).copied().unwrap_or(0) {
                0 => violations.push(format!("node {node_id} is not owned by any source entry")),
                1 => {}
                n => violations.push(format!("node {node_id} is owned by {n} source entries")),
            }
        }

        violations
    }
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// SHA-256 hex digest of a file's bytes. Pure function of the bytes only;
/// path and filesystem metadata do not participate.
pub fn hash_file(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| GraphloomError::io(path, e))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Identity-relevant fields of a node, hashed to detect real changes.
#[derive(Serialize)]
struct NodeDigest<'a> {
    id: &'a str,
    content: &'a str,
    metadata: &'a graphloom_shared::NodeMetadata,
}

/// SHA-256 hex digest of a node's canonical serialization.
///
/// Only `{id, content, metadata}` participate, so cosmetic changes to
/// titles or descriptions do not force downstream re-processing.
pub fn hash_node(node: &ContentNode) -> String {
    let digest = NodeDigest {
        id: &node.id,
        content: &node.content,
        metadata: &node.metadata,
    };
    let json = serde_json::to_string(&digest).expect("node digest serialization cannot fail");
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    format!("{:x}", hasher.finalize())
}
