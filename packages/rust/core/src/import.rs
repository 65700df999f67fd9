//! End-to-end import pipeline: scan → hash → diff → transform → manifest
//! update → merge → relationship extraction → persistence.
//!
//! The entry point [`run`] is total: every failure mode degrades to data in
//! the returned [`ImportReport`]. Per-file errors are recorded and the run
//! continues; the only fatal precondition (persistence requested without a
//! destination) produces a single synthetic error file-result inside an
//! otherwise-normal report.
//!
//! Files are processed strictly sequentially (file N's manifest update
//! completes before file N+1 begins) and the [`Manifest`] value is owned
//! by this run for its whole duration.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Serialize;
use tracing::{info, instrument, warn};
use walkdir::WalkDir;

use graphloom_shared::{
    ContentNode, ContentRelationship, GraphloomError, ImportMode, ImportOptions, Result,
};
use graphloom_storage::Store;
use graphloom_transform::TransformContext;

use crate::manifest::{self, MANIFEST_FILE_NAME, Manifest};
use crate::relationships::{self, ExtractOptions};

// ---------------------------------------------------------------------------
// Stages & results
// ---------------------------------------------------------------------------

/// Pipeline stage, for progress reporting and the final report.
///
/// Progression is linear, `Scanning → Parsing → Generating → Writing →
/// Complete`, with `Failed` reachable from any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStage {
    Scanning,
    Parsing,
    Generating,
    Writing,
    Complete,
    Failed,
}

impl std::fmt::Display for ImportStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ImportStage::Scanning => "scanning",
            ImportStage::Parsing => "parsing",
            ImportStage::Generating => "generating",
            ImportStage::Writing => "writing",
            ImportStage::Complete => "complete",
            ImportStage::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Outcome of processing one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Created,
    Error,
}

/// Per-file processing record.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub path: String,
    pub status: FileStatus,
    /// Error message when `status == Error`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Ids of the nodes generated from this file.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub node_ids: Vec<String>,
}

impl FileResult {
    fn created(path: &str, node_ids: Vec<String>) -> Self {
        Self {
            path: path.to_string(),
            status: FileStatus::Created,
            message: None,
            node_ids,
        }
    }

    fn error(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            status: FileStatus::Error,
            message: Some(message.into()),
            node_ids: Vec::new(),
        }
    }
}

/// Aggregated result of one import run. Always returned, never thrown past.
#[derive(Debug)]
pub struct ImportReport {
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    /// Stage the run ended in: `Complete`, or `Failed` on an unrecoverable error.
    pub stage: ImportStage,
    /// Files discovered by the scan.
    pub total_files: usize,
    /// Files that produced nodes this run.
    pub created: usize,
    /// Files skipped as unchanged (incremental mode).
    pub skipped: usize,
    /// Files that failed processing.
    pub errors: usize,
    /// Sources removed since the prior run (incremental mode).
    pub removed_files: usize,
    /// Nodes dropped by removal cascades.
    pub removed_nodes: usize,
    pub total_nodes: usize,
    pub total_relationships: usize,
    pub file_results: Vec<FileResult>,
    /// The full merged node set of this run.
    pub nodes: Vec<ContentNode>,
    /// The extracted relationship set of this run.
    pub relationships: Vec<ContentRelationship>,
}

// ---------------------------------------------------------------------------
// Progress reporting
// ---------------------------------------------------------------------------

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each file finishes processing.
    fn file_processed(&self, path: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &ImportReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn file_processed(&self, _path: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &ImportReport) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run one full import.
///
/// 1. Scan the source tree and hash every discovered file
/// 2. Diff against the prior manifest (incremental mode)
/// 3. Cascade removals for vanished sources
/// 4. Parse + transform changed files, one at a time
/// 5. Merge with carried-over nodes and extract relationships
/// 6. Persist and save the manifest (unless dry-run)
#[instrument(skip_all, fields(source = %options.source_dir.display(), mode = ?options.mode))]
pub async fn run(options: &ImportOptions, progress: &dyn ProgressReporter) -> ImportReport {
    let started_at = Utc::now();

    // The one documented unrecoverable precondition.
    if options.destination.is_none() && !options.dry_run {
        warn!("persistence requested but no destination configured");
        return failure_report(
            started_at,
            "persistence requested but no destination configured (set a destination or use dry-run)",
        );
    }

    // --- Scan ---
    let mut stage = ImportStage::Scanning;
    tracing::debug!(stage = %stage, "stage transition");
    progress.phase("Scanning sources");
    let scanned = match scan_sources(options) {
        Ok(paths) => paths,
        Err(e) => {
            warn!(error = %e, "source scan failed");
            return failure_report(started_at, format!("source scan failed: {e}"));
        }
    };
    let total_files = scanned.len();
    info!(total_files, "scan complete");

    // --- Hash ---
    let mut file_results: Vec<FileResult> = Vec::new();
    let mut current_hashes: BTreeMap<String, String> = BTreeMap::new();
    for path in &scanned {
        match manifest::hash_file(&options.source_dir.join(path)) {
            Ok(hash) => {
                current_hashes.insert(path.clone(), hash);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "hashing failed, recording error");
                file_results.push(FileResult::error(path, e.to_string()));
            }
        }
    }

    // --- Diff ---
    let manifest_path = options.output_dir.join(MANIFEST_FILE_NAME);
    let prior_exists = Manifest::exists(&manifest_path);
    let mut manifest = Manifest::load(&manifest_path);

    let incremental = options.mode == ImportMode::Incremental && prior_exists;
    let (files_to_process, removed_files) = if incremental {
        let current_paths: BTreeSet<String> = current_hashes.keys().cloned().collect();
        (
            manifest.diff_new_or_changed(&current_hashes),
            manifest.diff_removed(&current_paths),
        )
    } else {
        (current_hashes.keys().cloned().collect(), Vec::new())
    };

    info!(
        to_process = files_to_process.len(),
        removed = removed_files.len(),
        incremental,
        "diff computed"
    );

    // --- Cascade removals ---
    let mut removed_node_ids: Vec<String> = Vec::new();
    for path in &removed_files {
        let dropped = manifest.remove_source(path);
        info!(path = %path, dropped = dropped.len(), "source removed");
        removed_node_ids.extend(dropped);
    }

    // --- Per-file processing (strictly sequential) ---
    advance(&mut stage, ImportStage::Parsing);
    progress.phase("Processing files");
    let mut fresh_nodes: Vec<ContentNode> = Vec::new();
    let total_to_process = files_to_process.len();

    for (i, path) in files_to_process.iter().enumerate() {
        let Some(hash) = current_hashes.get(path) else {
            continue; // hashing already failed and was recorded
        };
        match process_file(options, path, hash, &mut manifest) {
            Ok(nodes) => {
                let node_ids = nodes.iter().map(|n| n.id.clone()).collect();
                file_results.push(FileResult::created(path, node_ids));
                fresh_nodes.extend(nodes);
            }
            Err(e) => {
                warn!(path = %path, error = %e, "file processing failed, continuing");
                file_results.push(FileResult::error(path, e.to_string()));
            }
        }
        progress.file_processed(path, i + 1, total_to_process);
    }

    // --- Carry-over (incremental only) ---
    advance(&mut stage, ImportStage::Generating);
    progress.phase("Merging node set");
    let carry_over = if incremental {
        match load_carry_over(options, &files_to_process, &removed_node_ids).await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(error = %e, "carry-over load failed, proceeding with fresh nodes only");
                Vec::new()
            }
        }
    } else {
        Vec::new()
    };

    // --- Merge (fresh wins by id) ---
    let mut merged: BTreeMap<String, ContentNode> = BTreeMap::new();
    for node in carry_over {
        merged.insert(node.id.clone(), node);
    }
    for node in fresh_nodes {
        merged.insert(node.id.clone(), node);
    }
    let nodes: Vec<ContentNode> = merged.into_values().collect();

    // --- Relationship extraction ---
    let relationships = if options.skip_relationships {
        Vec::new()
    } else {
        progress.phase("Extracting relationships");
        relationships::extract(&nodes, &ExtractOptions::default())
    };
    manifest.total_relationships = relationships.len();

    // --- Persist ---
    if options.dry_run {
        info!("dry-run: skipping persistence");
        stage = ImportStage::Complete;
    } else {
        advance(&mut stage, ImportStage::Writing);
        progress.phase("Persisting");
        match persist(
            options,
            started_at,
            &nodes,
            &relationships,
            &removed_node_ids,
            &mut manifest,
            &manifest_path,
        )
        .await
        {
            Ok(stats) => {
                info!(
                    nodes_written = stats.nodes_written,
                    relationships_written = stats.relationships_written,
                    "persisted"
                );
                stage = ImportStage::Complete;
            }
            Err(e) => {
                warn!(error = %e, "persistence failed");
                file_results.push(FileResult::error("<persistence>", e.to_string()));
                stage = ImportStage::Failed;
            }
        }
    }

    // --- Aggregate ---
    let created = file_results
        .iter()
        .filter(|r| r.status == FileStatus::Created)
        .count();
    let errors = file_results
        .iter()
        .filter(|r| r.status == FileStatus::Error)
        .count();

    let report = ImportReport {
        started_at,
        completed_at: Utc::now(),
        stage,
        total_files,
        created,
        skipped: total_files - files_to_process.len(),
        errors,
        removed_files: removed_files.len(),
        removed_nodes: removed_node_ids.len(),
        total_nodes: nodes.len(),
        total_relationships: relationships.len(),
        file_results,
        nodes,
        relationships,
    };

    info!(
        created = report.created,
        skipped = report.skipped,
        errors = report.errors,
        total_nodes = report.total_nodes,
        total_relationships = report.total_relationships,
        stage = %report.stage,
        "import complete"
    );
    progress.done(&report);
    report
}

/// Advance the linear stage machine, logging the transition.
fn advance(stage: &mut ImportStage, next: ImportStage) {
    *stage = next;
    tracing::debug!(stage = %next, "stage transition");
}

/// A report for a run that failed before any file was processed.
fn failure_report(started_at: DateTime<Utc>, message: impl Into<String>) -> ImportReport {
    ImportReport {
        started_at,
        completed_at: Utc::now(),
        stage: ImportStage::Failed,
        total_files: 0,
        created: 0,
        skipped: 0,
        errors: 1,
        removed_files: 0,
        removed_nodes: 0,
        total_nodes: 0,
        total_relationships: 0,
        file_results: vec![FileResult::error("<import>", message)],
        nodes: Vec::new(),
        relationships: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Discover candidate source files under the source root.
///
/// Paths are relative to the root and sorted for deterministic downstream
/// processing order.
fn scan_sources(options: &ImportOptions) -> Result<Vec<String>> {
    let root = &options.source_dir;
    if !root.is_dir() {
        return Err(GraphloomError::config(format!(
            "source directory does not exist: {}",
            root.display()
        )));
    }

    let include_set = build_globset(&options.include_patterns)?;
    let exclude_set = build_globset(&options.exclude_patterns)?;

    let mut paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| GraphloomError::config(format!("scan: {e}")))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let rel_str = relative.to_string_lossy().to_string();

        if rel_str == MANIFEST_FILE_NAME || exclude_set.is_match(&rel_str) {
            continue;
        }
        if !include_set.is_match(&rel_str) {
            continue;
        }

        paths.push(rel_str);
    }

    paths.sort();
    Ok(paths)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(
            Glob::new(pattern)
                .map_err(|e| GraphloomError::config(format!("bad glob '{pattern}': {e}")))?,
        );
    }
    builder
        .build()
        .map_err(|e| GraphloomError::config(format!("globset: {e}")))
}

/// Parse and transform one file, registering its nodes in the manifest.
///
/// Errors here are per-file: the caller records them and moves on.
fn process_file(
    options: &ImportOptions,
    path: &str,
    hash: &str,
    manifest: &mut Manifest,
) -> Result<Vec<ContentNode>> {
    let absolute = options.source_dir.join(path);
    let content =
        std::fs::read_to_string(&absolute).map_err(|e| GraphloomError::io(&absolute, e))?;
    let last_modified = file_modified(&absolute);

    let parsed = graphloom_parser::parse(path, &content)?;

    let mut nodes = Vec::new();
    let provenance = if options.generate_source_nodes
        && graphloom_transform::should_create_source_node(&parsed)
    {
        Some(graphloom_transform::source_node(&parsed))
    } else {
        None
    };

    let ctx = TransformContext {
        provenance_id: provenance.as_ref().map(|n| n.id.clone()),
        split_scenarios: options.generate_derived_nodes,
    };
    if let Some(source) = provenance {
        nodes.push(source);
    }
    nodes.extend(graphloom_transform::transform(&parsed, &ctx));

    for node in &nodes {
        manifest.update_node(&node.id, &manifest::hash_node(node), path, node.content_type);
    }
    let node_ids = nodes.iter().map(|n| n.id.clone()).collect();
    manifest.update_source(path, hash, last_modified, node_ids);

    Ok(nodes)
}

/// File mtime as UTC, falling back to now when unavailable.
fn file_modified(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .and_then(|m| m.modified())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(|_| Utc::now())
}

/// Load previously persisted nodes from untouched sources.
async fn load_carry_over(
    options: &ImportOptions,
    files_to_process: &[String],
    removed_node_ids: &[String],
) -> Result<Vec<ContentNode>> {
    let Some(destination) = options.destination.as_deref() else {
        // Dry-run without a destination has nothing to carry over.
        return Ok(Vec::new());
    };
    if !destination.exists() {
        return Ok(Vec::new());
    }

    let processing: BTreeSet<&str> = files_to_process.iter().map(String::as_str).collect();
    let removed: BTreeSet<&str> = removed_node_ids.iter().map(String::as_str).collect();

    let store = Store::open_readonly(destination).await?;
    let nodes = store.load_nodes().await?;
    Ok(nodes
        .into_iter()
        .filter(|node| {
            let untouched = node
                .source_path
                .as_deref()
                .map(|p| !processing.contains(p))
                .unwrap_or(true);
            untouched && !removed.contains(node.id.as_str())
        })
        .collect())
}

/// Write the batch, prune removed nodes, and save the manifest.
async fn persist(
    options: &ImportOptions,
    started_at: DateTime<Utc>,
    nodes: &[ContentNode],
    relationships: &[ContentRelationship],
    removed_node_ids: &[String],
    manifest: &mut Manifest,
    manifest_path: &Path,
) -> Result<graphloom_storage::WriteStats> {
    let destination = options
        .destination
        .as_deref()
        .ok_or_else(|| GraphloomError::config("no destination configured"))?;

    let store = Store::open(destination).await?;
    if !removed_node_ids.is_empty() {
        store.delete_nodes(removed_node_ids).await?;
    }
    let stats = store.write_batch(nodes, relationships).await?;

    let stats_json = serde_json::json!({
        "nodesWritten": stats.nodes_written,
        "relationshipsWritten": stats.relationships_written,
        "removedNodes": removed_node_ids.len(),
    });
    store
        .record_import(&started_at.to_rfc3339(), &stats_json.to_string())
        .await?;

    // The manifest is only saved once the write landed.
    manifest.save(manifest_path)?;
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphloom_shared::ContentType;
    use std::path::PathBuf;
    use uuid::Uuid;

    struct Workspace {
        source_dir: PathBuf,
        output_dir: PathBuf,
        destination: PathBuf,
    }

    fn workspace() -> Workspace {
        let root = std::env::temp_dir().join(format!("graphloom_import_{}", Uuid::now_v7()));
        let source_dir = root.join("docs");
        let output_dir = root.join("out");
        std::fs::create_dir_all(&source_dir).expect("create source dir");
        Workspace {
            source_dir,
            output_dir: output_dir.clone(),
            destination: output_dir.join("graph.db"),
        }
    }

    fn options(ws: &Workspace, mode: ImportMode) -> ImportOptions {
        ImportOptions {
            mode,
            source_dir: ws.source_dir.clone(),
            output_dir: ws.output_dir.clone(),
            destination: Some(ws.destination.clone()),
            dry_run: false,
            skip_relationships: false,
            generate_source_nodes: false,
            generate_derived_nodes: true,
            verbose: false,
            include_patterns: vec!["**/*.md".into(), "**/*.feature".into()],
            exclude_patterns: Vec::new(),
        }
    }

    fn write_source(ws: &Workspace, rel: &str, content: &str) {
        let path = ws.source_dir.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn full_import_produces_nodes_and_relationships() {
        let ws = workspace();
        write_source(
            &ws,
            "governance/epic.md",
            "---\ntags: trust, voting\n---\n# Governance\nShared decision making.\n",
        );
        write_source(
            &ws,
            "governance/delegation.md",
            "---\ntags: trust, voting, delegation\n---\n# Delegation\nDelegated voting.\n",
        );

        let report = run(&options(&ws, ImportMode::Full), &SilentProgress).await;

        assert_eq!(report.stage, ImportStage::Complete);
        assert_eq!(report.total_files, 2);
        assert_eq!(report.created, 2);
        assert_eq!(report.errors, 0);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.total_nodes, 2);
        // Same epic group + shared tags: the pair connects exactly once.
        assert_eq!(report.total_relationships, 1);

        // Manifest landed next to the output.
        let manifest = Manifest::load(&ws.output_dir.join(MANIFEST_FILE_NAME));
        assert_eq!(manifest.total_source_files, 2);
        assert_eq!(manifest.total_nodes, 2);
        assert!(manifest.validate().is_empty());
    }

    #[tokio::test]
    async fn incremental_rerun_is_idempotent() {
        let ws = workspace();
        write_source(&ws, "a.md", "# Alpha\nBody.\n");
        write_source(&ws, "b.md", "# Beta\nBody.\n");

        let opts = options(&ws, ImportMode::Incremental);
        let first = run(&opts, &SilentProgress).await;
        assert_eq!(first.created, 2);

        let second = run(&opts, &SilentProgress).await;
        assert_eq!(second.stage, ImportStage::Complete);
        assert_eq!(second.skipped, second.total_files);
        assert_eq!(second.created, 0);
        assert_eq!(second.errors, 0);
        // Unchanged nodes carry over from the store.
        assert_eq!(second.total_nodes, 2);
    }

    #[tokio::test]
    async fn changed_file_is_reprocessed_and_wins_merge() {
        let ws = workspace();
        write_source(&ws, "a.md", "# Alpha\nOriginal body.\n");

        let opts = options(&ws, ImportMode::Incremental);
        run(&opts, &SilentProgress).await;

        write_source(&ws, "a.md", "# Alpha Updated\nNew body.\n");
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.created, 1);
        assert_eq!(report.skipped, 0);
        assert_eq!(report.total_nodes, 1);
        assert_eq!(report.nodes[0].title, "Alpha Updated");
    }

    #[tokio::test]
    async fn removed_source_cascades_and_prunes_store() {
        let ws = workspace();
        write_source(&ws, "a.md", "# Alpha\nBody.\n");
        write_source(&ws, "b.md", "# Beta\nBody.\n");

        let opts = options(&ws, ImportMode::Incremental);
        run(&opts, &SilentProgress).await;

        std::fs::remove_file(ws.source_dir.join("b.md")).unwrap();
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.removed_files, 1);
        assert_eq!(report.removed_nodes, 1);
        assert_eq!(report.total_nodes, 1);

        let store = Store::open_readonly(&ws.destination).await.unwrap();
        assert_eq!(store.count_nodes().await.unwrap(), 1);

        let manifest = Manifest::load(&ws.output_dir.join(MANIFEST_FILE_NAME));
        assert!(manifest.validate().is_empty());
        assert_eq!(manifest.total_source_files, 1);
    }

    #[tokio::test]
    async fn parse_failure_is_isolated_per_file() {
        let ws = workspace();
        // Sorts first; missing the Feature: line, so parsing fails.
        write_source(&ws, "aaa-broken.feature", "Scenario: Orphan\n  Given nothing\n");
        write_source(&ws, "good.md", "# Good\nBody.\n");

        let mut opts = options(&ws, ImportMode::Incremental);
        opts.dry_run = true;
        opts.destination = None;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.errors, 1);
        assert_eq!(report.file_results[0].status, FileStatus::Error);
        assert!(
            report.file_results[0]
                .message
                .as_deref()
                .unwrap()
                .contains("Feature:")
        );
        // The other file still completed.
        assert_eq!(report.created, 1);
        assert_eq!(report.total_nodes, 1);
    }

    #[tokio::test]
    async fn missing_destination_is_synthetic_error() {
        let ws = workspace();
        write_source(&ws, "a.md", "# Alpha\nBody.\n");

        let mut opts = options(&ws, ImportMode::Full);
        opts.destination = None;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.stage, ImportStage::Failed);
        assert_eq!(report.errors, 1);
        assert_eq!(report.file_results.len(), 1);
        assert_eq!(report.file_results[0].status, FileStatus::Error);
        assert!(
            report.file_results[0]
                .message
                .as_deref()
                .unwrap()
                .contains("destination")
        );
        assert!(report.nodes.is_empty());
    }

    #[tokio::test]
    async fn dry_run_persists_nothing() {
        let ws = workspace();
        write_source(&ws, "a.md", "# Alpha\nBody.\n");

        let mut opts = options(&ws, ImportMode::Full);
        opts.dry_run = true;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.stage, ImportStage::Complete);
        assert_eq!(report.created, 1);
        assert!(!ws.destination.exists());
        assert!(!ws.output_dir.join(MANIFEST_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn source_nodes_thread_provenance() {
        let ws = workspace();
        write_source(&ws, "governance/epic.md", "# Governance\nBody.\n");

        let mut opts = options(&ws, ImportMode::Full);
        opts.generate_source_nodes = true;
        opts.dry_run = true;
        opts.destination = None;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.total_nodes, 2);
        let source = report
            .nodes
            .iter()
            .find(|n| n.content_type == ContentType::Source)
            .expect("source node");
        let doc = report
            .nodes
            .iter()
            .find(|n| n.content_type == ContentType::Epic)
            .expect("epic node");
        assert_eq!(doc.metadata.derived_from.as_deref(), Some(source.id.as_str()));

        // The provenance link shows up as an explicit relationship.
        assert!(
            report
                .relationships
                .iter()
                .any(|r| r.source_node_id == doc.id && r.target_node_id == source.id)
        );
    }

    #[tokio::test]
    async fn skip_relationships_flag() {
        let ws = workspace();
        write_source(&ws, "a.md", "---\ntags: trust, voting\n---\n# A\nBody.\n");
        write_source(&ws, "b.md", "---\ntags: trust, voting\n---\n# B\nBody.\n");

        let mut opts = options(&ws, ImportMode::Full);
        opts.skip_relationships = true;
        opts.dry_run = true;
        opts.destination = None;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.total_nodes, 2);
        assert!(report.relationships.is_empty());
    }

    #[tokio::test]
    async fn scan_is_sorted_and_filtered() {
        let ws = workspace();
        write_source(&ws, "b.md", "# B\nBody.\n");
        write_source(&ws, "a.md", "# A\nBody.\n");
        write_source(&ws, "notes.txt", "not scanned");

        let mut opts = options(&ws, ImportMode::Full);
        opts.dry_run = true;
        opts.destination = None;
        let report = run(&opts, &SilentProgress).await;

        assert_eq!(report.total_files, 2);
        let paths: Vec<&str> = report
            .file_results
            .iter()
            .map(|r| r.path.as_str())
            .collect();
        assert_eq!(paths, vec!["a.md", "b.md"]);
    }
}
