//! SQL migration definitions for the Graphloom database.
//!
//! Migrations are applied in order on database open. Each migration has a
//! version number and a set of SQL statements executed within a transaction.

/// A database migration with a version and SQL statements.
pub(crate) struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// All migrations, in ascending version order.
pub(crate) fn all_migrations() -> Vec<Migration> {
    vec![Migration {
        version: 1,
        description: "Initial schema: nodes, relationships, import_jobs",
        sql: r#"
-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_migrations (
    version   INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Content nodes (id is the upsert key)
CREATE TABLE IF NOT EXISTS nodes (
    id            TEXT PRIMARY KEY,
    content_type  TEXT NOT NULL,
    title         TEXT NOT NULL,
    description   TEXT NOT NULL DEFAULT '',
    content       TEXT NOT NULL DEFAULT '',
    tags_json     TEXT NOT NULL DEFAULT '[]',
    related_json  TEXT NOT NULL DEFAULT '[]',
    metadata_json TEXT NOT NULL DEFAULT '{}',
    source_path   TEXT,
    updated_at    TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_nodes_source_path ON nodes(source_path);
CREATE INDEX IF NOT EXISTS idx_nodes_content_type ON nodes(content_type);

-- Inferred relationships between nodes
CREATE TABLE IF NOT EXISTS relationships (
    id                TEXT PRIMARY KEY,
    source_node_id    TEXT NOT NULL,
    target_node_id    TEXT NOT NULL,
    relationship_type TEXT NOT NULL,
    confidence        REAL NOT NULL,
    inference_source  TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_relationships_source ON relationships(source_node_id);
CREATE INDEX IF NOT EXISTS idx_relationships_target ON relationships(target_node_id);

-- Import run history
CREATE TABLE IF NOT EXISTS import_jobs (
    id          TEXT PRIMARY KEY,
    started_at  TEXT NOT NULL,
    finished_at TEXT,
    stats_json  TEXT
);

INSERT INTO schema_migrations (version) VALUES (1);
"#,
    }]
}
