//! libSQL persistence layer for Graphloom knowledge graphs.
//!
//! The [`Store`] struct wraps a libSQL database holding the imported node
//! set, the inferred relationship set, and import run history.
//!
//! **Access rules:**
//! - Import pipeline: read-write (sole writer) via [`Store::open`]
//! - Read-side consumers: read-only via [`Store::open_readonly`]

mod migrations;

use std::path::Path;

use chrono::Utc;
use graphloom_shared::{ContentNode, ContentRelationship, GraphloomError, Result};
use libsql::{Connection, Database, params};
use uuid::Uuid;

/// Counts returned from a batch write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteStats {
    pub nodes_written: u64,
    pub relationships_written: u64,
}

/// Primary storage handle wrapping a libSQL database.
pub struct Store {
    #[allow(dead_code)]
    db: Database,
    conn: Connection,
    readonly: bool,
}

impl Store {
    /// Open or create a database at `path` in read-write mode.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| GraphloomError::io(parent, e))?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        let store = Self {
            db,
            conn,
            readonly: false,
        };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Open a database at `path` in read-only mode.
    pub async fn open_readonly(path: &Path) -> Result<Self> {
        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        let conn = db
            .connect()
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        Ok(Self {
            db,
            conn,
            readonly: true,
        })
    }

    /// Run pending schema migrations.
    async fn run_migrations(&self) -> Result<()> {
        let current_version = self.schema_version().await;

        for migration in migrations::all_migrations() {
            if migration.version > current_version {
                tracing::info!(
                    version = migration.version,
                    description = migration.description,
                    "applying migration"
                );
                self.conn.execute_batch(migration.sql).await.map_err(|e| {
                    GraphloomError::Storage(format!("migration v{} failed: {e}", migration.version))
                })?;
            }
        }
        Ok(())
    }

    /// Get the current schema version, or 0 if no migrations have been applied.
    async fn schema_version(&self) -> u32 {
        let result = self
            .conn
            .query("SELECT MAX(version) FROM schema_migrations", params![])
            .await;

        match result {
            Ok(mut rows) => {
                if let Ok(Some(row)) = rows.next().await {
                    row.get::<u32>(0).unwrap_or(0)
                } else {
                    0
                }
            }
            Err(_) => 0, // Table doesn't exist yet
        }
    }

    /// Ensure we're in read-write mode before writing.
    fn check_writable(&self) -> Result<()> {
        if self.readonly {
            return Err(GraphloomError::Storage(
                "database is opened in read-only mode".into(),
            ));
        }
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Batch writes
    // -----------------------------------------------------------------------

    /// Write a batch of nodes and relationships.
    ///
    /// Nodes upsert by id (callers other than the import pipeline may write
    /// too, so no dedup is assumed). The relationship set is replaced
    /// wholesale: each import run re-derives relationships over the full
    /// merged node set, so stale edges must not survive the write.
    pub async fn write_batch(
        &self,
        nodes: &[ContentNode],
        relationships: &[ContentRelationship],
    ) -> Result<WriteStats> {
        self.check_writable()?;
        let now = Utc::now().to_rfc3339();

        for node in nodes {
            self.upsert_node(node, &now).await?;
        }

        self.conn
            .execute("DELETE FROM relationships", params![])
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        for rel in relationships {
            self.conn
                .execute(
                    "INSERT INTO relationships
                       (id, source_node_id, target_node_id, relationship_type, confidence, inference_source, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                       source_node_id = excluded.source_node_id,
                       target_node_id = excluded.target_node_id,
                       relationship_type = excluded.relationship_type,
                       confidence = excluded.confidence,
                       inference_source = excluded.inference_source,
                       updated_at = excluded.updated_at",
                    params![
                        rel.id.as_str(),
                        rel.source_node_id.as_str(),
                        rel.target_node_id.as_str(),
                        json_string(&rel.relationship_type)?,
                        rel.confidence,
                        json_string(&rel.inference_source)?,
                        now.as_str(),
                    ],
                )
                .await
                .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        }

        Ok(WriteStats {
            nodes_written: nodes.len() as u64,
            relationships_written: relationships.len() as u64,
        })
    }

    /// Upsert a single node by id.
    async fn upsert_node(&self, node: &ContentNode, now: &str) -> Result<()> {
        let tags_json = serde_json::to_string(&node.tags)
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        let related_json = serde_json::to_string(&node.related_node_ids)
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        let metadata_json = serde_json::to_string(&node.metadata)
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        self.conn
            .execute(
                "INSERT INTO nodes
                   (id, content_type, title, description, content, tags_json, related_json, metadata_json, source_path, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                 ON CONFLICT(id) DO UPDATE SET
                   content_type = excluded.content_type,
                   title = excluded.title,
                   description = excluded.description,
                   content = excluded.content,
                   tags_json = excluded.tags_json,
                   related_json = excluded.related_json,
                   metadata_json = excluded.metadata_json,
                   source_path = excluded.source_path,
                   updated_at = excluded.updated_at",
                params![
                    node.id.as_str(),
                    node.content_type.as_str(),
                    node.title.as_str(),
                    node.description.as_str(),
                    node.content.as_str(),
                    tags_json,
                    related_json,
                    metadata_json,
                    node.source_path.as_deref(),
                    now,
                ],
            )
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Load every persisted node, ordered by id.
    pub async fn load_nodes(&self) -> Result<Vec<ContentNode>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, content_type, title, description, content, tags_json, related_json, metadata_json, source_path
                 FROM nodes ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        let mut nodes = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            nodes.push(row_to_node(&row)?);
        }
        Ok(nodes)
    }

    /// Load every persisted relationship, ordered by id.
    pub async fn load_relationships(&self) -> Result<Vec<ContentRelationship>> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, source_node_id, target_node_id, relationship_type, confidence, inference_source
                 FROM relationships ORDER BY id",
                params![],
            )
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;

        let mut relationships = Vec::new();
        while let Ok(Some(row)) = rows.next().await {
            relationships.push(row_to_relationship(&row)?);
        }
        Ok(relationships)
    }

    /// Count persisted nodes.
    pub async fn count_nodes(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM nodes").await
    }

    /// Count persisted relationships.
    pub async fn count_relationships(&self) -> Result<u64> {
        self.count("SELECT COUNT(*) FROM relationships").await
    }

    async fn count(&self, sql: &str) -> Result<u64> {
        let mut rows = self
            .conn
            .query(sql, params![])
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        match rows.next().await {
            Ok(Some(row)) => Ok(row.get::<i64>(0).unwrap_or(0) as u64),
            _ => Ok(0),
        }
    }

    // -----------------------------------------------------------------------
    // Deletions
    // -----------------------------------------------------------------------

    /// Delete nodes by id, cascading to relationships that reference them.
    /// Returns the number of nodes deleted.
    pub async fn delete_nodes(&self, node_ids: &[String]) -> Result<u64> {
        self.check_writable()?;
        let mut deleted = 0u64;
        for id in node_ids {
            self.conn
                .execute(
                    "DELETE FROM relationships WHERE source_node_id = ?1 OR target_node_id = ?1",
                    params![id.as_str()],
                )
                .await
                .map_err(|e| GraphloomError::Storage(e.to_string()))?;
            deleted += self
                .conn
                .execute("DELETE FROM nodes WHERE id = ?1", params![id.as_str()])
                .await
                .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        }
        Ok(deleted)
    }

    // -----------------------------------------------------------------------
    // Import run history
    // -----------------------------------------------------------------------

    /// Record a completed import run. Returns the generated job id.
    pub async fn record_import(
        &self,
        started_at: &str,
        stats_json: &str,
    ) -> Result<String> {
        self.check_writable()?;
        let id = Uuid::now_v7().to_string();
        let now = Utc::now().to_rfc3339();
        self.conn
            .execute(
                "INSERT INTO import_jobs (id, started_at, finished_at, stats_json)
                 VALUES (?1, ?2, ?3, ?4)",
                params![id.as_str(), started_at, now.as_str(), stats_json],
            )
            .await
            .map_err(|e| GraphloomError::Storage(e.to_string()))?;
        Ok(id)
    }
}

/// Serialize a serde enum to its bare string form (no JSON quotes).
fn json_string<T: serde::Serialize>(value: &T) -> Result<String> {
    let json = serde_json::to_value(value).map_err(|e| GraphloomError::Storage(e.to_string()))?;
    json.as_str()
        .map(String::from)
        .ok_or_else(|| GraphloomError::Storage("expected string-serialized enum".into()))
}

/// Deserialize a bare enum string back through serde.
fn from_json_string<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    serde_json::from_value(serde_json::Value::String(raw.to_string()))
        .map_err(|e| GraphloomError::Storage(format!("invalid stored value '{raw}': {e}")))
}

/// Convert a database row to a [`ContentNode`].
fn row_to_node(row: &libsql::Row) -> Result<ContentNode> {
    let get_text = |idx: i32| -> Result<String> {
        row.get::<String>(idx)
            .map_err(|e| GraphloomError::Storage(e.to_string()))
    };

    let tags_json = get_text(5)?;
    let related_json = get_text(6)?;
    let metadata_json = get_text(7)?;

    Ok(ContentNode {
        id: get_text(0)?,
        content_type: from_json_string(&get_text(1)?)?,
        title: get_text(2)?,
        description: get_text(3)?,
        content: get_text(4)?,
        tags: serde_json::from_str(&tags_json)
            .map_err(|e| GraphloomError::Storage(format!("invalid tags_json: {e}")))?,
        related_node_ids: serde_json::from_str(&related_json)
            .map_err(|e| GraphloomError::Storage(format!("invalid related_json: {e}")))?,
        metadata: serde_json::from_str(&metadata_json)
            .map_err(|e| GraphloomError::Storage(format!("invalid metadata_json: {e}")))?,
        source_path: row.get::<String>(8).ok(),
    })
}

/// Convert a database row to a [`ContentRelationship`].
fn row_to_relationship(row: &libsql::Row) -> Result<ContentRelationship> {
    let get_text = |idx: i32| -> Result<String> {
        row.get::<String>(idx)
            .map_err(|e| GraphloomError::Storage(e.to_string()))
    };

    Ok(ContentRelationship {
        id: get_text(0)?,
        source_node_id: get_text(1)?,
        target_node_id: get_text(2)?,
        relationship_type: from_json_string(&get_text(3)?)?,
        confidence: row
            .get::<f64>(4)
            .map_err(|e| GraphloomError::Storage(e.to_string()))?,
        inference_source: from_json_string(&get_text(5)?)?,
    })
}
