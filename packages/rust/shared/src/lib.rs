//! Shared types, error model, and configuration for Graphloom.
//!
//! This crate is the foundation depended on by all other Graphloom crates.
//! It provides:
//! - [`GraphloomError`], the unified error type
//! - Domain types ([`ContentNode`], [`ContentRelationship`], [`NodeMetadata`])
//! - Configuration ([`AppConfig`], [`ImportOptions`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, ImportMode, ImportOptions, ScanConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{GraphloomError, Result};
pub use types::{
    ContentNode, ContentRelationship, ContentType, InferenceSource, NodeMetadata,
    RelationshipType,
};
