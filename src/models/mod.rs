// src/models/mod.rs

//! Domain models for the watcher application.

mod config;
mod metadata;
mod report;
mod resource;

// Re-export all public types
pub use config::{
    Config, DetectorConfig, DiffConfig, FetchConfig, PathsConfig, PublishConfig, SourceConfig,
};
pub use metadata::{MetadataStore, ResourceState};
pub use report::{PublishOutcome, RunEvent, RunReport};
pub use resource::{ResourceKind, artifact_stem};
