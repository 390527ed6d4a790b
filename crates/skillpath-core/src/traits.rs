//! Core trait definitions for dataset sources.
//!
//! Loading raw tables is the job of an external collaborator; the
//! `skillpath-data` crate implements this trait for CSV files and in-memory
//! datasets.

use async_trait::async_trait;

use crate::model::Dataset;

/// A provider of raw student, course, interaction and quiz tables.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Human-readable source name (e.g. "csv").
    fn name(&self) -> &str;

    /// Load a complete generation of the raw tables.
    async fn load(&self) -> anyhow::Result<Dataset>;
}
