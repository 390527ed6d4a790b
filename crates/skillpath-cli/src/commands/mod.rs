//! Subcommand implementations.

pub mod analytics;
pub mod batch;
pub mod init;
pub mod neighbors;
pub mod profile;
pub mod recommend;
pub mod validate;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use skillpath_core::model::Student;
use skillpath_core::snapshot::Snapshot;
use skillpath_data::config::{create_source, load_config_from, SkillpathConfig};

/// Configuration plus a snapshot built from the configured data source.
pub(crate) struct Loaded {
    pub config: SkillpathConfig,
    pub snapshot: Arc<Snapshot>,
}

impl Loaded {
    /// Look up a student in the Students table.
    pub fn student(&self, student_id: &str) -> Result<&Student> {
        self.snapshot
            .dataset()
            .student(student_id)
            .with_context(|| format!("unknown student: {student_id}"))
    }
}

/// Load config and data, and derive a snapshot.
pub(crate) async fn load(config_path: Option<&Path>) -> Result<Loaded> {
    let config = load_config_from(config_path)?;
    let source = create_source(&config.data)?;
    let dataset = source
        .load()
        .await
        .with_context(|| format!("failed to load dataset from {}", config.data.data_dir.display()))?;
    tracing::debug!(source = source.name(), "dataset loaded");
    let snapshot = Arc::new(Snapshot::build(Arc::new(dataset), &config.engine));
    Ok(Loaded { config, snapshot })
}

/// Reject output formats a command does not support.
pub(crate) fn check_format(format: &str) -> Result<()> {
    match format {
        "text" | "json" => Ok(()),
        other => anyhow::bail!("unknown format '{other}' (expected text or json)"),
    }
}
