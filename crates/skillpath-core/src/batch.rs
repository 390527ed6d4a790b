//! Concurrent recommendation runs over a whole student population.
//!
//! Every student is served from the same snapshot, so the report is a
//! consistent picture of one data generation.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::engine::RecommendationEngine;
use crate::model::RecommendationRecord;
use crate::snapshot::Snapshot;

/// Recommendations for one student within a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentRecommendations {
    pub student_id: String,
    pub weak_topics: Vec<String>,
    /// Ids of the neighbors consulted.
    pub neighbors: Vec<String>,
    pub recommendations: Vec<RecommendationRecord>,
}

/// Result of a batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Generation of the snapshot every result was computed from.
    pub snapshot_generation: Uuid,
    pub top_n: usize,
    /// Per-student results, ordered by student id.
    pub results: Vec<StudentRecommendations>,
    /// Students for whom nothing could be recommended.
    pub without_recommendations: usize,
    /// Students whose computation failed.
    pub failed: usize,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BatchReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Look up one student's results.
    pub fn for_student(&self, student_id: &str) -> Option<&StudentRecommendations> {
        self.results.iter().find(|r| r.student_id == student_id)
    }
}

/// Progress reporting trait.
pub trait BatchProgress: Send + Sync {
    fn on_student_complete(&self, result: &StudentRecommendations);
    fn on_student_error(&self, student_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopProgress;

impl BatchProgress for NoopProgress {
    fn on_student_complete(&self, _: &StudentRecommendations) {}
    fn on_student_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

/// Recommend `top_n` courses for every listed student, at most
/// `parallelism` at a time.
pub async fn recommend_all(
    engine: Arc<RecommendationEngine>,
    snapshot: Arc<Snapshot>,
    student_ids: &[String],
    top_n: usize,
    parallelism: usize,
    progress: &dyn BatchProgress,
) -> Result<BatchReport> {
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");

    let start = Instant::now();
    let semaphore = Arc::new(Semaphore::new(parallelism));
    let mut futures = FuturesUnordered::new();

    for student_id in student_ids {
        let engine = Arc::clone(&engine);
        let snapshot = Arc::clone(&snapshot);
        let semaphore = Arc::clone(&semaphore);
        let student_id = student_id.clone();

        futures.push(async move {
            let ctx_student_id = student_id.clone();
            let inner = async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                let explanation = tokio::task::spawn_blocking(move || {
                    engine.explain(&snapshot, &student_id, top_n)
                })
                .await
                .context("recommendation task panicked")?;

                Ok::<_, anyhow::Error>(StudentRecommendations {
                    student_id: explanation.student_id,
                    weak_topics: explanation.weak_topics,
                    neighbors: explanation
                        .neighbors
                        .into_iter()
                        .map(|n| n.student_id)
                        .collect(),
                    recommendations: explanation.recommendations,
                })
            };
            (ctx_student_id, inner.await)
        });
    }

    let total = futures.len();
    let mut results = Vec::with_capacity(total);
    let mut failed = 0usize;

    while let Some((student_id, result)) = futures.next().await {
        match result {
            Ok(r) => {
                progress.on_student_complete(&r);
                results.push(r);
            }
            Err(e) => {
                tracing::error!("recommendation failed for {student_id}: {e:#}");
                progress.on_student_error(&student_id, &e.to_string());
                failed += 1;
            }
        }
    }

    let elapsed = start.elapsed();
    progress.on_batch_complete(total, results.len(), failed, elapsed);

    results.sort_by(|a, b| a.student_id.cmp(&b.student_id));
    let without_recommendations = results
        .iter()
        .filter(|r| r.recommendations.is_empty())
        .count();

    Ok(BatchReport {
        id: Uuid::new_v4(),
        created_at: Utc::now(),
        snapshot_generation: snapshot.generation(),
        top_n,
        results,
        without_recommendations,
        failed,
        duration_ms: elapsed.as_millis() as u64,
    })
}
