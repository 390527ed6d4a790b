//! In-memory dataset source.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use skillpath_core::model::Dataset;
use skillpath_core::traits::DatasetSource;

/// Serves a fixed dataset, for tests and for callers that already hold the
/// raw tables in memory.
///
/// The dataset can be replaced between loads to simulate a data change.
pub struct StaticSource {
    dataset: Mutex<Dataset>,
    /// Number of loads served.
    call_count: AtomicU32,
}

impl StaticSource {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Mutex::new(dataset),
            call_count: AtomicU32::new(0),
        }
    }

    /// Replace the dataset served by subsequent loads.
    pub fn replace(&self, dataset: Dataset) {
        *self.dataset.lock().unwrap_or_else(|e| e.into_inner()) = dataset;
    }

    /// Get the number of loads served.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DatasetSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn load(&self) -> anyhow::Result<Dataset> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        let dataset = self.dataset.lock().unwrap_or_else(|e| e.into_inner()).clone();
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use skillpath_core::engine::EngineConfig;
    use skillpath_core::model::{Course, Interaction, QuizResult};
    use skillpath_core::snapshot::SnapshotCell;

    use super::*;

    fn dataset(score: f64) -> Dataset {
        Dataset {
            students: vec![],
            courses: vec![Course {
                id: "C1".into(),
                topic: "Algebra".into(),
                name: "Algebra I".into(),
            }],
            interactions: vec![Interaction {
                student_id: "S1".into(),
                course_id: "C1".into(),
                time_spent: 10.0,
            }],
            quiz_results: vec![QuizResult {
                student_id: "S1".into(),
                course_id: "C1".into(),
                score,
            }],
        }
    }

    #[tokio::test]
    async fn serves_and_counts() {
        let source = StaticSource::new(dataset(50.0));
        let loaded = source.load().await.unwrap();
        assert_eq!(loaded.courses.len(), 1);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn refresh_picks_up_replaced_data() {
        let source = StaticSource::new(dataset(30.0));
        let config = EngineConfig::default();
        let cell = SnapshotCell::default();

        let first = cell.refresh(&source, &config).await.unwrap();
        assert!((first.performance_for("S1")[0].avg_score - 30.0).abs() < 1e-9);

        source.replace(dataset(90.0));
        let second = cell.refresh(&source, &config).await.unwrap();
        assert!((second.performance_for("S1")[0].avg_score - 90.0).abs() < 1e-9);
        assert_ne!(first.generation(), second.generation());
        // Handles taken before the refresh still see their own generation.
        assert!((first.performance_for("S1")[0].avg_score - 30.0).abs() < 1e-9);
        assert_eq!(source.call_count(), 2);
    }
}
