//! Immutable derived snapshots and atomic rebuild-and-swap.
//!
//! A [`Snapshot`] ties one generation of raw tables to the performance table
//! and similarity index derived from it. Snapshots are never mutated; when
//! the raw data changes a new snapshot is built in full and swapped into a
//! [`SnapshotCell`].

use std::collections::HashMap;
use std::ops::Range;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{aggregate, CompletenessReport};
use crate::engine::EngineConfig;
use crate::model::{Dataset, TopicPerformance};
use crate::similarity::SimilarityIndex;
use crate::traits::DatasetSource;

/// A consistent derived view over one generation of raw data.
#[derive(Debug, Clone)]
pub struct Snapshot {
    generation: Uuid,
    built_at: DateTime<Utc>,
    dataset: Arc<Dataset>,
    performances: Vec<TopicPerformance>,
    by_student: HashMap<String, Range<usize>>,
    similarity: SimilarityIndex,
    completeness: CompletenessReport,
}

/// Counts describing a snapshot, for display and reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotSummary {
    pub generation: Uuid,
    pub built_at: DateTime<Utc>,
    pub students: usize,
    pub courses: usize,
    pub interactions: usize,
    pub quiz_results: usize,
    pub performance_records: usize,
    pub indexed_students: usize,
    pub topics: usize,
    pub completeness: CompletenessReport,
}

impl Snapshot {
    /// Derive the performance table and similarity index from a dataset.
    pub fn build(dataset: Arc<Dataset>, config: &EngineConfig) -> Self {
        let aggregation = aggregate(&dataset, &config.thresholds());
        let similarity = SimilarityIndex::build(&aggregation.performances, config.missing_scores);

        // Performances are sorted by student, so each student's records are
        // one contiguous range.
        let mut by_student: HashMap<String, Range<usize>> = HashMap::new();
        for (i, p) in aggregation.performances.iter().enumerate() {
            by_student
                .entry(p.student_id.clone())
                .and_modify(|r| r.end = i + 1)
                .or_insert(i..i + 1);
        }

        let snapshot = Self {
            generation: Uuid::new_v4(),
            built_at: Utc::now(),
            dataset,
            performances: aggregation.performances,
            by_student,
            similarity,
            completeness: aggregation.completeness,
        };

        tracing::info!(
            generation = %snapshot.generation,
            students = snapshot.dataset.students.len(),
            performance_records = snapshot.performances.len(),
            indexed_students = snapshot.similarity.len(),
            "snapshot built"
        );

        snapshot
    }

    /// A snapshot over an empty dataset.
    pub fn empty() -> Self {
        Self::build(Arc::new(Dataset::default()), &EngineConfig::default())
    }

    /// Identifier of the raw-data generation this snapshot was built from.
    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Shared handle to the raw tables.
    pub fn dataset_arc(&self) -> Arc<Dataset> {
        Arc::clone(&self.dataset)
    }

    /// The full topic performance table, ordered by student then topic.
    pub fn performances(&self) -> &[TopicPerformance] {
        &self.performances
    }

    /// One student's topic performance records.
    pub fn performance_for(&self, student_id: &str) -> &[TopicPerformance] {
        match self.by_student.get(student_id) {
            Some(range) => &self.performances[range.clone()],
            None => &[],
        }
    }

    /// Topics where the student's skill gap is High or Medium.
    pub fn weak_topics(&self, student_id: &str) -> Vec<&str> {
        self.performance_for(student_id)
            .iter()
            .filter(|p| p.skill_gap.is_weak())
            .map(|p| p.topic.as_str())
            .collect()
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }

    pub fn completeness(&self) -> &CompletenessReport {
        &self.completeness
    }

    pub fn summary(&self) -> SnapshotSummary {
        SnapshotSummary {
            generation: self.generation,
            built_at: self.built_at,
            students: self.dataset.students.len(),
            courses: self.dataset.courses.len(),
            interactions: self.dataset.interactions.len(),
            quiz_results: self.dataset.quiz_results.len(),
            performance_records: self.performances.len(),
            indexed_students: self.similarity.len(),
            topics: self.similarity.topics().len(),
            completeness: self.completeness.clone(),
        }
    }
}

/// Holder of the current snapshot.
///
/// Readers take an `Arc<Snapshot>` and keep using it for as long as they
/// need; a rebuild never disturbs a snapshot that is already handed out.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<Snapshot>>,
}

impl SnapshotCell {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(|e| e.into_inner());
        Arc::clone(&*guard)
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn swap(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        self.install(Arc::new(snapshot))
    }

    fn install(&self, next: Arc<Snapshot>) -> Arc<Snapshot> {
        let mut guard = self.current.write().unwrap_or_else(|e| e.into_inner());
        std::mem::replace(&mut *guard, next)
    }

    /// Build a new snapshot from `dataset` and swap it in.
    pub fn rebuild(&self, dataset: Arc<Dataset>, config: &EngineConfig) -> Arc<Snapshot> {
        // Built before taking the write lock; readers keep the old snapshot
        // until the swap.
        let next = Arc::new(Snapshot::build(dataset, config));
        self.install(Arc::clone(&next));
        next
    }

    /// Load a fresh dataset from `source`, rebuild and swap.
    ///
    /// On a load failure the current snapshot is left in place.
    pub async fn refresh(
        &self,
        source: &dyn DatasetSource,
        config: &EngineConfig,
    ) -> anyhow::Result<Arc<Snapshot>> {
        let dataset = source.load().await?;
        tracing::info!(source = source.name(), "refreshing snapshot");
        Ok(self.rebuild(Arc::new(dataset), config))
    }
}

impl Default for SnapshotCell {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::fixtures::{algebra_history, course, interaction, quiz};
    use crate::model::SkillGap;

    struct FailingSource;

    #[async_trait]
    impl DatasetSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn load(&self) -> anyhow::Result<Dataset> {
            anyhow::bail!("source unavailable")
        }
    }

    struct FixedSource(Dataset);

    #[async_trait]
    impl DatasetSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn load(&self) -> anyhow::Result<Dataset> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn performance_lookup_by_student() {
        let snapshot = Snapshot::build(Arc::new(algebra_history()), &EngineConfig::default());
        let t = snapshot.performance_for("T");
        assert_eq!(t.len(), 1);
        assert_eq!(t[0].topic, "Algebra");
        assert_eq!(t[0].skill_gap, SkillGap::High);
        assert_eq!(snapshot.weak_topics("T"), vec!["Algebra"]);
        assert!(snapshot.weak_topics("N").is_empty());
        assert!(snapshot.performance_for("nobody").is_empty());
    }

    #[test]
    fn summary_counts() {
        let snapshot = Snapshot::build(Arc::new(algebra_history()), &EngineConfig::default());
        let summary = snapshot.summary();
        assert_eq!(summary.students, 2);
        assert_eq!(summary.courses, 3);
        assert_eq!(summary.performance_records, 2);
        assert_eq!(summary.indexed_students, 2);
        assert_eq!(summary.topics, 2);
        assert_eq!(summary.generation, snapshot.generation());
    }

    #[test]
    fn rebuild_swaps_whole_snapshot() {
        let cell = SnapshotCell::default();
        let before = cell.current();
        assert!(before.similarity().is_empty());

        let after = cell.rebuild(Arc::new(algebra_history()), &EngineConfig::default());
        assert_ne!(before.generation(), after.generation());
        assert_eq!(cell.current().generation(), after.generation());
        // The old handle is untouched.
        assert!(before.performances().is_empty());
        assert_eq!(after.performances().len(), after.summary().performance_records);
    }

    #[test]
    fn swap_returns_previous() {
        let first = Snapshot::empty();
        let first_generation = first.generation();
        let cell = SnapshotCell::new(first);
        let previous = cell.swap(Snapshot::empty());
        assert_eq!(previous.generation(), first_generation);
    }

    #[tokio::test]
    async fn refresh_from_source() {
        let cell = SnapshotCell::default();
        let dataset = Dataset {
            courses: vec![course("C1", "Algebra", "Algebra I")],
            interactions: vec![interaction("S1", "C1", 3.0)],
            quiz_results: vec![quiz("S1", "C1", 88.0)],
            ..Default::default()
        };
        let snapshot = cell
            .refresh(&FixedSource(dataset), &EngineConfig::default())
            .await
            .unwrap();
        assert_eq!(snapshot.performance_for("S1")[0].skill_gap, SkillGap::Low);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_current_snapshot() {
        let cell = SnapshotCell::new(Snapshot::build(
            Arc::new(algebra_history()),
            &EngineConfig::default(),
        ));
        let generation = cell.current().generation();
        let result = cell.refresh(&FailingSource, &EngineConfig::default()).await;
        assert!(result.is_err());
        assert_eq!(cell.current().generation(), generation);
    }

    #[test]
    fn snapshot_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Snapshot>();
        assert_send_sync::<SnapshotCell>();
    }
}
