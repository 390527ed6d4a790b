//! Platform analytics and offline recommendation quality metrics.
//!
//! Precision@k and Recall@k are measured with a leave-one-out protocol: each
//! student's most recent interaction is hidden, the snapshot is rebuilt
//! without it, and the hidden course is the single relevant item.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::{EngineConfig, RecommendationEngine};
use crate::model::{Dataset, RecommendationRecord, TopicPerformance};
use crate::snapshot::Snapshot;

/// Number of joined interaction/quiz rows recorded in a topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPopularity {
    pub topic: String,
    pub enrollments: usize,
}

/// Topics ordered by enrollments descending, ties by topic name.
pub fn topic_popularity(performances: &[TopicPerformance]) -> Vec<TopicPopularity> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for p in performances {
        *counts.entry(p.topic.as_str()).or_default() += p.samples;
    }

    let mut popularity: Vec<TopicPopularity> = counts
        .into_iter()
        .map(|(topic, enrollments)| TopicPopularity {
            topic: topic.to_string(),
            enrollments,
        })
        .collect();
    // Stable sort keeps the BTreeMap's alphabetical order among ties.
    popularity.sort_by(|a, b| b.enrollments.cmp(&a.enrollments));
    popularity
}

/// Fraction of the first `k` recommendations that are relevant.
pub fn precision_at_k(recommended: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = recommended
        .iter()
        .take(k)
        .filter(|id| relevant.contains(*id))
        .count();
    hits as f64 / k as f64
}

/// Fraction of the relevant items found in the first `k` recommendations.
pub fn recall_at_k(recommended: &[&str], relevant: &HashSet<&str>, k: usize) -> f64 {
    if relevant.is_empty() {
        return 0.0;
    }
    let hits = recommended
        .iter()
        .take(k)
        .filter(|id| relevant.contains(*id))
        .count();
    hits as f64 / relevant.len() as f64
}

/// Mean leave-one-out metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub k: usize,
    /// Students with at least two interactions.
    pub students_eligible: usize,
    /// Eligible students actually scored, at most the requested limit.
    pub students_evaluated: usize,
    /// Students whose held-out course was recommended.
    pub hits: usize,
    pub precision_at_k: f64,
    pub recall_at_k: f64,
}

/// Run the leave-one-out evaluation over students with two or more
/// interactions, in ascending id order, stopping after `limit` students.
///
/// Every evaluated student costs a full snapshot rebuild, which is quadratic
/// in the number of students, so an unlimited run is cubic.
pub fn evaluate_holdout(
    dataset: &Dataset,
    config: &EngineConfig,
    k: usize,
    limit: Option<usize>,
) -> EvaluationSummary {
    let mut last_interaction: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for (i, interaction) in dataset.interactions.iter().enumerate() {
        let entry = last_interaction
            .entry(interaction.student_id.as_str())
            .or_insert((0, i));
        entry.0 += 1;
        entry.1 = i;
    }

    let engine = RecommendationEngine::new(config.clone());
    let mut evaluated = 0usize;
    let mut hits = 0usize;
    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;

    let eligible: Vec<(&str, usize)> = last_interaction
        .into_iter()
        .filter(|(_, (count, _))| *count >= 2)
        .map(|(student_id, (_, held_index))| (student_id, held_index))
        .collect();
    let students_eligible = eligible.len();

    for (student_id, held_index) in eligible.into_iter().take(limit.unwrap_or(usize::MAX)) {
        let held = &dataset.interactions[held_index];

        let mut reduced = dataset.clone();
        reduced.interactions.remove(held_index);
        reduced
            .quiz_results
            .retain(|q| !(q.student_id == held.student_id && q.course_id == held.course_id));

        let snapshot = Snapshot::build(Arc::new(reduced), config);
        let recs: Vec<RecommendationRecord> = engine.recommend(&snapshot, student_id, k);
        let recommended: Vec<&str> = recs.iter().map(|r| r.course_id.as_str()).collect();
        let relevant: HashSet<&str> = HashSet::from([held.course_id.as_str()]);

        let precision = precision_at_k(&recommended, &relevant, k);
        let recall = recall_at_k(&recommended, &relevant, k);
        if recall > 0.0 {
            hits += 1;
        }
        precision_sum += precision;
        recall_sum += recall;
        evaluated += 1;
    }

    let mean = |sum: f64| {
        if evaluated == 0 {
            0.0
        } else {
            sum / evaluated as f64
        }
    };

    tracing::info!(
        k,
        eligible = students_eligible,
        students = evaluated,
        hits,
        "leave-one-out evaluation complete"
    );

    EvaluationSummary {
        k,
        students_eligible,
        students_evaluated: evaluated,
        hits,
        precision_at_k: mean(precision_sum),
        recall_at_k: mean(recall_sum),
    }
}
