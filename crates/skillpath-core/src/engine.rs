//! Hybrid recommendation engine.
//!
//! Rule-based recommendations (untaken courses in the student's weak topics)
//! always come first, followed by courses taken by the student's nearest
//! neighbors. The combined list is deduplicated by course id and truncated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::{Reason, RecommendationRecord, SkillGapThresholds};
use crate::similarity::{MissingScorePolicy, Neighbor};
use crate::snapshot::Snapshot;

/// Configuration for snapshot derivation and the recommendation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recommendations returned when the caller does not ask for a count.
    pub default_top_n: usize,
    /// Neighbors consulted for collaborative filtering.
    pub neighbor_count: usize,
    /// Drop neighbor courses the student already took.
    pub exclude_taken_from_similar: bool,
    /// Treatment of unevaluated topics in the similarity index.
    pub missing_scores: MissingScorePolicy,
    /// Average scores below this are a High skill gap.
    pub high_gap_below: f64,
    /// Average scores below this (and not High) are a Medium skill gap.
    pub medium_gap_below: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let thresholds = SkillGapThresholds::default();
        Self {
            default_top_n: 5,
            neighbor_count: 5,
            exclude_taken_from_similar: false,
            missing_scores: MissingScorePolicy::ZeroFill,
            high_gap_below: thresholds.high_below,
            medium_gap_below: thresholds.medium_below,
        }
    }
}

impl EngineConfig {
    pub fn thresholds(&self) -> SkillGapThresholds {
        SkillGapThresholds {
            high_below: self.high_gap_below,
            medium_below: self.medium_gap_below,
        }
    }

    /// Reject configurations the engine cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.neighbor_count == 0 {
            return Err(CoreError::InvalidConfig(
                "neighbor_count must be at least 1".into(),
            ));
        }
        if !self.high_gap_below.is_finite() || !self.medium_gap_below.is_finite() {
            return Err(CoreError::InvalidConfig(
                "skill gap thresholds must be finite".into(),
            ));
        }
        if self.high_gap_below > self.medium_gap_below {
            return Err(CoreError::InvalidConfig(format!(
                "high_gap_below ({}) must not exceed medium_gap_below ({})",
                self.high_gap_below, self.medium_gap_below
            )));
        }
        Ok(())
    }
}

/// A recommendation list together with the intermediate sets behind it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explanation {
    pub student_id: String,
    /// Courses the student has interacted with.
    pub taken: Vec<String>,
    /// Topics with a High or Medium skill gap.
    pub weak_topics: Vec<String>,
    /// Neighbors consulted, empty when the student has no performance data.
    pub neighbors: Vec<Neighbor>,
    /// Rule-based candidates before deduplication.
    pub rule_candidates: usize,
    /// Neighbor candidates before deduplication.
    pub similar_candidates: usize,
    pub recommendations: Vec<RecommendationRecord>,
}

/// The hybrid recommendation engine.
#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    config: EngineConfig,
}

impl RecommendationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recommend up to `top_n` courses for a student.
    ///
    /// An empty list means there is nothing to recommend.
    pub fn recommend(
        &self,
        snapshot: &Snapshot,
        student_id: &str,
        top_n: usize,
    ) -> Vec<RecommendationRecord> {
        self.explain(snapshot, student_id, top_n).recommendations
    }

    /// [`Self::recommend`] with the configured default count.
    pub fn recommend_default(
        &self,
        snapshot: &Snapshot,
        student_id: &str,
    ) -> Vec<RecommendationRecord> {
        self.recommend(snapshot, student_id, self.config.default_top_n)
    }

    /// Recommend and keep the intermediate sets.
    pub fn explain(&self, snapshot: &Snapshot, student_id: &str, top_n: usize) -> Explanation {
        let dataset = snapshot.dataset();
        let courses = dataset.course_index();

        let taken: Vec<&str> = dataset.courses_taken_by(student_id);
        let taken_set: HashSet<&str> = taken.iter().copied().collect();
        let weak_topics: Vec<&str> = snapshot.weak_topics(student_id);

        let rule_recs: Vec<RecommendationRecord> = dataset
            .courses
            .iter()
            .filter(|c| weak_topics.contains(&c.topic.as_str()))
            .filter(|c| !taken_set.contains(c.id.as_str()))
            .map(|c| RecommendationRecord::from_course(c, Reason::WeakTopic))
            .collect();

        let neighbors = match snapshot
            .similarity()
            .neighbors(student_id, self.config.neighbor_count)
        {
            Ok(neighbors) => neighbors,
            Err(e) => {
                tracing::debug!("no neighbors for {student_id}: {e}");
                Vec::new()
            }
        };
        let neighbor_ids: HashSet<&str> =
            neighbors.iter().map(|n| n.student_id.as_str()).collect();

        let similar_recs: Vec<RecommendationRecord> = dataset
            .interactions
            .iter()
            .filter(|i| neighbor_ids.contains(i.student_id.as_str()))
            .filter(|i| {
                !(self.config.exclude_taken_from_similar
                    && taken_set.contains(i.course_id.as_str()))
            })
            .filter_map(|i| courses.get(i.course_id.as_str()))
            .map(|c| RecommendationRecord::from_course(c, Reason::SimilarStudents))
            .collect();

        let rule_candidates = rule_recs.len();
        let similar_candidates = similar_recs.len();

        let mut seen: HashSet<String> = HashSet::new();
        let recommendations: Vec<RecommendationRecord> = rule_recs
            .into_iter()
            .chain(similar_recs)
            .filter(|r| seen.insert(r.course_id.clone()))
            .take(top_n)
            .collect();

        tracing::debug!(
            student_id,
            rule_candidates,
            similar_candidates,
            returned = recommendations.len(),
            "recommendations computed"
        );

        Explanation {
            student_id: student_id.to_string(),
            taken: taken.into_iter().map(String::from).collect(),
            weak_topics: weak_topics.into_iter().map(String::from).collect(),
            neighbors,
            rule_candidates,
            similar_candidates,
            recommendations,
        }
    }
}
