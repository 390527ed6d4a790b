//! Per-(student, topic) performance aggregation.
//!
//! Inner-joins interactions with the course catalog and then with quiz
//! results on (student, course), groups the joined rows by (student, topic)
//! and classifies each group's average score into a skill-gap tier.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::model::{Dataset, SkillGap, SkillGapThresholds, TopicPerformance};

/// Counts of rows the aggregation joins dropped.
///
/// Dropped rows are not an error, but they mean the performance table does
/// not reflect every recorded interaction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// Interaction rows in the input.
    pub interactions: usize,
    /// Rows surviving both joins.
    pub joined_rows: usize,
    /// Interactions whose course id is not in the catalog.
    pub interactions_without_course: usize,
    /// Interactions with a known course but no quiz result for the pair.
    pub interactions_without_quiz: usize,
    /// Quiz results with no matching interaction on a known course.
    pub quiz_results_without_interaction: usize,
}

impl CompletenessReport {
    /// Returns `true` if no row was dropped by either join.
    pub fn is_complete(&self) -> bool {
        self.interactions_without_course == 0
            && self.interactions_without_quiz == 0
            && self.quiz_results_without_interaction == 0
    }

    /// Total rows from any table that contributed nothing.
    pub fn unmatched_rows(&self) -> usize {
        self.interactions_without_course
            + self.interactions_without_quiz
            + self.quiz_results_without_interaction
    }
}

/// Output of [`aggregate`].
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// One record per (student, topic), ordered by student id then topic.
    pub performances: Vec<TopicPerformance>,
    pub completeness: CompletenessReport,
}

#[derive(Default)]
struct Accumulator {
    time_sum: f64,
    score_sum: f64,
    samples: usize,
}

/// Build the topic performance table for a dataset.
pub fn aggregate(dataset: &Dataset, thresholds: &SkillGapThresholds) -> Aggregation {
    let courses = dataset.course_index();

    let mut quiz_scores: HashMap<(&str, &str), Vec<f64>> = HashMap::new();
    for quiz in &dataset.quiz_results {
        quiz_scores
            .entry((quiz.student_id.as_str(), quiz.course_id.as_str()))
            .or_default()
            .push(quiz.score);
    }

    let mut completeness = CompletenessReport {
        interactions: dataset.interactions.len(),
        ..Default::default()
    };
    let mut matched_pairs: HashSet<(&str, &str)> = HashSet::new();
    let mut groups: BTreeMap<(&str, &str), Accumulator> = BTreeMap::new();

    for interaction in &dataset.interactions {
        let Some(course) = courses.get(interaction.course_id.as_str()) else {
            completeness.interactions_without_course += 1;
            continue;
        };
        let key = (
            interaction.student_id.as_str(),
            interaction.course_id.as_str(),
        );
        let Some(scores) = quiz_scores.get(&key) else {
            completeness.interactions_without_quiz += 1;
            continue;
        };
        matched_pairs.insert(key);

        // Every quiz row for the pair joins with this interaction.
        let acc = groups
            .entry((interaction.student_id.as_str(), course.topic.as_str()))
            .or_default();
        for score in scores {
            acc.time_sum += interaction.time_spent;
            acc.score_sum += score;
            acc.samples += 1;
        }
        completeness.joined_rows += scores.len();
    }

    completeness.quiz_results_without_interaction = dataset
        .quiz_results
        .iter()
        .filter(|q| !matched_pairs.contains(&(q.student_id.as_str(), q.course_id.as_str())))
        .count();

    let performances: Vec<TopicPerformance> = groups
        .into_iter()
        .map(|((student_id, topic), acc)| {
            let n = acc.samples as f64;
            let avg_score = acc.score_sum / n;
            TopicPerformance {
                student_id: student_id.to_string(),
                topic: topic.to_string(),
                avg_time: acc.time_sum / n,
                avg_score,
                skill_gap: SkillGap::classify(avg_score, thresholds),
                samples: acc.samples,
            }
        })
        .collect();

    if !completeness.is_complete() {
        tracing::warn!(
            without_course = completeness.interactions_without_course,
            without_quiz = completeness.interactions_without_quiz,
            orphan_quizzes = completeness.quiz_results_without_interaction,
            "aggregation dropped unmatched rows"
        );
    }
    tracing::debug!(
        joined_rows = completeness.joined_rows,
        records = performances.len(),
        "aggregated topic performance"
    );

    Aggregation {
        performances,
        completeness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{course, interaction, quiz};

    fn thresholds() -> SkillGapThresholds {
        SkillGapThresholds::default()
    }

    #[test]
    fn averages_per_student_and_topic() {
        let dataset = Dataset {
            courses: vec![
                course("C1", "Algebra", "Algebra I"),
                course("C2", "Algebra", "Algebra II"),
                course("C3", "History", "World History"),
            ],
            interactions: vec![
                interaction("S1", "C1", 10.0),
                interaction("S1", "C2", 30.0),
                interaction("S1", "C3", 5.0),
            ],
            quiz_results: vec![quiz("S1", "C1", 40.0), quiz("S1", "C2", 60.0), quiz("S1", "C3", 90.0)],
            ..Default::default()
        };

        let agg = aggregate(&dataset, &thresholds());
        assert_eq!(agg.performances.len(), 2);

        let algebra = &agg.performances[0];
        assert_eq!(algebra.topic, "Algebra");
        assert!((algebra.avg_score - 50.0).abs() < 1e-9);
        assert!((algebra.avg_time - 20.0).abs() < 1e-9);
        assert_eq!(algebra.skill_gap, SkillGap::Medium);
        assert_eq!(algebra.samples, 2);

        let history = &agg.performances[1];
        assert_eq!(history.topic, "History");
        assert_eq!(history.skill_gap, SkillGap::Low);
        assert!(agg.completeness.is_complete());
        assert_eq!(agg.completeness.joined_rows, 3);
    }

    #[test]
    fn output_is_ordered_by_student_then_topic() {
        let dataset = Dataset {
            courses: vec![course("C1", "Zoology", "Z"), course("C2", "Art", "A")],
            interactions: vec![
                interaction("S2", "C1", 1.0),
                interaction("S1", "C1", 1.0),
                interaction("S1", "C2", 1.0),
            ],
            quiz_results: vec![quiz("S2", "C1", 10.0), quiz("S1", "C1", 10.0), quiz("S1", "C2", 10.0)],
            ..Default::default()
        };
        let keys: Vec<(String, String)> = aggregate(&dataset, &thresholds())
            .performances
            .into_iter()
            .map(|p| (p.student_id, p.topic))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("S1".to_string(), "Art".to_string()),
                ("S1".to_string(), "Zoology".to_string()),
                ("S2".to_string(), "Zoology".to_string()),
            ]
        );
    }

    #[test]
    fn unmatched_rows_are_dropped_and_counted() {
        let dataset = Dataset {
            courses: vec![course("C1", "Algebra", "Algebra I")],
            interactions: vec![
                interaction("S1", "C1", 10.0),
                interaction("S1", "C9", 10.0),
                interaction("S2", "C1", 10.0),
            ],
            quiz_results: vec![quiz("S1", "C1", 80.0), quiz("S3", "C1", 20.0)],
            ..Default::default()
        };

        let agg = aggregate(&dataset, &thresholds());
        assert_eq!(agg.performances.len(), 1);
        assert_eq!(agg.performances[0].student_id, "S1");

        let report = &agg.completeness;
        assert_eq!(report.interactions, 3);
        assert_eq!(report.joined_rows, 1);
        assert_eq!(report.interactions_without_course, 1);
        assert_eq!(report.interactions_without_quiz, 1);
        assert_eq!(report.quiz_results_without_interaction, 1);
        assert_eq!(report.unmatched_rows(), 3);
        assert!(!report.is_complete());
    }

    #[test]
    fn repeated_quiz_attempts_multiply_joined_rows() {
        let dataset = Dataset {
            courses: vec![course("C1", "Algebra", "Algebra I")],
            interactions: vec![interaction("S1", "C1", 12.0)],
            quiz_results: vec![quiz("S1", "C1", 30.0), quiz("S1", "C1", 90.0)],
            ..Default::default()
        };
        let agg = aggregate(&dataset, &thresholds());
        let perf = &agg.performances[0];
        assert_eq!(perf.samples, 2);
        assert!((perf.avg_score - 60.0).abs() < 1e-9);
        assert!((perf.avg_time - 12.0).abs() < 1e-9);
        assert_eq!(agg.completeness.joined_rows, 2);
    }

    #[test]
    fn empty_dataset_yields_empty_table() {
        let agg = aggregate(&Dataset::default(), &thresholds());
        assert!(agg.performances.is_empty());
        assert!(agg.completeness.is_complete());
    }
}
