//! Student similarity index.
//!
//! Pivots the topic performance table into one score vector per student
//! (columns are the distinct topics across all students) and precomputes the
//! pairwise cosine similarity matrix.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::model::TopicPerformance;

/// How a topic the student was never evaluated in enters the similarity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingScorePolicy {
    /// Treat a missing topic as a score of zero.
    #[default]
    ZeroFill,
    /// Compare two students only over topics both were evaluated in.
    CoEvaluated,
}

/// A neighboring student and its similarity to the queried student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub student_id: String,
    pub similarity: f64,
}

/// Cosine similarity of two equal-length vectors.
///
/// Returns 0 when either vector has zero magnitude.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if na > 0.0 && nb > 0.0 {
        (dot / (na * nb)).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Cosine restricted to the dimensions present in both vectors.
fn co_evaluated_cosine(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let (shared_a, shared_b): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .unzip();
    cosine(&shared_a, &shared_b)
}

/// Symmetric student × student similarity matrix.
#[derive(Debug, Clone, Default)]
pub struct SimilarityIndex {
    students: Vec<String>,
    topics: Vec<String>,
    position: HashMap<String, usize>,
    scores: Vec<Vec<Option<f64>>>,
    matrix: Vec<f64>,
    policy: MissingScorePolicy,
}

impl SimilarityIndex {
    /// Build the index from a topic performance table.
    ///
    /// Rows and columns are ordered by ascending student id and topic.
    pub fn build(performances: &[TopicPerformance], policy: MissingScorePolicy) -> Self {
        let students: Vec<String> = performances
            .iter()
            .map(|p| p.student_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let topics: Vec<String> = performances
            .iter()
            .map(|p| p.topic.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let position: HashMap<String, usize> = students
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let topic_position: HashMap<&str, usize> = topics
            .iter()
            .enumerate()
            .map(|(i, t)| (t.as_str(), i))
            .collect();

        let mut scores = vec![vec![None; topics.len()]; students.len()];
        for p in performances {
            let row = position[&p.student_id];
            let col = topic_position[p.topic.as_str()];
            scores[row][col] = Some(p.avg_score);
        }

        let filled: Vec<Vec<f64>> = scores
            .iter()
            .map(|row| row.iter().map(|s| s.unwrap_or(0.0)).collect())
            .collect();

        let n = students.len();
        let mut matrix = vec![0.0; n * n];
        for i in 0..n {
            let has_signal = filled[i].iter().any(|v| *v != 0.0);
            matrix[i * n + i] = if has_signal { 1.0 } else { 0.0 };
            for j in (i + 1)..n {
                let sim = match policy {
                    MissingScorePolicy::ZeroFill => cosine(&filled[i], &filled[j]),
                    MissingScorePolicy::CoEvaluated => {
                        co_evaluated_cosine(&scores[i], &scores[j])
                    }
                };
                matrix[i * n + j] = sim;
                matrix[j * n + i] = sim;
            }
        }

        tracing::debug!(
            students = n,
            topics = topics.len(),
            ?policy,
            "built similarity index"
        );

        Self {
            students,
            topics,
            position,
            scores,
            matrix,
            policy,
        }
    }

    /// Student ids, in row order.
    pub fn students(&self) -> &[String] {
        &self.students
    }

    /// Topics, in column order.
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    pub fn policy(&self) -> MissingScorePolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn contains(&self, student_id: &str) -> bool {
        self.position.contains_key(student_id)
    }

    fn index_of(&self, student_id: &str) -> Result<usize> {
        self.position
            .get(student_id)
            .copied()
            .ok_or_else(|| CoreError::StudentNotFound(student_id.to_string()))
    }

    /// The student's topic-performance vector, aligned with [`Self::topics`].
    /// Missing topics are `None`.
    pub fn vector(&self, student_id: &str) -> Result<&[Option<f64>]> {
        let i = self.index_of(student_id)?;
        Ok(&self.scores[i])
    }

    /// Similarities of one student to every student, aligned with
    /// [`Self::students`].
    pub fn row(&self, student_id: &str) -> Result<&[f64]> {
        let i = self.index_of(student_id)?;
        let n = self.students.len();
        Ok(&self.matrix[i * n..(i + 1) * n])
    }

    /// Similarity between two students.
    pub fn similarity(&self, a: &str, b: &str) -> Result<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        Ok(self.matrix[i * self.students.len() + j])
    }

    /// The `k` most similar other students, by descending similarity with
    /// ties broken by ascending student id.
    pub fn neighbors(&self, student_id: &str, k: usize) -> Result<Vec<Neighbor>> {
        let i = self.index_of(student_id)?;
        let row = self.row(student_id)?;

        let mut candidates: Vec<(usize, f64)> = row
            .iter()
            .copied()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .collect();
        candidates.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.students[a.0].cmp(&self.students[b.0]))
        });

        Ok(candidates
            .into_iter()
            .take(k)
            .map(|(j, similarity)| Neighbor {
                student_id: self.students[j].clone(),
                similarity,
            })
            .collect())
    }
}
