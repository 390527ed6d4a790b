//! Dataset consistency checks.
//!
//! None of these conditions stop the engine from running; they explain why
//! some rows contribute nothing to the derived tables.

use std::collections::HashSet;

use crate::aggregate::CompletenessReport;
use crate::model::Dataset;

/// A warning from dataset validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The table the warning concerns.
    pub table: &'static str,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn new(table: &'static str, message: impl Into<String>) -> Self {
        Self {
            table,
            message: message.into(),
        }
    }
}

/// Quiz scores are finite and on the 0-100 scale.
pub fn is_valid_score(score: f64) -> bool {
    score.is_finite() && (0.0..=100.0).contains(&score)
}

/// Time spent is finite and non-negative.
pub fn is_valid_time(time_spent: f64) -> bool {
    time_spent.is_finite() && time_spent >= 0.0
}

/// Validate a dataset for common issues.
pub fn validate_dataset(dataset: &Dataset, completeness: &CompletenessReport) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate keys
    let mut seen_students = HashSet::new();
    for student in &dataset.students {
        if !seen_students.insert(student.id.as_str()) {
            warnings.push(ValidationWarning::new(
                "students",
                format!("duplicate student ID: {}", student.id),
            ));
        }
    }
    let mut seen_courses = HashSet::new();
    for course in &dataset.courses {
        if !seen_courses.insert(course.id.as_str()) {
            warnings.push(ValidationWarning::new(
                "courses",
                format!("duplicate course ID: {}", course.id),
            ));
        }
    }

    // Dangling references
    for interaction in &dataset.interactions {
        if !seen_students.contains(interaction.student_id.as_str()) {
            warnings.push(ValidationWarning::new(
                "interactions",
                format!("unknown student: {}", interaction.student_id),
            ));
        }
        if !seen_courses.contains(interaction.course_id.as_str()) {
            warnings.push(ValidationWarning::new(
                "interactions",
                format!("unknown course: {}", interaction.course_id),
            ));
        }
    }
    for quiz in &dataset.quiz_results {
        if !seen_students.contains(quiz.student_id.as_str()) {
            warnings.push(ValidationWarning::new(
                "quizzes",
                format!("unknown student: {}", quiz.student_id),
            ));
        }
        if !seen_courses.contains(quiz.course_id.as_str()) {
            warnings.push(ValidationWarning::new(
                "quizzes",
                format!("unknown course: {}", quiz.course_id),
            ));
        }
    }

    // Value ranges
    for interaction in &dataset.interactions {
        if !is_valid_time(interaction.time_spent) {
            warnings.push(ValidationWarning::new(
                "interactions",
                format!(
                    "invalid time_spent {} for {} / {}",
                    interaction.time_spent, interaction.student_id, interaction.course_id
                ),
            ));
        }
    }
    for quiz in &dataset.quiz_results {
        if !is_valid_score(quiz.score) {
            warnings.push(ValidationWarning::new(
                "quizzes",
                format!(
                    "score {} outside 0-100 for {} / {}",
                    quiz.score, quiz.student_id, quiz.course_id
                ),
            ));
        }
    }

    // Repeated interactions are averaged as separate rows.
    let mut seen_pairs = HashSet::new();
    for interaction in &dataset.interactions {
        if !seen_pairs.insert((interaction.student_id.as_str(), interaction.course_id.as_str())) {
            warnings.push(ValidationWarning::new(
                "interactions",
                format!(
                    "repeated interaction: {} / {}",
                    interaction.student_id, interaction.course_id
                ),
            ));
        }
    }

    // Join completeness
    if completeness.interactions_without_course > 0 {
        warnings.push(ValidationWarning::new(
            "interactions",
            format!(
                "{} interaction(s) reference a course missing from the catalog",
                completeness.interactions_without_course
            ),
        ));
    }
    if completeness.interactions_without_quiz > 0 {
        warnings.push(ValidationWarning::new(
            "interactions",
            format!(
                "{} interaction(s) without a quiz result",
                completeness.interactions_without_quiz
            ),
        ));
    }
    if completeness.quiz_results_without_interaction > 0 {
        warnings.push(ValidationWarning::new(
            "quizzes",
            format!(
                "{} quiz result(s) without a matching interaction",
                completeness.quiz_results_without_interaction
            ),
        ));
    }

    warnings
}
