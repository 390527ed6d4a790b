//! Core data model types for skillpath.
//!
//! Raw reference and event records supplied by a dataset source, plus the
//! derived and output records the engine produces.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A student enrolled on the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Unique student identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Year of study, as recorded by the institution.
    pub year: String,
    /// Declared major.
    pub major: String,
}

/// A course in the catalog. Every course belongs to exactly one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Topic label (e.g. "Algebra").
    pub topic: String,
    /// Human-readable course name.
    pub name: String,
}

/// A student's engagement with a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
    pub student_id: String,
    pub course_id: String,
    /// Time spent on the course, in the unit of the source data.
    pub time_spent: f64,
}

/// A quiz outcome for a student-course pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizResult {
    pub student_id: String,
    pub course_id: String,
    /// Score on a 0-100 scale.
    pub score: f64,
}

/// One generation of raw tables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub students: Vec<Student>,
    pub courses: Vec<Course>,
    pub interactions: Vec<Interaction>,
    pub quiz_results: Vec<QuizResult>,
}

impl Dataset {
    /// Look up a student by id.
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Look up a course by id.
    pub fn course(&self, id: &str) -> Option<&Course> {
        self.courses.iter().find(|c| c.id == id)
    }

    /// Index the catalog by course id. The first occurrence of a duplicated
    /// id wins.
    pub fn course_index(&self) -> HashMap<&str, &Course> {
        let mut index = HashMap::with_capacity(self.courses.len());
        for course in &self.courses {
            index.entry(course.id.as_str()).or_insert(course);
        }
        index
    }

    /// Course ids the student has interacted with, in interaction order.
    pub fn courses_taken_by<'a>(&'a self, student_id: &str) -> Vec<&'a str> {
        self.interactions
            .iter()
            .filter(|i| i.student_id == student_id)
            .map(|i| i.course_id.as_str())
            .collect()
    }
}

/// Score boundaries for skill-gap classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillGapThresholds {
    /// Scores strictly below this are a High gap.
    pub high_below: f64,
    /// Scores strictly below this (and not High) are a Medium gap.
    pub medium_below: f64,
}

impl Default for SkillGapThresholds {
    fn default() -> Self {
        Self {
            high_below: 50.0,
            medium_below: 70.0,
        }
    }
}

/// Discrete mastery classification of a student in a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkillGap {
    High,
    Medium,
    Low,
}

impl SkillGap {
    /// Classify an average score.
    pub fn classify(score: f64, thresholds: &SkillGapThresholds) -> Self {
        if score < thresholds.high_below {
            SkillGap::High
        } else if score < thresholds.medium_below {
            SkillGap::Medium
        } else {
            SkillGap::Low
        }
    }

    /// A topic is weak unless the gap is Low.
    pub fn is_weak(self) -> bool {
        !matches!(self, SkillGap::Low)
    }
}

impl fmt::Display for SkillGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillGap::High => write!(f, "High"),
            SkillGap::Medium => write!(f, "Medium"),
            SkillGap::Low => write!(f, "Low"),
        }
    }
}

impl FromStr for SkillGap {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(SkillGap::High),
            "medium" => Ok(SkillGap::Medium),
            "low" => Ok(SkillGap::Low),
            other => Err(format!("unknown skill gap: {other}")),
        }
    }
}

/// Per-(student, topic) performance summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicPerformance {
    pub student_id: String,
    pub topic: String,
    /// Mean time spent over the joined rows.
    pub avg_time: f64,
    /// Mean quiz score over the joined rows.
    pub avg_score: f64,
    pub skill_gap: SkillGap,
    /// Number of joined interaction/quiz rows behind the averages.
    pub samples: usize,
}

/// Why a course was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// The course covers a topic where the student has a High or Medium gap.
    WeakTopic,
    /// The course was taken by one of the student's nearest neighbors.
    SimilarStudents,
}

impl Reason {
    /// Sentence shown to the student.
    pub fn description(self) -> &'static str {
        match self {
            Reason::WeakTopic => "Low quiz score in this topic",
            Reason::SimilarStudents => "Recommended based on similar students",
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::WeakTopic => write!(f, "weak_topic"),
            Reason::SimilarStudents => write!(f, "similar_students"),
        }
    }
}

/// A single recommended course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    pub course_id: String,
    pub course_name: String,
    pub topic: String,
    pub reason: Reason,
}

impl RecommendationRecord {
    pub fn from_course(course: &Course, reason: Reason) -> Self {
        Self {
            course_id: course.id.clone(),
            course_name: course.name.clone(),
            topic: course.topic.clone(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_gap_boundaries() {
        let t = SkillGapThresholds::default();
        assert_eq!(SkillGap::classify(0.0, &t), SkillGap::High);
        assert_eq!(SkillGap::classify(49.0, &t), SkillGap::High);
        assert_eq!(SkillGap::classify(49.999, &t), SkillGap::High);
        assert_eq!(SkillGap::classify(50.0, &t), SkillGap::Medium);
        assert_eq!(SkillGap::classify(69.0, &t), SkillGap::Medium);
        assert_eq!(SkillGap::classify(70.0, &t), SkillGap::Low);
        assert_eq!(SkillGap::classify(100.0, &t), SkillGap::Low);
    }

    #[test]
    fn skill_gap_custom_thresholds() {
        let t = SkillGapThresholds {
            high_below: 40.0,
            medium_below: 80.0,
        };
        assert_eq!(SkillGap::classify(45.0, &t), SkillGap::Medium);
        assert_eq!(SkillGap::classify(75.0, &t), SkillGap::Medium);
        assert_eq!(SkillGap::classify(80.0, &t), SkillGap::Low);
    }

    #[test]
    fn weak_tiers() {
        assert!(SkillGap::High.is_weak());
        assert!(SkillGap::Medium.is_weak());
        assert!(!SkillGap::Low.is_weak());
    }

    #[test]
    fn skill_gap_display_and_parse() {
        assert_eq!(SkillGap::Medium.to_string(), "Medium");
        assert_eq!("high".parse::<SkillGap>().unwrap(), SkillGap::High);
        assert_eq!("LOW".parse::<SkillGap>().unwrap(), SkillGap::Low);
        assert!("severe".parse::<SkillGap>().is_err());
    }

    #[test]
    fn reason_serializes_snake_case() {
        let json = serde_json::to_string(&Reason::SimilarStudents).unwrap();
        assert_eq!(json, "\"similar_students\"");
        assert_eq!(Reason::WeakTopic.to_string(), "weak_topic");
    }

    #[test]
    fn course_index_keeps_first_duplicate() {
        let dataset = Dataset {
            courses: vec![
                Course {
                    id: "C1".into(),
                    topic: "Algebra".into(),
                    name: "First".into(),
                },
                Course {
                    id: "C1".into(),
                    topic: "Algebra".into(),
                    name: "Second".into(),
                },
            ],
            ..Default::default()
        };
        assert_eq!(dataset.course_index()["C1"].name, "First");
    }
}
