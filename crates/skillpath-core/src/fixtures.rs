//! Shared test fixtures.

use crate::model::{Course, Dataset, Interaction, QuizResult, Student};

pub fn student(id: &str) -> Student {
    Student {
        id: id.into(),
        name: format!("Student {id}"),
        year: "2".into(),
        major: "Mathematics".into(),
    }
}

pub fn course(id: &str, topic: &str, name: &str) -> Course {
    Course {
        id: id.into(),
        topic: topic.into(),
        name: name.into(),
    }
}

pub fn interaction(student_id: &str, course_id: &str, time_spent: f64) -> Interaction {
    Interaction {
        student_id: student_id.into(),
        course_id: course_id.into(),
        time_spent,
    }
}

pub fn quiz(student_id: &str, course_id: &str, score: f64) -> QuizResult {
    QuizResult {
        student_id: student_id.into(),
        course_id: course_id.into(),
        score,
    }
}

/// Target T is weak in Algebra (40 on C1) and has never been quizzed in
/// History; its only neighbor N took C3.
pub fn algebra_history() -> Dataset {
    Dataset {
        students: vec![student("N"), student("T")],
        courses: vec![
            course("C1", "Algebra", "Algebra I"),
            course("C2", "Algebra", "Algebra II"),
            course("C3", "History", "World History"),
        ],
        interactions: vec![
            interaction("T", "C1", 30.0),
            interaction("N", "C3", 40.0),
        ],
        quiz_results: vec![quiz("T", "C1", 40.0), quiz("N", "C3", 80.0)],
    }
}
