//! CSV dataset source.
//!
//! Reads the four raw tables from a data directory. Headers follow the
//! platform's export format:
//!
//! - `students.csv`: `student_id,name,year,major`
//! - `courses.csv`: `course_id,topic,course_name`
//! - `interactions.csv`: `student_id,course_id,time_spent`
//! - `quizzes.csv`: `student_id,course_id,score`

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use skillpath_core::model::{Course, Dataset, Interaction, QuizResult, Student};
use skillpath_core::traits::DatasetSource;
use skillpath_core::validate::{is_valid_score, is_valid_time};

use crate::config::DataConfig;
use crate::error::DataError;

#[derive(Debug, Deserialize)]
struct CsvStudent {
    student_id: String,
    name: String,
    year: String,
    major: String,
}

#[derive(Debug, Deserialize)]
struct CsvCourse {
    course_id: String,
    topic: String,
    course_name: String,
}

#[derive(Debug, Deserialize)]
struct CsvInteraction {
    student_id: String,
    course_id: String,
    time_spent: f64,
}

#[derive(Debug, Deserialize)]
struct CsvQuiz {
    student_id: String,
    course_id: String,
    score: f64,
}

/// Read every row of a headed CSV file, rejecting rows that fail `check`.
fn read_rows<T, F>(path: &Path, check: F) -> Result<Vec<T>, DataError>
where
    T: DeserializeOwned,
    F: Fn(&T) -> Result<(), String>,
{
    if !path.exists() {
        return Err(DataError::MissingFile(path.to_path_buf()));
    }

    let csv_error = |line: u64, message: String| DataError::Csv {
        path: path.display().to_string(),
        line,
        message,
    };

    let mut reader = ::csv::ReaderBuilder::new()
        .trim(::csv::Trim::All)
        .from_path(path)
        .map_err(|e| DataError::Io {
            path: path.display().to_string(),
            source: std::io::Error::other(e.to_string()),
        })?;
    let headers = reader
        .headers()
        .map_err(|e| csv_error(1, e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| {
            csv_error(e.position().map(|p| p.line()).unwrap_or(0), e.to_string())
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record
            .deserialize(Some(&headers))
            .map_err(|e| csv_error(line, e.to_string()))?;
        check(&row).map_err(|message| csv_error(line, message))?;
        rows.push(row);
    }
    Ok(rows)
}

fn accept_all<T>(_: &T) -> Result<(), String> {
    Ok(())
}

fn check_interaction(row: &CsvInteraction) -> Result<(), String> {
    if is_valid_time(row.time_spent) {
        Ok(())
    } else {
        Err(format!(
            "time_spent must be a finite, non-negative number, got {}",
            row.time_spent
        ))
    }
}

fn check_quiz(row: &CsvQuiz) -> Result<(), String> {
    if is_valid_score(row.score) {
        Ok(())
    } else {
        Err(format!("score must be between 0 and 100, got {}", row.score))
    }
}

/// Read a complete dataset from the configured directory.
pub fn read_dataset(config: &DataConfig) -> Result<Dataset> {
    let students: Vec<CsvStudent> = read_rows(&config.students_path(), accept_all)
        .context("failed to load students")?;
    let courses: Vec<CsvCourse> =
        read_rows(&config.courses_path(), accept_all).context("failed to load courses")?;
    let interactions: Vec<CsvInteraction> =
        read_rows(&config.interactions_path(), check_interaction)
            .context("failed to load interactions")?;
    let quizzes: Vec<CsvQuiz> = read_rows(&config.quizzes_path(), check_quiz)
        .context("failed to load quiz results")?;

    tracing::debug!(
        students = students.len(),
        courses = courses.len(),
        interactions = interactions.len(),
        quiz_results = quizzes.len(),
        data_dir = %config.data_dir.display(),
        "loaded CSV dataset"
    );

    Ok(Dataset {
        students: students
            .into_iter()
            .map(|s| Student {
                id: s.student_id,
                name: s.name,
                year: s.year,
                major: s.major,
            })
            .collect(),
        courses: courses
            .into_iter()
            .map(|c| Course {
                id: c.course_id,
                topic: c.topic,
                name: c.course_name,
            })
            .collect(),
        interactions: interactions
            .into_iter()
            .map(|i| Interaction {
                student_id: i.student_id,
                course_id: i.course_id,
                time_spent: i.time_spent,
            })
            .collect(),
        quiz_results: quizzes
            .into_iter()
            .map(|q| QuizResult {
                student_id: q.student_id,
                course_id: q.course_id,
                score: q.score,
            })
            .collect(),
    })
}

/// A [`DatasetSource`] backed by CSV files on disk.
#[derive(Debug, Clone)]
pub struct CsvSource {
    config: DataConfig,
}

impl CsvSource {
    pub fn new(config: DataConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }
}

#[async_trait]
impl DatasetSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    async fn load(&self) -> Result<Dataset> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || read_dataset(&config))
            .await
            .context("CSV loading task panicked")?
    }
}
