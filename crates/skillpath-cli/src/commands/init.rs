//! The `skillpath init` command.

use std::path::Path;

use anyhow::{Context, Result};

/// Write `content` to `path` unless the file already exists.
fn create_file(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        println!("{} already exists, skipping.", path.display());
    } else {
        std::fs::write(path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Created {}", path.display());
    }
    Ok(())
}

pub fn execute() -> Result<()> {
    create_file(Path::new("skillpath.toml"), SAMPLE_CONFIG)?;

    std::fs::create_dir_all("data").context("failed to create data directory")?;
    create_file(Path::new("data/students.csv"), SAMPLE_STUDENTS)?;
    create_file(Path::new("data/courses.csv"), SAMPLE_COURSES)?;
    create_file(Path::new("data/interactions.csv"), SAMPLE_INTERACTIONS)?;
    create_file(Path::new("data/quizzes.csv"), SAMPLE_QUIZZES)?;

    println!("\nNext steps:");
    println!("  1. Replace the files in data/ with your platform export");
    println!("  2. Run: skillpath validate");
    println!("  3. Run: skillpath recommend --student S001 --explain");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# skillpath configuration

parallelism = 4
output_dir = "./skillpath-results"

[data]
data_dir = "data"
students_file = "students.csv"
courses_file = "courses.csv"
interactions_file = "interactions.csv"
quizzes_file = "quizzes.csv"

[engine]
default_top_n = 5
neighbor_count = 5
# Set to true to drop courses the student already took from the
# similar-students list.
exclude_taken_from_similar = false
# "zero_fill" or "co_evaluated"
missing_scores = "zero_fill"
high_gap_below = 50.0
medium_gap_below = 70.0
"#;

const SAMPLE_STUDENTS: &str = "student_id,name,year,major
S001,Alice Johnson,1,Computer Science
S002,Brian Lee,2,History
S003,Carla Mendes,3,Biology
S004,David Kim,2,Mathematics
S005,Emma Brown,1,Computer Science
S006,Farah Ali,4,Biology
S007,Grace Park,1,Undeclared
";

const SAMPLE_COURSES: &str = "course_id,topic,course_name
C101,Algebra,Algebra Fundamentals
C102,Algebra,Linear Equations
C103,Algebra,Quadratic Functions
C201,History,World History
C202,History,Modern Europe
C301,Biology,Cell Biology
C302,Biology,Genetics
C401,Programming,Intro to Python
C402,Programming,Data Structures
";

const SAMPLE_INTERACTIONS: &str = "student_id,course_id,time_spent
S001,C101,45
S001,C401,60
S001,C201,20
S002,C201,50
S002,C202,40
S002,C101,25
S003,C301,55
S003,C302,35
S003,C101,30
S004,C101,40
S004,C102,45
S004,C103,50
S004,C401,15
S005,C401,70
S005,C402,65
S005,C101,30
S006,C301,40
S006,C302,45
";

const SAMPLE_QUIZZES: &str = "student_id,course_id,score
S001,C101,42
S001,C401,85
S001,C201,65
S002,C201,88
S002,C202,79
S002,C101,55
S003,C301,91
S003,C302,47
S003,C101,72
S004,C101,95
S004,C102,89
S004,C103,90
S005,C401,58
S005,C402,44
S005,C101,38
S006,C301,83
S006,C302,76
";
