//! The `skillpath profile` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use skillpath_core::model::{Student, TopicPerformance};

/// A topic row with the student's share of total learning time.
#[derive(Serialize)]
struct TopicRow<'a> {
    #[serde(flatten)]
    performance: &'a TopicPerformance,
    effort_share: f64,
}

#[derive(Serialize)]
struct Profile<'a> {
    student: &'a Student,
    topics: Vec<TopicRow<'a>>,
}

/// Each topic's average time as a fraction of the sum over topics.
fn effort_shares(performances: &[TopicPerformance]) -> Vec<f64> {
    let total: f64 = performances.iter().map(|p| p.avg_time).sum();
    performances
        .iter()
        .map(|p| if total > 0.0 { p.avg_time / total } else { 0.0 })
        .collect()
}

pub async fn execute(student_id: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    super::check_format(&format)?;
    let loaded = super::load(config_path.as_deref()).await?;
    let student = loaded.student(&student_id)?;
    let performances = loaded.snapshot.performance_for(&student_id);
    let shares = effort_shares(performances);

    if format == "json" {
        let profile = Profile {
            student,
            topics: performances
                .iter()
                .zip(&shares)
                .map(|(performance, &effort_share)| TopicRow {
                    performance,
                    effort_share,
                })
                .collect(),
        };
        println!("{}", serde_json::to_string_pretty(&profile)?);
        return Ok(());
    }

    println!("{} ({})", student.name, student.id);
    println!("  Year: {}", student.year);
    println!("  Major: {}", student.major);

    if performances.is_empty() {
        println!("\nNo performance data for this student yet.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Topic",
        "Avg Score",
        "Avg Time",
        "Skill Gap",
        "Effort",
    ]);
    for (p, share) in performances.iter().zip(&shares) {
        table.add_row(vec![
            Cell::new(&p.topic),
            Cell::new(format!("{:.1}", p.avg_score)),
            Cell::new(format!("{:.1}", p.avg_time)),
            Cell::new(p.skill_gap.to_string()),
            Cell::new(format!("{:.1}%", share * 100.0)),
        ]);
    }
    println!("\n{table}");

    Ok(())
}
