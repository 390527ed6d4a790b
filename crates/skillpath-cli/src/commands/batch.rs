//! The `skillpath batch` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use comfy_table::{Cell, Table};

use skillpath_core::batch::{recommend_all, BatchProgress, BatchReport, StudentRecommendations};
use skillpath_core::engine::RecommendationEngine;

/// Console progress reporter.
struct ConsoleProgress;

impl BatchProgress for ConsoleProgress {
    fn on_student_complete(&self, result: &StudentRecommendations) {
        eprintln!(
            "  Done: {} ({} recommendation(s), {} weak topic(s))",
            result.student_id,
            result.recommendations.len(),
            result.weak_topics.len()
        );
    }

    fn on_student_error(&self, student_id: &str, error: &str) {
        eprintln!("  ERROR: {student_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} succeeded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    top_n: Option<usize>,
    parallelism: Option<usize>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let loaded = super::load(config_path.as_deref()).await?;
    let parallelism = parallelism.unwrap_or(loaded.config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let output = output.unwrap_or_else(|| loaded.config.output_dir.clone());
    let top_n = top_n.unwrap_or(loaded.config.engine.default_top_n);

    let student_ids: Vec<String> = loaded
        .snapshot
        .dataset()
        .students
        .iter()
        .map(|s| s.id.clone())
        .collect();

    eprintln!(
        "skillpath v{}: recommending {} courses for {} students",
        env!("CARGO_PKG_VERSION"),
        top_n,
        student_ids.len()
    );
    eprintln!();

    let engine = Arc::new(RecommendationEngine::new(loaded.config.engine.clone()));
    let report = recommend_all(
        engine,
        Arc::clone(&loaded.snapshot),
        &student_ids,
        top_n,
        parallelism,
        &ConsoleProgress,
    )
    .await?;

    print_summary(&report);

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
    let path = output.join(format!("batch-{timestamp}.json"));
    report.save_json(&path)?;
    println!("Results saved to: {}", path.display());

    Ok(())
}

fn print_summary(report: &BatchReport) {
    let mut table = Table::new();
    table.set_header(vec!["Student", "Weak Topics", "Neighbors", "Recommendations"]);
    for r in &report.results {
        let courses: Vec<&str> = r.recommendations.iter().map(|c| c.course_id.as_str()).collect();
        table.add_row(vec![
            Cell::new(&r.student_id),
            Cell::new(r.weak_topics.join(", ")),
            Cell::new(r.neighbors.len()),
            Cell::new(courses.join(", ")),
        ]);
    }
    println!("{table}");
    println!(
        "{} student(s), {} without recommendations, {} failed ({}ms)",
        report.results.len(),
        report.without_recommendations,
        report.failed,
        report.duration_ms
    );
}
