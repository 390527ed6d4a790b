//! The `skillpath analytics` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use skillpath_core::aggregate::CompletenessReport;
use skillpath_core::statistics::{evaluate_holdout, topic_popularity, EvaluationSummary, TopicPopularity};

#[derive(Serialize)]
struct Analytics<'a> {
    popularity: Vec<TopicPopularity>,
    completeness: &'a CompletenessReport,
    evaluation: Option<EvaluationSummary>,
}

/// `holdout_limit` of `None` skips the leave-one-out evaluation.
pub async fn execute(
    k: usize,
    holdout_limit: Option<usize>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(k >= 1, "k must be at least 1");
    super::check_format(&format)?;
    let loaded = super::load(config_path.as_deref()).await?;
    let snapshot = &loaded.snapshot;

    let popularity = topic_popularity(snapshot.performances());
    let evaluation = match holdout_limit {
        Some(limit) => {
            let dataset = snapshot.dataset_arc();
            let engine_config = loaded.config.engine.clone();
            // Rebuilds one snapshot per evaluated student.
            let summary = tokio::task::spawn_blocking(move || {
                evaluate_holdout(&dataset, &engine_config, k, Some(limit))
            })
            .await?;
            Some(summary)
        }
        None => None,
    };

    if format == "json" {
        let analytics = Analytics {
            popularity,
            completeness: snapshot.completeness(),
            evaluation,
        };
        println!("{}", serde_json::to_string_pretty(&analytics)?);
        return Ok(());
    }

    println!("Topic popularity");
    if popularity.is_empty() {
        println!("  No enrollments recorded.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Topic", "Enrollments"]);
        for p in &popularity {
            table.add_row(vec![Cell::new(&p.topic), Cell::new(p.enrollments)]);
        }
        println!("{table}");
    }

    let c = snapshot.completeness();
    println!("\nData completeness");
    println!("  Interactions: {}", c.interactions);
    println!("  Joined rows: {}", c.joined_rows);
    println!("  Interactions without a catalog course: {}", c.interactions_without_course);
    println!("  Interactions without a quiz result: {}", c.interactions_without_quiz);
    println!("  Quiz results without an interaction: {}", c.quiz_results_without_interaction);

    println!("\nRecommendation quality (leave-one-out)");
    let Some(evaluation) = evaluation else {
        println!("  Skipped.");
        return Ok(());
    };
    if evaluation.students_evaluated == 0 {
        println!("  No student evaluated (none has two or more interactions, or the limit is 0).");
    } else {
        println!(
            "  Students evaluated: {} of {} eligible",
            evaluation.students_evaluated, evaluation.students_eligible
        );
        println!("  Held-out course recommended: {}", evaluation.hits);
        println!("  Precision@{}: {:.3}", evaluation.k, evaluation.precision_at_k);
        println!("  Recall@{}: {:.3}", evaluation.k, evaluation.recall_at_k);
    }

    Ok(())
}
