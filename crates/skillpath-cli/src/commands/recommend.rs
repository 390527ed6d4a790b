//! The `skillpath recommend` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use skillpath_core::engine::{Explanation, RecommendationEngine};

pub async fn execute(
    student_id: String,
    top_n: Option<usize>,
    explain: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    super::check_format(&format)?;
    let loaded = super::load(config_path.as_deref()).await?;
    let student = loaded.student(&student_id)?;

    let engine = RecommendationEngine::new(loaded.config.engine.clone());
    let top_n = top_n.unwrap_or(engine.config().default_top_n);
    let explanation = engine.explain(&loaded.snapshot, &student_id, top_n);

    if format == "json" {
        let json = if explain {
            serde_json::to_string_pretty(&explanation)?
        } else {
            serde_json::to_string_pretty(&explanation.recommendations)?
        };
        println!("{json}");
        return Ok(());
    }

    println!("Recommendations for {} ({})", student.name, student.id);
    if explain {
        print_explanation(&explanation);
    }

    if explanation.recommendations.is_empty() {
        println!("No recommendations available.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Course", "Name", "Topic", "Reason"]);
    for (i, rec) in explanation.recommendations.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rec.course_id),
            Cell::new(&rec.course_name),
            Cell::new(&rec.topic),
            Cell::new(rec.reason.description()),
        ]);
    }
    println!("{table}");

    Ok(())
}

fn print_explanation(explanation: &Explanation) {
    let list = |items: &[String]| {
        if items.is_empty() {
            "none".to_string()
        } else {
            items.join(", ")
        }
    };

    println!("  Taken: {}", list(&explanation.taken));
    println!("  Weak topics: {}", list(&explanation.weak_topics));
    if explanation.neighbors.is_empty() {
        println!("  Similar students: none");
    } else {
        let neighbors: Vec<String> = explanation
            .neighbors
            .iter()
            .map(|n| format!("{} ({:.3})", n.student_id, n.similarity))
            .collect();
        println!("  Similar students: {}", neighbors.join(", "));
    }
    println!(
        "  Candidates: {} from weak topics, {} from similar students",
        explanation.rule_candidates, explanation.similar_candidates
    );
}
