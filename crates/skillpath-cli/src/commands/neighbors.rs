//! The `skillpath neighbors` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

pub async fn execute(student_id: String, k: Option<usize>, config_path: Option<PathBuf>) -> Result<()> {
    let loaded = super::load(config_path.as_deref()).await?;
    let student = loaded.student(&student_id)?;
    let k = k.unwrap_or(loaded.config.engine.neighbor_count);

    let index = loaded.snapshot.similarity();
    if !index.contains(&student_id) {
        println!(
            "{} ({}) has no quiz results yet; no similar students.",
            student.name, student.id
        );
        return Ok(());
    }

    let neighbors = index.neighbors(&student_id, k)?;
    println!(
        "Students most similar to {} ({}), {} topics compared",
        student.name,
        student.id,
        index.topics().len()
    );

    let dataset = loaded.snapshot.dataset();
    let mut table = Table::new();
    table.set_header(vec!["Student", "Name", "Similarity"]);
    for n in &neighbors {
        let name = dataset
            .student(&n.student_id)
            .map(|s| s.name.as_str())
            .unwrap_or("-");
        table.add_row(vec![
            Cell::new(&n.student_id),
            Cell::new(name),
            Cell::new(format!("{:.3}", n.similarity)),
        ]);
    }
    println!("{table}");

    Ok(())
}
