//! The `skillpath validate` command.

use std::path::PathBuf;

use anyhow::Result;

use skillpath_core::validate::validate_dataset;

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let loaded = super::load(config_path.as_deref()).await?;
    let snapshot = &loaded.snapshot;
    let dataset = snapshot.dataset();

    println!(
        "Dataset: {} ({} students, {} courses, {} interactions, {} quiz results)",
        loaded.config.data.data_dir.display(),
        dataset.students.len(),
        dataset.courses.len(),
        dataset.interactions.len(),
        dataset.quiz_results.len(),
    );

    let warnings = validate_dataset(dataset, snapshot.completeness());
    for w in &warnings {
        println!("  [{}] WARNING: {}", w.table, w.message);
    }

    if warnings.is_empty() {
        println!("Dataset valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
