//! skillpath CLI: the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "skillpath",
    version,
    about = "Personalized course recommendations from skill gaps and similar students"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend courses for a student
    Recommend {
        /// Student ID
        #[arg(long)]
        student: String,

        /// Number of recommendations (default: engine.default_top_n)
        #[arg(long)]
        top_n: Option<usize>,

        /// Show weak topics and neighbors behind the list
        #[arg(long)]
        explain: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a student's profile and topic performance
    Profile {
        /// Student ID
        #[arg(long)]
        student: String,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the students most similar to a student
    Neighbors {
        /// Student ID
        #[arg(long)]
        student: String,

        /// Number of neighbors (default: engine.neighbor_count)
        #[arg(long)]
        k: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Platform analytics and offline recommendation quality
    Analytics {
        /// Cutoff for Precision@k and Recall@k
        #[arg(long, default_value = "5")]
        k: usize,

        /// Max students in the leave-one-out evaluation (each one rebuilds the snapshot)
        #[arg(long, default_value = "200")]
        holdout_limit: usize,

        /// Skip the leave-one-out evaluation
        #[arg(long)]
        no_eval: bool,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check the dataset for duplicate keys and dangling references
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Recommend for every student and save a JSON report
    Batch {
        /// Number of recommendations per student (default: engine.default_top_n)
        #[arg(long)]
        top_n: Option<usize>,

        /// Max concurrent students (default: config parallelism)
        #[arg(long)]
        parallelism: Option<usize>,

        /// Output directory (default: config output_dir)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and a sample dataset
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("skillpath=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Recommend {
            student,
            top_n,
            explain,
            format,
            config,
        } => commands::recommend::execute(student, top_n, explain, format, config).await,
        Commands::Profile {
            student,
            format,
            config,
        } => commands::profile::execute(student, format, config).await,
        Commands::Neighbors { student, k, config } => {
            commands::neighbors::execute(student, k, config).await
        }
        Commands::Analytics {
            k,
            holdout_limit,
            no_eval,
            format,
            config,
        } => {
            let holdout_limit = (!no_eval).then_some(holdout_limit);
            commands::analytics::execute(k, holdout_limit, format, config).await
        }
        Commands::Validate { config } => commands::validate::execute(config).await,
        Commands::Batch {
            top_n,
            parallelism,
            output,
            config,
        } => commands::batch::execute(top_n, parallelism, output, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
