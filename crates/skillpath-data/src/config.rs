//! skillpath configuration and source factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use skillpath_core::engine::EngineConfig;
use skillpath_core::traits::DatasetSource;

use crate::csv::CsvSource;

/// Where the raw tables live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding the CSV files.
    pub data_dir: PathBuf,
    pub students_file: String,
    pub courses_file: String,
    pub interactions_file: String,
    pub quizzes_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            students_file: "students.csv".into(),
            courses_file: "courses.csv".into(),
            interactions_file: "interactions.csv".into(),
            quizzes_file: "quizzes.csv".into(),
        }
    }
}

impl DataConfig {
    pub fn students_path(&self) -> PathBuf {
        self.data_dir.join(&self.students_file)
    }

    pub fn courses_path(&self) -> PathBuf {
        self.data_dir.join(&self.courses_file)
    }

    pub fn interactions_path(&self) -> PathBuf {
        self.data_dir.join(&self.interactions_file)
    }

    pub fn quizzes_path(&self) -> PathBuf {
        self.data_dir.join(&self.quizzes_file)
    }
}

/// Top-level skillpath configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillpathConfig {
    /// Max concurrent recommendation tasks in batch runs.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for batch reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./skillpath-results")
}

impl Default for SkillpathConfig {
    fn default() -> Self {
        Self {
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
            data: DataConfig::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl SkillpathConfig {
    /// Check value ranges after loading.
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.parallelism >= 1, "parallelism must be at least 1");
        self.engine.validate()?;
        Ok(())
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + end];
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `skillpath.toml` in the current directory
/// 2. `~/.config/skillpath/config.toml`
///
/// Environment variable override: `SKILLPATH_DATA_DIR`.
pub fn load_config() -> Result<SkillpathConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<SkillpathConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("skillpath.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            toml::from_str::<SkillpathConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => SkillpathConfig::default(),
    };

    if let Ok(dir) = std::env::var("SKILLPATH_DATA_DIR") {
        config.data.data_dir = PathBuf::from(dir);
    }

    config.data.data_dir = resolve_path(&config.data.data_dir);
    config.output_dir = resolve_path(&config.output_dir);

    config.validate()?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("skillpath"))
}

/// Create the dataset source for a data configuration.
pub fn create_source(config: &DataConfig) -> Result<Box<dyn DatasetSource>> {
    if !config.data_dir.is_dir() {
        anyhow::bail!(
            "data directory not found: {} (run `skillpath init` to create a sample dataset)",
            config.data_dir.display()
        );
    }
    Ok(Box::new(CsvSource::new(config.clone())))
}

#[cfg(test)]
mod tests {
    use skillpath_core::similarity::MissingScorePolicy;

    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_SKILLPATH_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_SKILLPATH_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_SKILLPATH_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_vars"), "no_vars");
        std::env::remove_var("_SKILLPATH_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_rescan_values() {
        std::env::set_var("_SKILLPATH_SELF_REF", "${_SKILLPATH_SELF_REF}");
        assert_eq!(
            resolve_env_vars("/data/${_SKILLPATH_SELF_REF}/x"),
            "/data/${_SKILLPATH_SELF_REF}/x"
        );
        std::env::remove_var("_SKILLPATH_SELF_REF");

        assert_eq!(resolve_env_vars("${_SKILLPATH_UNSET_VAR}tail"), "tail");
        assert_eq!(resolve_env_vars("open ${brace"), "open ${brace");
    }

    #[test]
    fn default_config() {
        let config = SkillpathConfig::default();
        assert_eq!(config.parallelism, 4);
        assert_eq!(config.engine.default_top_n, 5);
        assert_eq!(config.engine.neighbor_count, 5);
        assert_eq!(config.data.students_path(), PathBuf::from("data/students.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_full_config() {
        let toml_str = r#"
parallelism = 8
output_dir = "out"

[data]
data_dir = "/srv/lms"
quizzes_file = "quiz_scores.csv"

[engine]
default_top_n = 10
neighbor_count = 3
exclude_taken_from_similar = true
missing_scores = "co_evaluated"
high_gap_below = 40.0
"#;
        let config: SkillpathConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.data.quizzes_path(), PathBuf::from("/srv/lms/quiz_scores.csv"));
        assert_eq!(config.data.students_file, "students.csv");
        assert_eq!(config.engine.default_top_n, 10);
        assert!(config.engine.exclude_taken_from_similar);
        assert_eq!(config.engine.missing_scores, MissingScorePolicy::CoEvaluated);
        assert_eq!(config.engine.high_gap_below, 40.0);
        assert_eq!(config.engine.medium_gap_below, 70.0);
    }

    #[test]
    fn explicit_missing_path_fails() {
        let err = load_config_from(Some(Path::new("/nonexistent/skillpath.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn invalid_engine_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skillpath.toml");
        std::fs::write(&path, "[engine]\nneighbor_count = 0\n").unwrap();
        let err = load_config_from(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("neighbor_count"));
    }

    #[test]
    fn create_source_requires_data_dir() {
        let config = DataConfig {
            data_dir: PathBuf::from("/nonexistent/skillpath-data"),
            ..Default::default()
        };
        let err = create_source(&config).err().unwrap();
        assert!(err.to_string().contains("skillpath init"));

        let dir = tempfile::tempdir().unwrap();
        let config = DataConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert_eq!(create_source(&config).unwrap().name(), "csv");
    }
}
