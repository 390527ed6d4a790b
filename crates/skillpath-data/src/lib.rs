//! skillpath-data: Dataset sources and configuration.
//!
//! Implements the `DatasetSource` trait for CSV exports and in-memory
//! datasets, and loads the `skillpath.toml` configuration.

pub mod config;
pub mod csv;
pub mod error;
pub mod mock;

pub use config::{create_source, load_config, DataConfig, SkillpathConfig};
pub use error::DataError;
