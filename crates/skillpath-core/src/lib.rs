//! skillpath-core: Skill-gap aggregation, similarity indexing and the
//! hybrid course recommendation engine.
//!
//! This crate defines the data model, the derivation stages that turn raw
//! interaction and quiz records into per-topic performance and student
//! similarity, and the engine that combines both into recommendations.

pub mod aggregate;
pub mod batch;
pub mod engine;
pub mod error;
pub mod model;
pub mod similarity;
pub mod snapshot;
pub mod statistics;
pub mod traits;
pub mod validate;

#[cfg(test)]
pub(crate) mod fixtures;
