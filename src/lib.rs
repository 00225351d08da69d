//! stmbench - Structural topic model workbench
//!
//! Builds a document corpus from a paragraph database, fits a structural
//! topic model through R and renders plots. Every step caches its output
//! in a directory named after the fingerprint of its settings, nested in
//! the directory of the step it depends on.

pub mod artifact;
pub mod cache;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod model;
pub mod plot;
pub mod settings;
pub mod stats;
pub mod ui;
pub mod workbench;

pub use error::{BenchError, BenchResult};
