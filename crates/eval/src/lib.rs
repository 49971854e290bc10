//! `sificc-eval` — Compton reconstruction evaluation engine.
//!
//! Compares reconstructed Compton candidates against simulated truth events
//! under a tolerance policy and accumulates accuracy statistics. The engine
//! itself is pure; `source` holds the CSV-backed readers for both inputs.

pub mod aggregate;
pub mod config;
pub mod engine;
pub mod error;
pub mod index;
pub mod matcher;
pub mod model;
pub mod source;

pub use config::{EvalConfig, ToleranceConfig};
pub use engine::run;
pub use error::EvalError;
pub use model::{AggregateStats, EvalReport, ReconTable, TruthEvent};
pub use source::{CsvTruthSource, MemoryTruthSource, TruthSource};
