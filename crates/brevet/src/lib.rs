//! Brevet grading core.
//!
//! Turns raw Pronote competency evaluations into Brevet statistics:
//! per-subject weighted averages, per-domain mastery tiers, a side
//! channel for untagged acquisitions and the 400-point socle aggregate.

pub mod config;
pub mod grading;
pub mod import;

pub use grading::{analyze, GradeAnalysis, RawEvaluation};
pub use import::{CsvImportError, EvaluationCsvImporter};
