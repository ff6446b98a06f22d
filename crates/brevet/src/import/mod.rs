//! CSV import of a flat acquisition export.
//!
//! One row per acquisition: `Subject,Evaluation,Date,Coefficient,Grade,
//! Domains`. Rows sharing subject, evaluation name and date are grouped
//! back into one evaluation, in first-seen order.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::grading::normalizer::empty_string_as_none;
use crate::grading::{RawAcquisition, RawEvaluation};

#[derive(Debug)]
pub enum CsvImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CsvImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CsvImportError::Io(err) => write!(f, "failed to read evaluation export: {}", err),
            CsvImportError::Csv(err) => write!(f, "invalid evaluation CSV data: {}", err),
        }
    }
}

impl std::error::Error for CsvImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CsvImportError::Io(err) => Some(err),
            CsvImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CsvImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CsvImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct ExportRow {
    #[serde(rename = "Subject", default, deserialize_with = "empty_string_as_none")]
    subject: Option<String>,
    #[serde(
        rename = "Evaluation",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    evaluation: Option<String>,
    #[serde(rename = "Date", default, deserialize_with = "empty_string_as_none")]
    date: Option<String>,
    #[serde(
        rename = "Coefficient",
        default,
        deserialize_with = "lenient_coefficient"
    )]
    coefficient: Option<f64>,
    #[serde(rename = "Grade", default, deserialize_with = "empty_string_as_none")]
    grade: Option<String>,
    #[serde(rename = "Domains", default, deserialize_with = "empty_string_as_none")]
    domains: Option<String>,
}

/// A coefficient cell that does not parse as a number degrades to the
/// documented default instead of aborting the whole import.
fn lenient_coefficient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.filter(|value| !value.trim().is_empty()) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<f64>() {
            Ok(coefficient) => Ok(Some(coefficient)),
            Err(_) => {
                warn!(coefficient = %value, "unparsable coefficient cell, using the default");
                Ok(None)
            }
        },
    }
}

pub struct EvaluationCsvImporter;

impl EvaluationCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawEvaluation>, CsvImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<RawEvaluation>, CsvImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut evaluations: Vec<RawEvaluation> = Vec::new();
        let mut index: HashMap<(String, String, String), usize> = HashMap::new();

        for record in csv_reader.deserialize::<ExportRow>() {
            let row = record?;
            let key = (
                row.subject.clone().unwrap_or_default(),
                row.evaluation.clone().unwrap_or_default(),
                row.date.clone().unwrap_or_default(),
            );

            let position = match index.get(&key) {
                Some(position) => *position,
                None => {
                    evaluations.push(RawEvaluation {
                        subject: row.subject.clone(),
                        name: row.evaluation.clone(),
                        date: row.date.clone(),
                        coefficient: row.coefficient,
                        acquisitions: Vec::new(),
                    });
                    index.insert(key, evaluations.len() - 1);
                    evaluations.len() - 1
                }
            };

            evaluations[position].acquisitions.push(RawAcquisition {
                grade: row.grade,
                domains: row.domains,
            });
        }

        Ok(evaluations)
    }
}
