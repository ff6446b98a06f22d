use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use super::scale::{display_grade, grade_points};

/// One competency evaluation as supplied by the caller.
///
/// Every field beyond the acquisition list is optional; the normalizer
/// substitutes documented defaults rather than rejecting the record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvaluation {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub coefficient: Option<f64>,
    #[serde(default)]
    pub acquisitions: Vec<RawAcquisition>,
}

impl RawEvaluation {
    pub fn subject_name(&self) -> &str {
        self.subject.as_deref().unwrap_or("Unknown")
    }

    pub fn evaluation_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed")
    }

    /// Coefficient with the documented default of 1, clamped non-negative.
    pub fn weight(&self) -> f64 {
        match self.coefficient {
            Some(value) if value.is_finite() && value >= 0.0 => value,
            Some(value) => {
                warn!(coefficient = value, "invalid coefficient, treating as 0");
                0.0
            }
            None => 1.0,
        }
    }
}

/// One graded sub-component of an evaluation, tagged with zero or more
/// competency domains in a comma-delimited field.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAcquisition {
    #[serde(
        default,
        alias = "abbreviation",
        deserialize_with = "empty_string_as_none"
    )]
    pub grade: Option<String>,
    #[serde(default, alias = "domain", deserialize_with = "empty_string_as_none")]
    pub domains: Option<String>,
}

impl RawAcquisition {
    pub fn grade_code(&self) -> &str {
        self.grade.as_deref().unwrap_or("")
    }

    /// Domain tags split on commas and trimmed, empty segments dropped.
    pub fn domain_tags(&self) -> impl Iterator<Item = &str> {
        self.domains
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }

    pub fn is_untagged(&self) -> bool {
        self.domain_tags().next().is_none()
    }
}

/// Canonical per-evaluation record used for subject-level reporting.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRecord {
    pub subject: String,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub date_display: String,
    pub coefficient: f64,
    pub grades: Vec<String>,
    pub average_points: f64,
}

/// Normalizes a batch of raw evaluations. One degenerate record can never
/// abort the batch: missing fields degrade to defaults and an evaluation
/// with no graded acquisitions contributes an average of 0.
pub fn normalize(evaluations: &[RawEvaluation]) -> Vec<EvaluationRecord> {
    evaluations.iter().map(normalize_evaluation).collect()
}

pub fn normalize_evaluation(raw: &RawEvaluation) -> EvaluationRecord {
    let mut grades = Vec::new();
    let mut points = Vec::new();

    for acquisition in &raw.acquisitions {
        let code = acquisition.grade_code();
        if code.is_empty() {
            continue;
        }
        grades.push(display_grade(code).to_string());
        points.push(grade_points(code));
    }

    let average_points = if points.is_empty() {
        0.0
    } else {
        f64::from(points.iter().map(|p| u32::from(*p)).sum::<u32>()) / points.len() as f64
    };

    let date = raw.date.as_deref().and_then(parse_date);
    let date_display = match (date, raw.date.as_deref()) {
        (Some(parsed), _) => parsed.to_string(),
        (None, Some(text)) => text.trim().to_string(),
        (None, None) => "Unknown".to_string(),
    };

    EvaluationRecord {
        subject: raw.subject_name().to_string(),
        name: raw.evaluation_name().to_string(),
        date,
        date_display,
        coefficient: raw.weight(),
        grades,
        average_points,
    }
}

/// Lenient date parsing: RFC 3339, then a bare datetime, then a bare date.
/// Date-times are truncated to their date. A value that parses as none of
/// these stays textual; it never fails the evaluation.
pub(crate) fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc().date());
    }

    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

pub(crate) fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
