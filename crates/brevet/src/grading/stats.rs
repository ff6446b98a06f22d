use std::collections::BTreeMap;

use serde::Serialize;

use super::domains::{DomainScore, SocleDomain};
use super::normalizer::EvaluationRecord;

/// Factor converting the 0-50 acquisition point scale to a mark out of 20.
/// Applied exactly once, at the final reporting stage.
pub const OUT_OF_TWENTY_FACTOR: f64 = 0.4;

/// Weighted average of one subject's evaluations.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectAverage {
    pub subject: String,
    pub average_points: f64,
    pub average_out_of_20: f64,
}

/// Per-subject weighted means: sum(coefficient x average) / sum(coefficient),
/// 0 when a subject's total coefficient is 0. Sorted by subject name.
pub fn subject_averages(records: &[EvaluationRecord]) -> Vec<SubjectAverage> {
    let mut totals: BTreeMap<&str, (f64, f64)> = BTreeMap::new();

    for record in records {
        let entry = totals.entry(record.subject.as_str()).or_insert((0.0, 0.0));
        entry.0 += record.average_points * record.coefficient;
        entry.1 += record.coefficient;
    }

    totals
        .into_iter()
        .map(|(subject, (points, coefficients))| {
            let average = if coefficients > 0.0 {
                points / coefficients
            } else {
                0.0
            };
            SubjectAverage {
                subject: subject.to_string(),
                average_points: average,
                average_out_of_20: average * OUT_OF_TWENTY_FACTOR,
            }
        })
        .collect()
}

/// Qualitative reading of the 400-point aggregate. Boundaries belong to the
/// higher tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Outstanding,
    Excellent,
    Good,
    Satisfactory,
    Pass,
    BelowPass,
}

impl PerformanceTier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Outstanding => "Outstanding",
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Satisfactory => "Satisfactory",
            Self::Pass => "Pass",
            Self::BelowPass => "Below pass",
        }
    }

    /// Brevet mention the tier corresponds to, for rendering.
    pub const fn mention(self) -> Option<&'static str> {
        match self {
            Self::Outstanding | Self::Excellent => Some("Mention Tres Bien possible"),
            Self::Good => Some("Mention Bien possible"),
            Self::Satisfactory => Some("Mention Assez Bien possible"),
            Self::Pass | Self::BelowPass => None,
        }
    }

    pub fn for_total(total: f64) -> Self {
        if total >= 360.0 {
            Self::Outstanding
        } else if total >= 320.0 {
            Self::Excellent
        } else if total >= 280.0 {
            Self::Good
        } else if total >= 240.0 {
            Self::Satisfactory
        } else if total >= 200.0 {
            Self::Pass
        } else {
            Self::BelowPass
        }
    }
}

/// Aggregate over the eight canonical socle domains.
#[derive(Debug, Clone, Serialize)]
pub struct SocleAggregate {
    /// Sum of the snapped tier scores of the canonical domains (0-400).
    pub total: u16,
    /// total / 8, whether or not all eight domains were observed.
    pub average_per_domain: f64,
    pub average_out_of_20: f64,
    pub tier: PerformanceTier,
    pub tier_label: &'static str,
}

/// Sums the snapped tier scores of exactly the canonical domain set.
/// Non-canonical tags present in the map are ignored here (they stay
/// visible in the per-domain breakdown).
pub fn socle_aggregate(domain_scores: &BTreeMap<String, DomainScore>) -> SocleAggregate {
    let total: u16 = SocleDomain::ordered()
        .into_iter()
        .filter_map(|domain| domain_scores.get(domain.tag()))
        .map(DomainScore::tier_points)
        .sum();

    let average_per_domain = f64::from(total) / 8.0;
    let tier = PerformanceTier::for_total(f64::from(total));

    SocleAggregate {
        total,
        average_per_domain,
        average_out_of_20: average_per_domain * OUT_OF_TWENTY_FACTOR,
        tier,
        tier_label: tier.label(),
    }
}
