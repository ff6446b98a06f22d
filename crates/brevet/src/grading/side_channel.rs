use serde::Serialize;

use super::normalizer::RawEvaluation;
use super::scale::{display_grade, grade_points, MasteryTier};

/// One untagged acquisition recorded for the designated side subject.
#[derive(Debug, Clone, Serialize)]
pub struct SideChannelEntry {
    pub evaluation: String,
    pub subject: String,
    pub grade: String,
    pub points: u16,
}

/// Pooled summary over all recorded side-channel acquisitions, snapped
/// through the same scale as the domain scores.
#[derive(Debug, Clone, Serialize)]
pub struct SideChannelSummary {
    pub count: usize,
    pub mean_points: f64,
    pub tier: MasteryTier,
    pub tier_points: u16,
}

/// Informational tracker for acquisitions that carry no domain tag but
/// belong to the designated non-scored subject. Reported alongside the
/// aggregate, never added into it.
#[derive(Debug, Clone, Serialize)]
pub struct SideChannelReport {
    pub subject: String,
    pub entries: Vec<SideChannelEntry>,
    pub summary: Option<SideChannelSummary>,
}

pub fn track_side_channel(evaluations: &[RawEvaluation], subject: &str) -> SideChannelReport {
    let mut entries = Vec::new();

    for evaluation in evaluations {
        if evaluation.subject_name() != subject {
            continue;
        }
        for acquisition in &evaluation.acquisitions {
            if !acquisition.is_untagged() {
                continue;
            }
            let code = acquisition.grade_code();
            entries.push(SideChannelEntry {
                evaluation: evaluation.evaluation_name().to_string(),
                subject: evaluation.subject_name().to_string(),
                grade: display_grade(code).to_string(),
                points: grade_points(code),
            });
        }
    }

    let summary = if entries.is_empty() {
        None
    } else {
        let sum: u32 = entries.iter().map(|entry| u32::from(entry.points)).sum();
        let mean = f64::from(sum) / entries.len() as f64;
        let tier = MasteryTier::for_mean(mean);
        Some(SideChannelSummary {
            count: entries.len(),
            mean_points: mean,
            tier,
            tier_points: tier.points(),
        })
    };

    SideChannelReport {
        subject: subject.to_string(),
        entries,
        summary,
    }
}
