//! Grade-to-score transformation pipeline.
//!
//! Raw evaluations flow through three independent passes: the normalizer
//! (per-subject records), the domain aggregator and the side-channel
//! tracker. [`analyze`] runs all three and synthesizes the Brevet
//! statistics. The whole pipeline is a pure function of its input: it
//! performs no I/O, keeps no state between runs and never fails; missing
//! or partial data degrades to zeros and empties.

pub mod domains;
pub mod normalizer;
pub mod scale;
pub mod side_channel;
pub mod stats;

use serde::Serialize;

pub use domains::{aggregate_domains, DomainScore, SocleDomain};
pub use normalizer::{normalize, EvaluationRecord, RawAcquisition, RawEvaluation};
pub use scale::{display_grade, grade_points, MasteryTier};
pub use side_channel::{track_side_channel, SideChannelReport};
pub use stats::{
    socle_aggregate, subject_averages, PerformanceTier, SocleAggregate, SubjectAverage,
};

/// One row of the per-domain breakdown, in canonical order followed by any
/// non-canonical tags found in the data.
#[derive(Debug, Clone, Serialize)]
pub struct DomainScoreEntry {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub canonical: bool,
    pub count: usize,
    pub mean_points: f64,
    pub tier: MasteryTier,
    pub tier_points: u16,
    pub tier_symbol: &'static str,
    pub tier_label: &'static str,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, Serialize)]
pub struct GradeAnalysis {
    pub evaluations: Vec<EvaluationRecord>,
    pub subject_averages: Vec<SubjectAverage>,
    pub domain_scores: Vec<DomainScoreEntry>,
    pub side_channel: SideChannelReport,
    pub socle: SocleAggregate,
}

/// Runs the full pipeline over one batch of raw evaluations.
///
/// `side_subject` names the one non-scored subject whose untagged
/// acquisitions are tracked separately. Always returns a complete
/// structure; an empty batch yields zero-valued statistics.
pub fn analyze(evaluations: &[RawEvaluation], side_subject: &str) -> GradeAnalysis {
    let records = normalize(evaluations);
    let averages = subject_averages(&records);
    let domain_map = aggregate_domains(evaluations);
    let side = track_side_channel(evaluations, side_subject);
    let socle = socle_aggregate(&domain_map);

    let mut entries = Vec::with_capacity(domain_map.len());
    for domain in SocleDomain::ordered() {
        if let Some(score) = domain_map.get(domain.tag()) {
            entries.push(DomainScoreEntry {
                tag: domain.tag().to_string(),
                label: Some(domain.label()),
                canonical: true,
                count: score.count,
                mean_points: score.mean_points,
                tier: score.tier,
                tier_points: score.tier.points(),
                tier_symbol: score.tier.symbol(),
                tier_label: score.tier.label(),
            });
        }
    }
    for (tag, score) in &domain_map {
        if SocleDomain::from_tag(tag).is_some() {
            continue;
        }
        entries.push(DomainScoreEntry {
            tag: tag.clone(),
            label: None,
            canonical: false,
            count: score.count,
            mean_points: score.mean_points,
            tier: score.tier,
            tier_points: score.tier.points(),
            tier_symbol: score.tier.symbol(),
            tier_label: score.tier.label(),
        });
    }

    GradeAnalysis {
        evaluations: records,
        subject_averages: averages,
        domain_scores: entries,
        side_channel: side,
        socle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acquisition(grade: &str, domains: &str) -> RawAcquisition {
        RawAcquisition {
            grade: Some(grade.to_string()).filter(|g| !g.is_empty()),
            domains: Some(domains.to_string()).filter(|d| !d.is_empty()),
        }
    }

    #[test]
    fn empty_batch_yields_complete_zeroed_statistics() {
        let analysis = analyze(&[], "Vie scolaire");

        assert!(analysis.evaluations.is_empty());
        assert!(analysis.subject_averages.is_empty());
        assert!(analysis.domain_scores.is_empty());
        assert!(analysis.side_channel.entries.is_empty());
        assert_eq!(analysis.socle.total, 0);
        assert_eq!(analysis.socle.tier, PerformanceTier::BelowPass);
        assert_eq!(analysis.socle.tier_label, "Below pass");
    }

    #[test]
    fn domain_breakdown_lists_canonical_domains_first() {
        let evaluations = vec![RawEvaluation {
            subject: Some("Math".to_string()),
            acquisitions: vec![
                acquisition("A", "D5"),
                acquisition("A", "Projet"),
                acquisition("A", "D1.3"),
            ],
            ..RawEvaluation::default()
        }];

        let analysis = analyze(&evaluations, "Vie scolaire");
        let tags: Vec<&str> = analysis
            .domain_scores
            .iter()
            .map(|entry| entry.tag.as_str())
            .collect();
        assert_eq!(tags, vec!["D1.3", "D5", "Projet"]);
        assert!(analysis.domain_scores[0].canonical);
        assert!(!analysis.domain_scores[2].canonical);
        assert_eq!(analysis.domain_scores[2].label, None);
    }

    #[test]
    fn non_canonical_tags_do_not_change_the_total() {
        let base = vec![RawEvaluation {
            acquisitions: vec![acquisition("A+", "D2")],
            ..RawEvaluation::default()
        }];
        let with_extra = vec![RawEvaluation {
            acquisitions: vec![acquisition("A+", "D2"), acquisition("A+", "Projet")],
            ..RawEvaluation::default()
        }];

        let baseline = analyze(&base, "Vie scolaire");
        let extended = analyze(&with_extra, "Vie scolaire");
        assert_eq!(baseline.socle.total, extended.socle.total);
        assert_eq!(extended.domain_scores.len(), 2);
    }

    #[test]
    fn analysis_serializes_to_json() {
        let evaluations = vec![RawEvaluation {
            subject: Some("Math".to_string()),
            acquisitions: vec![acquisition("A+", "D1.3")],
            ..RawEvaluation::default()
        }];

        let analysis = analyze(&evaluations, "Vie scolaire");
        let json = serde_json::to_value(&analysis).expect("analysis serializes");
        assert_eq!(json["socle"]["total"], 50);
        assert_eq!(json["socle"]["tier"], "below_pass");
        assert_eq!(json["domain_scores"][0]["tier_symbol"], "V+");
        assert_eq!(json["domain_scores"][0]["tier_label"], "Very good mastery");
    }
}
