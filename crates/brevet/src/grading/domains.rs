use std::collections::BTreeMap;

use serde::Serialize;

use super::normalizer::RawEvaluation;
use super::scale::{grade_points, MasteryTier};

/// The eight components of the socle commun that feed the 400-point
/// aggregate. Any other tag found in the data is still scored for display
/// but stays out of the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SocleDomain {
    FrenchLanguage,
    ForeignLanguages,
    ScientificLanguages,
    ArtsAndBody,
    LearningMethods,
    PersonAndCitizen,
    NaturalAndTechnicalSystems,
    WorldRepresentations,
}

impl SocleDomain {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::FrenchLanguage,
            Self::ForeignLanguages,
            Self::ScientificLanguages,
            Self::ArtsAndBody,
            Self::LearningMethods,
            Self::PersonAndCitizen,
            Self::NaturalAndTechnicalSystems,
            Self::WorldRepresentations,
        ]
    }

    /// Tag used in Pronote acquisition data.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::FrenchLanguage => "D1.1",
            Self::ForeignLanguages => "D1.2",
            Self::ScientificLanguages => "D1.3",
            Self::ArtsAndBody => "D1.4",
            Self::LearningMethods => "D2",
            Self::PersonAndCitizen => "D3",
            Self::NaturalAndTechnicalSystems => "D4",
            Self::WorldRepresentations => "D5",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FrenchLanguage => "French language, oral and written",
            Self::ForeignLanguages => "Foreign and regional languages",
            Self::ScientificLanguages => "Mathematical, scientific and computer languages",
            Self::ArtsAndBody => "Languages of the arts and the body",
            Self::LearningMethods => "Methods and tools for learning",
            Self::PersonAndCitizen => "Education of the person and the citizen",
            Self::NaturalAndTechnicalSystems => "Natural and technical systems",
            Self::WorldRepresentations => "Representations of the world and human activity",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|domain| domain.tag() == tag.trim())
    }
}

/// Score accumulated for one domain tag over a run.
#[derive(Debug, Clone, Serialize)]
pub struct DomainScore {
    pub count: usize,
    pub mean_points: f64,
    pub tier: MasteryTier,
}

impl DomainScore {
    pub fn tier_points(&self) -> u16 {
        self.tier.points()
    }
}

/// Groups acquisitions by domain tag and snaps each domain's mean onto the
/// mastery scale.
///
/// An acquisition carrying several comma-delimited tags counts fully toward
/// each of them. Domains with no acquisitions are absent from the map. The
/// map is built fresh per run; nothing is accumulated across calls.
pub fn aggregate_domains(evaluations: &[RawEvaluation]) -> BTreeMap<String, DomainScore> {
    let mut buckets: BTreeMap<String, (usize, u32)> = BTreeMap::new();

    for evaluation in evaluations {
        for acquisition in &evaluation.acquisitions {
            let points = u32::from(grade_points(acquisition.grade_code()));
            for tag in acquisition.domain_tags() {
                let entry = buckets.entry(tag.to_string()).or_insert((0, 0));
                entry.0 += 1;
                entry.1 += points;
            }
        }
    }

    buckets
        .into_iter()
        .map(|(tag, (count, sum))| {
            let mean = f64::from(sum) / count as f64;
            (
                tag,
                DomainScore {
                    count,
                    mean_points: mean,
                    tier: MasteryTier::for_mean(mean),
                },
            )
        })
        .collect()
}
