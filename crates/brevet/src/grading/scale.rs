use serde::Serialize;

/// Points awarded for a raw Pronote letter grade.
///
/// The export uses a closed set of codes (A+, A, C, E). Anything else,
/// including an empty string, scores 0 so a stray code never poisons an
/// average.
pub fn grade_points(code: &str) -> u16 {
    match code.trim() {
        "A+" => 50,
        "A" => 40,
        "C" => 25,
        "E" => 10,
        _ => 0,
    }
}

/// Display symbol for a raw letter grade (the French V+/V/J/R colours).
/// Unknown codes pass through unchanged.
pub fn display_grade(code: &str) -> &str {
    match code.trim() {
        "A+" => "V+",
        "A" => "V",
        "C" => "J",
        "E" => "R",
        _ => code,
    }
}

/// One of the four official mastery levels a domain average is snapped onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryTier {
    Insufficient,
    Fragile,
    Satisfactory,
    VeryGood,
}

impl MasteryTier {
    pub const fn points(self) -> u16 {
        match self {
            Self::Insufficient => 10,
            Self::Fragile => 25,
            Self::Satisfactory => 40,
            Self::VeryGood => 50,
        }
    }

    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Insufficient => "R",
            Self::Fragile => "J",
            Self::Satisfactory => "V",
            Self::VeryGood => "V+",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Insufficient => "Insufficient mastery",
            Self::Fragile => "Fragile mastery",
            Self::Satisfactory => "Satisfactory mastery",
            Self::VeryGood => "Very good mastery",
        }
    }

    /// Snaps a raw 0-50 average onto the scale.
    ///
    /// Breakpoints sit at the midpoints between the tier point values
    /// (17.5, 32.5, 45), with the lower bound closed so an exact midpoint
    /// resolves to the higher tier.
    pub fn for_mean(mean: f64) -> Self {
        if mean >= 45.0 {
            Self::VeryGood
        } else if mean >= 32.5 {
            Self::Satisfactory
        } else if mean >= 17.5 {
            Self::Fragile
        } else {
            Self::Insufficient
        }
    }
}
