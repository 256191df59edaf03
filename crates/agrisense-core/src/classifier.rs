//! Problem classifier
//!
//! Maps a free-text crop problem onto one of three remedy categories.
//! Rules are tried in order against the lowercased description; the first
//! substring hit wins and anything unmatched is treated as a nutrient issue.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Remedy category for a crop problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    /// Insects, mites and other pests
    Pest,
    /// Fungal, bacterial or viral disease
    Disease,
    /// Deficiency or general decline
    Nutrient,
}

impl fmt::Display for ProblemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProblemCategory::Pest => "pest",
            ProblemCategory::Disease => "disease",
            ProblemCategory::Nutrient => "nutrient",
        })
    }
}

/// Ordered matching rules. Order matters: "pest disease" is a pest problem.
const RULES: &[(&str, ProblemCategory)] = &[
    ("pest", ProblemCategory::Pest),
    ("disease", ProblemCategory::Disease),
];

/// Category used when no rule matches
pub const DEFAULT_CATEGORY: ProblemCategory = ProblemCategory::Nutrient;

/// Classify a problem description.
pub fn classify(problem: &str) -> ProblemCategory {
    let lowered = problem.to_lowercase();
    RULES
        .iter()
        .find(|(token, _)| lowered.contains(token))
        .map(|(_, category)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}
