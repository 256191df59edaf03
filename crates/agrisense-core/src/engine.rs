//! Advisory Engine
//!
//! Deterministic agricultural advice from fixed tables. Every operation is
//! total: for any input it returns a fully populated value and never fails.
//! It backs the AI path whenever the completion service is disabled, slow or
//! produces something that does not satisfy its contract, so it aims for
//! availability rather than accuracy.

use lazy_static::lazy_static;
use regex::Regex;

use crate::classifier::{classify, ProblemCategory};
use crate::types::{
    CropCandidate, Difficulty, FertilityLevel, GrowthInsight, LandAnalysisResult, MoistureLevel,
    OrganicRemedy, Season, SoilProfile, WaterNeeds,
};

/// Baseline soil texture
pub const BASELINE_SOIL_TYPE: &str = "Loamy Clay";
/// Baseline pH when the description gives no reading
pub const BASELINE_PH: f64 = 6.8;
/// Confidence reported for every baseline analysis
pub const BASELINE_CONFIDENCE: u8 = 85;
/// Crop cycle length the harvest estimate counts down from
pub const BASELINE_CYCLE_DAYS: i64 = 90;

const LAND_RECOMMENDATIONS: &[&str] = &[
    "Add organic compost to improve nitrogen content",
    "Consider drip irrigation for water efficiency",
    "Plant nitrogen-fixing crops like legumes",
    "Test soil pH regularly and adjust as needed",
];

const SUGGESTED_CROPS: &[&str] = &["Tomatoes", "Wheat", "Onions", "Spinach", "Okra", "Eggplant"];

struct CropRow {
    name: &'static str,
    variety: &'static str,
    days: u32,
    water: WaterNeeds,
    yield_estimate: &'static str,
    profit: f64,
    difficulty: Difficulty,
    demand: f64,
    season: Season,
}

const SUMMER_CROPS: &[CropRow] = &[
    CropRow {
        name: "Tomatoes",
        variety: "Hybrid Variety",
        days: 60,
        water: WaterNeeds::Medium,
        yield_estimate: "25 kg per plant",
        profit: 45000.0,
        difficulty: Difficulty::Medium,
        demand: 4.5,
        season: Season::Summer,
    },
    CropRow {
        name: "Okra",
        variety: "Lady Finger",
        days: 55,
        water: WaterNeeds::MediumLow,
        yield_estimate: "15 kg per plant",
        profit: 18000.0,
        difficulty: Difficulty::Easy,
        demand: 4.2,
        season: Season::Summer,
    },
    CropRow {
        name: "Eggplant",
        variety: "Brinjal",
        days: 70,
        water: WaterNeeds::Medium,
        yield_estimate: "20 kg per plant",
        profit: 22000.0,
        difficulty: Difficulty::Medium,
        demand: 4.0,
        season: Season::Summer,
    },
    CropRow {
        name: "Watermelon",
        variety: "Sugar Baby",
        days: 85,
        water: WaterNeeds::MediumHigh,
        yield_estimate: "30 tons per acre",
        profit: 35000.0,
        difficulty: Difficulty::Medium,
        demand: 4.8,
        season: Season::Summer,
    },
    CropRow {
        name: "Pearl Millet",
        variety: "Bajra",
        days: 80,
        water: WaterNeeds::Low,
        yield_estimate: "2 tons per acre",
        profit: 15000.0,
        difficulty: Difficulty::Easy,
        demand: 3.8,
        season: Season::Summer,
    },
    CropRow {
        name: "Cucumber",
        variety: "Hybrid",
        days: 50,
        water: WaterNeeds::Medium,
        yield_estimate: "12 tons per acre",
        profit: 28000.0,
        difficulty: Difficulty::Easy,
        demand: 4.3,
        season: Season::Summer,
    },
];

const WINTER_CROPS: &[CropRow] = &[
    CropRow {
        name: "Wheat",
        variety: "PBW 343",
        days: 120,
        water: WaterNeeds::Medium,
        yield_estimate: "4 tons per acre",
        profit: 35000.0,
        difficulty: Difficulty::Easy,
        demand: 4.8,
        season: Season::Winter,
    },
    CropRow {
        name: "Mustard",
        variety: "Pusa Bold",
        days: 90,
        water: WaterNeeds::Low,
        yield_estimate: "1.5 tons per acre",
        profit: 25000.0,
        difficulty: Difficulty::Easy,
        demand: 4.2,
        season: Season::Winter,
    },
    CropRow {
        name: "Peas",
        variety: "Garden Peas",
        days: 65,
        water: WaterNeeds::Medium,
        yield_estimate: "8 tons per acre",
        profit: 30000.0,
        difficulty: Difficulty::Medium,
        demand: 4.5,
        season: Season::Winter,
    },
];

struct RemedyRow {
    name: &'static str,
    ingredients: &'static [&'static str],
    instructions: &'static str,
    effectiveness: f64,
    method: &'static str,
}

const PEST_REMEDY: RemedyRow = RemedyRow {
    name: "Neem Oil Spray",
    ingredients: &["2 tbsp neem oil", "1 tsp liquid soap", "1 liter water"],
    instructions: "Mix all ingredients in spray bottle. Apply early morning or evening on affected areas.",
    effectiveness: 4.5,
    method: "Foliar spray on affected areas",
};

const DISEASE_REMEDY: RemedyRow = RemedyRow {
    name: "Baking Soda Fungicide",
    ingredients: &["1 tbsp baking soda", "1/2 tsp liquid soap", "1 liter water"],
    instructions: "Dissolve baking soda in water, add soap. Spray on affected plants weekly.",
    effectiveness: 4.0,
    method: "Weekly foliar application",
};

const NUTRIENT_REMEDY: RemedyRow = RemedyRow {
    name: "Compost Tea",
    ingredients: &["2 cups compost", "1 bucket water", "1 tbsp molasses"],
    instructions: "Steep compost in water for 24-48 hours. Strain and dilute 1:10 before use.",
    effectiveness: 4.8,
    method: "Soil drench around root zone",
};

lazy_static! {
    static ref PH_READING: Regex =
        Regex::new(r"(?i)\bph(?:\s+(?:level|value|of))?\s*(?:is|[:=~])?\s*(-?\d+(?:\.\d+)?)")
            .expect("pH pattern is valid");
}

/// Explicit pH reading in a land description, e.g. "pH 5.2" or "ph: 9.8".
pub fn ph_reading(description: &str) -> Option<f64> {
    PH_READING
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Days left until harvest on the baseline cycle, never below one.
pub fn harvest_days_remaining(days_since_planting: i64) -> u32 {
    (BASELINE_CYCLE_DAYS - days_since_planting.max(0)).max(1) as u32
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn crop_table(season: &str) -> &'static [CropRow] {
    match Season::parse_lenient(season) {
        Some(Season::Winter) => WINTER_CROPS,
        _ => SUMMER_CROPS,
    }
}

impl RemedyRow {
    fn to_remedy(&self) -> OrganicRemedy {
        OrganicRemedy::new(
            self.name,
            strings(self.ingredients),
            self.instructions,
            self.effectiveness,
            self.method,
        )
    }
}

const REMEDY_CATALOG: [&RemedyRow; 3] = [&PEST_REMEDY, &DISEASE_REMEDY, &NUTRIENT_REMEDY];

fn remedy_row(category: ProblemCategory) -> &'static RemedyRow {
    match category {
        ProblemCategory::Pest => &PEST_REMEDY,
        ProblemCategory::Disease => &DISEASE_REMEDY,
        ProblemCategory::Nutrient => &NUTRIENT_REMEDY,
    }
}

/// Rule-based advisor with no external dependencies
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvisoryEngine;

impl AdvisoryEngine {
    /// Create the engine
    pub fn new() -> Self {
        Self
    }

    /// Baseline land analysis. An explicit pH reading in the description
    /// replaces the baseline pH and is clamped into the soil pH domain.
    pub fn analyze_land(&self, description: &str, _location: &str) -> LandAnalysisResult {
        let ph = match ph_reading(description) {
            Some(reading) => {
                tracing::debug!(reading, "using pH reading from land description");
                reading
            }
            None => BASELINE_PH,
        };

        LandAnalysisResult {
            soil: SoilProfile::new(
                BASELINE_SOIL_TYPE,
                ph,
                MoistureLevel::Medium,
                FertilityLevel::Good,
            ),
            recommendations: strings(LAND_RECOMMENDATIONS),
            suggested_crops: strings(SUGGESTED_CROPS),
            confidence: BASELINE_CONFIDENCE,
        }
    }

    /// Season table in declaration order. Winter (case-insensitive, "Rabi"
    /// included) selects the winter table; every other season, known or not,
    /// selects the summer table. Soil type, location and land size do not
    /// influence the result.
    pub fn recommend_crops(
        &self,
        _soil_type: &str,
        _location: &str,
        season: &str,
        _land_size_acres: f64,
    ) -> Vec<CropCandidate> {
        crop_table(season)
            .iter()
            .map(|row| {
                CropCandidate::new(
                    row.name,
                    row.variety,
                    row.days,
                    row.water,
                    row.yield_estimate,
                    row.profit,
                    row.difficulty,
                    row.demand,
                    row.season,
                )
            })
            .collect()
    }

    /// Growth insights for a crop on a given day. Only a "Seedling" stage
    /// gets a distinct milestone; every other stage is heading for flowering.
    pub fn growth_insights(
        &self,
        crop_name: &str,
        current_stage: &str,
        days_since_planting: i64,
        _health_status: &str,
        _weather_conditions: &str,
    ) -> GrowthInsight {
        let day = days_since_planting.max(0);

        let next_milestone = if current_stage.trim().eq_ignore_ascii_case("seedling") {
            "Vegetative growth in 10-15 days"
        } else {
            "Flowering stage in 10-15 days"
        };

        GrowthInsight {
            insights: vec![
                format!("{} is progressing well for day {}", crop_name, day),
                "Growth rate is within normal parameters for this stage".to_string(),
                "Health indicators are positive based on current conditions".to_string(),
                "Weather conditions are favorable for continued growth".to_string(),
            ],
            recommendations: strings(&[
                "Continue current watering schedule",
                "Monitor for pest activity during this growth phase",
                "Apply organic fertilizer if leaf color appears pale",
                "Ensure adequate sunlight exposure",
            ]),
            next_milestone: next_milestone.to_string(),
            estimated_harvest_date: format!(
                "In {} days",
                harvest_days_remaining(days_since_planting)
            ),
        }
    }

    /// Fixed remedy for the problem's category.
    pub fn organic_solution(&self, problem: &str, _crop_type: &str, _severity: &str) -> OrganicRemedy {
        remedy_row(classify(problem)).to_remedy()
    }

    /// Every fixed remedy, one per problem category, in pest, disease,
    /// nutrient order.
    pub fn remedy_catalog(&self) -> Vec<OrganicRemedy> {
        REMEDY_CATALOG.iter().map(|row| row.to_remedy()).collect()
    }
}
