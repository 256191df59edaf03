//! Advisory data model
//!
//! Every entity here is a value type: built fresh for one request, never
//! mutated afterwards, and handed to the caller who decides whether to keep it.
//!
//! Numeric invariants (pH domain, market demand range, effectiveness range)
//! are enforced at construction. Deserialization goes through the strict wire
//! shapes in [`crate::contract`], so a value that exists always satisfies them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::contract::{CropCandidateWire, GrowthInsightWire, LandAnalysisWire, OrganicRemedyWire};
use crate::error::ContractError;

/// Lowest pH the model accepts
pub const PH_MIN: f64 = 4.0;
/// Highest pH the model accepts
pub const PH_MAX: f64 = 9.0;
/// Substitute for readings that are not numbers at all
pub const NEUTRAL_PH: f64 = 7.0;

/// Upper bound of the market demand score
pub const MARKET_DEMAND_MAX: f64 = 5.0;
/// Effectiveness rating bounds for remedies
pub const EFFECTIVENESS_MIN: f64 = 1.0;
/// Effectiveness rating bounds for remedies
pub const EFFECTIVENESS_MAX: f64 = 5.0;

/// Clamp a pH reading into `[PH_MIN, PH_MAX]`. NaN maps to [`NEUTRAL_PH`].
pub fn clamp_ph(value: f64) -> f64 {
    if value.is_nan() {
        return NEUTRAL_PH;
    }
    value.clamp(PH_MIN, PH_MAX)
}

fn clamp_or(value: f64, min: f64, max: f64, nan: f64) -> f64 {
    if value.is_nan() {
        nan
    } else {
        value.clamp(min, max)
    }
}

/// Lowercase, trim and fold spaces/underscores into hyphens.
fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

fn unknown(field: &'static str, value: &str) -> ContractError {
    ContractError::UnknownLabel {
        field,
        value: value.to_string(),
    }
}

/// Soil moisture class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MoistureLevel {
    /// Dry soil
    Low,
    /// Adequate moisture
    Medium,
    /// Wet or waterlogged soil
    High,
}

impl FromStr for MoistureLevel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" | "dry" => Ok(Self::Low),
            "medium" | "moderate" => Ok(Self::Medium),
            "high" | "wet" => Ok(Self::High),
            _ => Err(unknown("moisture", s)),
        }
    }
}

impl fmt::Display for MoistureLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        })
    }
}

/// Soil fertility class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FertilityLevel {
    /// Depleted soil
    Poor,
    /// Usable with amendment
    Fair,
    /// Productive soil
    Good,
    /// Rich soil
    Excellent,
}

impl FromStr for FertilityLevel {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "poor" | "low" => Ok(Self::Poor),
            "fair" | "average" | "moderate" | "medium" => Ok(Self::Fair),
            "good" | "high" => Ok(Self::Good),
            "excellent" | "very-high" | "rich" => Ok(Self::Excellent),
            _ => Err(unknown("fertility", s)),
        }
    }
}

impl fmt::Display for FertilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Poor => "Poor",
            Self::Fair => "Fair",
            Self::Good => "Good",
            Self::Excellent => "Excellent",
        })
    }
}

/// Irrigation requirement, ordered from driest to thirstiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WaterNeeds {
    /// Rain-fed or drought tolerant
    Low,
    /// Occasional irrigation
    #[serde(rename = "Medium-Low")]
    MediumLow,
    /// Regular irrigation
    Medium,
    /// Frequent irrigation
    #[serde(rename = "Medium-High")]
    MediumHigh,
    /// Continuous water supply
    High,
}

impl FromStr for WaterNeeds {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "low" => Ok(Self::Low),
            "medium-low" | "low-medium" | "low-moderate" | "moderate-low" => Ok(Self::MediumLow),
            "medium" | "moderate" => Ok(Self::Medium),
            "medium-high" | "high-medium" | "moderate-high" => Ok(Self::MediumHigh),
            "high" => Ok(Self::High),
            _ => Err(unknown("waterNeeds", s)),
        }
    }
}

impl fmt::Display for WaterNeeds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "Low",
            Self::MediumLow => "Medium-Low",
            Self::Medium => "Medium",
            Self::MediumHigh => "Medium-High",
            Self::High => "High",
        })
    }
}

/// Cultivation difficulty, ordered from easiest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    /// Suitable for first-time growers
    Easy,
    /// Needs regular attention
    Medium,
    /// Needs experience and inputs
    Hard,
}

impl FromStr for Difficulty {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "easy" | "low" => Ok(Self::Easy),
            "medium" | "moderate" => Ok(Self::Medium),
            "hard" | "difficult" | "high" => Ok(Self::Hard),
            _ => Err(unknown("difficulty", s)),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
        })
    }
}

/// Growing season
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// Hot dry season (Zaid)
    Summer,
    /// Cool season (Rabi)
    Winter,
    /// Rainy season (Kharif)
    Monsoon,
    /// Spring
    Spring,
    /// Autumn
    Autumn,
    /// Grown in any season
    #[serde(rename = "Year-round")]
    YearRound,
}

impl Season {
    /// Parse a possibly compound label such as `"Summer/Monsoon"`, taking the
    /// first recognised part.
    pub fn parse_lenient(label: &str) -> Option<Self> {
        if let Ok(season) = label.parse() {
            return Some(season);
        }
        label
            .split(|c: char| matches!(c, '/' | ',' | ';' | '&'))
            .find_map(|part| part.parse().ok())
    }
}

impl FromStr for Season {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_label(s).as_str() {
            "summer" | "zaid" => Ok(Self::Summer),
            "winter" | "rabi" => Ok(Self::Winter),
            "monsoon" | "kharif" | "rainy" => Ok(Self::Monsoon),
            "spring" => Ok(Self::Spring),
            "autumn" | "fall" => Ok(Self::Autumn),
            "year-round" | "all-season" | "all-seasons" | "any" => Ok(Self::YearRound),
            _ => Err(unknown("seasonality", s)),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Summer => "Summer",
            Self::Winter => "Winter",
            Self::Monsoon => "Monsoon",
            Self::Spring => "Spring",
            Self::Autumn => "Autumn",
            Self::YearRound => "Year-round",
        })
    }
}

/// Physical and chemical soil description
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoilProfile {
    /// Free-form soil texture label, e.g. "Loamy Clay"
    pub soil_type: String,
    ph_level: f64,
    /// Moisture class
    pub moisture: MoistureLevel,
    /// Fertility class
    pub fertility: FertilityLevel,
}

impl SoilProfile {
    /// Build a profile; `ph_level` is clamped into the accepted domain.
    pub fn new(
        soil_type: impl Into<String>,
        ph_level: f64,
        moisture: MoistureLevel,
        fertility: FertilityLevel,
    ) -> Self {
        Self {
            soil_type: soil_type.into(),
            ph_level: clamp_ph(ph_level),
            moisture,
            fertility,
        }
    }

    /// pH, always within `[PH_MIN, PH_MAX]`
    pub fn ph_level(&self) -> f64 {
        self.ph_level
    }
}

/// Result of a land analysis request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "LandAnalysisWire")]
pub struct LandAnalysisResult {
    /// Estimated soil profile
    #[serde(flatten)]
    pub soil: SoilProfile,
    /// Ordered improvement advice
    pub recommendations: Vec<String>,
    /// Crops suited to the parcel
    pub suggested_crops: Vec<String>,
    /// Confidence percentage, 0-100
    pub confidence: u8,
}

/// One recommended crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CropCandidateWire")]
pub struct CropCandidate {
    /// Crop name
    pub name: String,
    /// Cultivar or variety
    pub variety: String,
    #[serde(rename = "growthPeriod")]
    growth_period_days: u32,
    /// Irrigation requirement
    #[serde(rename = "waterNeeds")]
    pub water_needs: WaterNeeds,
    /// Free-form yield estimate such as "25 kg per plant"
    #[serde(rename = "expectedYield")]
    pub expected_yield: String,
    #[serde(rename = "expectedProfit")]
    expected_profit_per_acre: f64,
    /// Cultivation difficulty
    pub difficulty: Difficulty,
    #[serde(rename = "marketDemand")]
    market_demand_score: f64,
    /// Best planting season
    #[serde(rename = "seasonality")]
    pub season: Season,
}

impl CropCandidate {
    /// Build a candidate. Growth period is at least one day, profit is
    /// floored at zero and market demand is clamped to `[0, 5]`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: impl Into<String>,
        variety: impl Into<String>,
        growth_period_days: u32,
        water_needs: WaterNeeds,
        expected_yield: impl Into<String>,
        expected_profit_per_acre: f64,
        difficulty: Difficulty,
        market_demand_score: f64,
        season: Season,
    ) -> Self {
        Self {
            name: name.into(),
            variety: variety.into(),
            growth_period_days: growth_period_days.max(1),
            water_needs,
            expected_yield: expected_yield.into(),
            expected_profit_per_acre: clamp_or(expected_profit_per_acre, 0.0, f64::MAX, 0.0),
            difficulty,
            market_demand_score: clamp_or(market_demand_score, 0.0, MARKET_DEMAND_MAX, 0.0),
            season,
        }
    }

    /// Days from sowing to harvest, always positive
    pub fn growth_period_days(&self) -> u32 {
        self.growth_period_days
    }

    /// Expected profit per acre, never negative
    pub fn expected_profit_per_acre(&self) -> f64 {
        self.expected_profit_per_acre
    }

    /// Market demand score in `[0, 5]`
    pub fn market_demand_score(&self) -> f64 {
        self.market_demand_score
    }
}

/// Progress observations for a growing crop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "GrowthInsightWire")]
pub struct GrowthInsight {
    /// Ordered observations
    pub insights: Vec<String>,
    /// Ordered actions
    pub recommendations: Vec<String>,
    /// Next growth stage with its expected day offset
    pub next_milestone: String,
    /// Remaining time to harvest, e.g. "In 30 days"
    pub estimated_harvest_date: String,
}

/// Organic treatment for a crop problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "OrganicRemedyWire")]
pub struct OrganicRemedy {
    /// Remedy name
    #[serde(rename = "solution")]
    pub solution_name: String,
    /// Ordered ingredient list
    pub ingredients: Vec<String>,
    /// Preparation instructions
    pub instructions: String,
    #[serde(rename = "effectiveness")]
    effectiveness_rating: f64,
    /// How the remedy is applied
    #[serde(rename = "applicationMethod")]
    pub application_method: String,
}

impl OrganicRemedy {
    /// Build a remedy; the rating is clamped to `[1, 5]`.
    pub fn new(
        solution_name: impl Into<String>,
        ingredients: Vec<String>,
        instructions: impl Into<String>,
        effectiveness_rating: f64,
        application_method: impl Into<String>,
    ) -> Self {
        Self {
            solution_name: solution_name.into(),
            ingredients,
            instructions: instructions.into(),
            effectiveness_rating: clamp_or(
                effectiveness_rating,
                EFFECTIVENESS_MIN,
                EFFECTIVENESS_MAX,
                EFFECTIVENESS_MIN,
            ),
            application_method: application_method.into(),
        }
    }

    /// Effectiveness rating in `[1, 5]`
    pub fn effectiveness_rating(&self) -> f64 {
        self.effectiveness_rating
    }
}
