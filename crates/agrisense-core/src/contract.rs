//! Response contracts for completion output
//!
//! Completion services answer in free text that usually, but not always,
//! carries a JSON payload somewhere inside (fenced in markdown, preceded by
//! prose, followed by commentary). Turning that text into a domain value is a
//! two-stage pipeline:
//!
//! 1. [`extract_span`] finds the first opening delimiter for the expected
//!    [`Shape`] and returns the balanced span that closes it. Only the first
//!    opening delimiter is tried; there is no backtracking to later spans.
//! 2. The span is deserialized into a strict wire struct (all fields required,
//!    primitive types checked by `serde`) and converted into the domain type,
//!    which checks labels, list lengths and numeric ranges.
//!
//! Either stage failing yields a [`ContractError`]. Nothing is ever filled in.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;

use crate::error::{ContractError, Result};
use crate::types::{
    CropCandidate, GrowthInsight, LandAnalysisResult, OrganicRemedy, Season, SoilProfile,
};

/// Fewest land recommendations a completion may carry
pub const MIN_LAND_RECOMMENDATIONS: usize = 3;
/// Most land recommendations kept from a completion
pub const MAX_LAND_RECOMMENDATIONS: usize = 5;
/// Fewest suggested crops a completion may carry
pub const MIN_SUGGESTED_CROPS: usize = 4;
/// Most suggested crops kept from a completion
pub const MAX_SUGGESTED_CROPS: usize = 6;
/// Fewest insights or growth recommendations a completion may carry
pub const MIN_GROWTH_ITEMS: usize = 3;
/// Most insights or growth recommendations kept from a completion
pub const MAX_GROWTH_ITEMS: usize = 4;

/// Top-level JSON shape an operation expects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{ ... }`
    Object,
    /// `[ ... ]`
    Array,
}

impl Shape {
    fn delimiters(self) -> (char, char) {
        match self {
            Shape::Object => ('{', '}'),
            Shape::Array => ('[', ']'),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Object => f.write_str("object"),
            Shape::Array => f.write_str("array"),
        }
    }
}

/// Return the balanced span starting at the first opening delimiter of `shape`.
///
/// Delimiters inside JSON string literals (including escaped quotes) do not
/// count towards nesting.
pub fn extract_span(text: &str, shape: Shape) -> Result<&str> {
    let (open, close) = shape.delimiters();
    let start = text.find(open).ok_or(ContractError::MissingSpan(shape))?;

    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        if c == '"' {
            in_string = true;
        } else if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                let end = start + offset + c.len_utf8();
                return Ok(&text[start..end]);
            }
        }
    }

    Err(ContractError::UnbalancedSpan { shape, start })
}

fn parse_with<W, T>(text: &str, shape: Shape) -> Result<T>
where
    W: DeserializeOwned,
    T: TryFrom<W, Error = ContractError>,
{
    let span = extract_span(text, shape)?;
    let wire: W = serde_json::from_str(span)?;
    T::try_from(wire)
}

/// Parse a land analysis from completion text.
pub fn parse_land_analysis(text: &str) -> Result<LandAnalysisResult> {
    parse_with::<LandAnalysisWire, _>(text, Shape::Object)
}

/// Parse an ordered list of crop candidates from completion text.
pub fn parse_crop_candidates(text: &str) -> Result<Vec<CropCandidate>> {
    let span = extract_span(text, Shape::Array)?;
    let wires: Vec<CropCandidateWire> = serde_json::from_str(span)?;
    if wires.is_empty() {
        return Err(ContractError::Empty {
            field: "recommendations",
        });
    }
    wires.into_iter().map(CropCandidate::try_from).collect()
}

/// Parse growth insights from completion text.
pub fn parse_growth_insight(text: &str) -> Result<GrowthInsight> {
    parse_with::<GrowthInsightWire, _>(text, Shape::Object)
}

/// Parse an organic remedy from completion text.
pub fn parse_organic_remedy(text: &str) -> Result<OrganicRemedy> {
    parse_with::<OrganicRemedyWire, _>(text, Shape::Object)
}

fn required(field: &'static str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContractError::Empty { field });
    }
    Ok(trimmed.to_string())
}

/// Blank entries are dropped before counting; extras past `max` are cut.
fn bounded_list(
    field: &'static str,
    values: Vec<String>,
    min: usize,
    max: usize,
) -> Result<Vec<String>> {
    let list: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .take(max)
        .collect();
    if list.is_empty() {
        return Err(ContractError::Empty { field });
    }
    if list.len() < min {
        return Err(ContractError::Cardinality {
            field,
            len: list.len(),
            min,
        });
    }
    Ok(list)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LandAnalysisWire {
    soil_type: String,
    ph_level: f64,
    moisture: String,
    fertility: String,
    recommendations: Vec<String>,
    suggested_crops: Vec<String>,
    confidence: f64,
}

impl TryFrom<LandAnalysisWire> for LandAnalysisResult {
    type Error = ContractError;

    fn try_from(wire: LandAnalysisWire) -> Result<Self> {
        let soil = SoilProfile::new(
            required("soilType", wire.soil_type)?,
            wire.ph_level,
            wire.moisture.parse()?,
            wire.fertility.parse()?,
        );
        Ok(Self {
            soil,
            recommendations: bounded_list(
                "recommendations",
                wire.recommendations,
                MIN_LAND_RECOMMENDATIONS,
                MAX_LAND_RECOMMENDATIONS,
            )?,
            suggested_crops: bounded_list(
                "suggestedCrops",
                wire.suggested_crops,
                MIN_SUGGESTED_CROPS,
                MAX_SUGGESTED_CROPS,
            )?,
            confidence: wire.confidence.round().clamp(0.0, 100.0) as u8,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CropCandidateWire {
    name: String,
    variety: String,
    growth_period: f64,
    water_needs: String,
    expected_yield: String,
    expected_profit: f64,
    difficulty: String,
    market_demand: f64,
    seasonality: String,
}

impl TryFrom<CropCandidateWire> for CropCandidate {
    type Error = ContractError;

    fn try_from(wire: CropCandidateWire) -> Result<Self> {
        let days = wire.growth_period.round();
        if days < 1.0 || days > f64::from(u32::MAX) {
            return Err(ContractError::OutOfRange {
                field: "growthPeriod",
                value: wire.growth_period,
            });
        }
        let season = Season::parse_lenient(&wire.seasonality).ok_or_else(|| {
            ContractError::UnknownLabel {
                field: "seasonality",
                value: wire.seasonality.clone(),
            }
        })?;

        Ok(CropCandidate::new(
            required("name", wire.name)?,
            wire.variety.trim(),
            days as u32,
            wire.water_needs.parse()?,
            wire.expected_yield.trim(),
            wire.expected_profit,
            wire.difficulty.parse()?,
            wire.market_demand,
            season,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GrowthInsightWire {
    insights: Vec<String>,
    recommendations: Vec<String>,
    next_milestone: String,
    estimated_harvest_date: String,
}

impl TryFrom<GrowthInsightWire> for GrowthInsight {
    type Error = ContractError;

    fn try_from(wire: GrowthInsightWire) -> Result<Self> {
        Ok(Self {
            insights: bounded_list(
                "insights",
                wire.insights,
                MIN_GROWTH_ITEMS,
                MAX_GROWTH_ITEMS,
            )?,
            recommendations: bounded_list(
                "recommendations",
                wire.recommendations,
                MIN_GROWTH_ITEMS,
                MAX_GROWTH_ITEMS,
            )?,
            next_milestone: required("nextMilestone", wire.next_milestone)?,
            estimated_harvest_date: required(
                "estimatedHarvestDate",
                wire.estimated_harvest_date,
            )?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrganicRemedyWire {
    solution: String,
    ingredients: Vec<String>,
    instructions: String,
    effectiveness: f64,
    application_method: String,
}

impl TryFrom<OrganicRemedyWire> for OrganicRemedy {
    type Error = ContractError;

    fn try_from(wire: OrganicRemedyWire) -> Result<Self> {
        Ok(OrganicRemedy::new(
            required("solution", wire.solution)?,
            bounded_list("ingredients", wire.ingredients, 1, usize::MAX)?,
            required("instructions", wire.instructions)?,
            wire.effectiveness,
            required("applicationMethod", wire.application_method)?,
        ))
    }
}
