//! Property tests for the Advisory Engine
//!
//! The engine must be total: arbitrary strings, empty strings and extreme
//! numbers always produce structurally complete results.

use agrisense_core::contract::{
    parse_crop_candidates, parse_growth_insight, parse_land_analysis, parse_organic_remedy,
};
use agrisense_core::engine::{harvest_days_remaining, AdvisoryEngine};
use agrisense_core::ranking::rank_crops;
use agrisense_core::types::{PH_MAX, PH_MIN};
use agrisense_core::{classify, ProblemCategory};
use proptest::prelude::*;

fn any_text() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), ".{0,64}", "[a-zA-Z ]{0,32}"]
}

proptest! {
    #[test]
    fn land_analysis_is_total(description in any_text(), location in any_text()) {
        let result = AdvisoryEngine::new().analyze_land(&description, &location);
        prop_assert!(!result.soil.soil_type.is_empty());
        prop_assert!((PH_MIN..=PH_MAX).contains(&result.soil.ph_level()));
        prop_assert!((3..=5).contains(&result.recommendations.len()));
        prop_assert!((4..=6).contains(&result.suggested_crops.len()));
        prop_assert!(result.confidence <= 100);
    }

    #[test]
    fn ph_readings_always_clamp(reading in -1000.0f64..1000.0) {
        let description = format!("field with pH {:.2}", reading);
        let result = AdvisoryEngine::new().analyze_land(&description, "");
        prop_assert!((PH_MIN..=PH_MAX).contains(&result.soil.ph_level()));
    }

    #[test]
    fn crop_recommendations_are_total(
        soil in any_text(),
        location in any_text(),
        season in any_text(),
        acres in prop::num::f64::ANY,
    ) {
        let crops = AdvisoryEngine::new().recommend_crops(&soil, &location, &season, acres);
        prop_assert!(!crops.is_empty());
        for crop in &crops {
            prop_assert!(crop.growth_period_days() > 0);
            prop_assert!((0.0..=5.0).contains(&crop.market_demand_score()));
            prop_assert!(crop.expected_profit_per_acre() >= 0.0);
        }
    }

    #[test]
    fn unknown_seasons_fall_back_to_summer(season in "[xyzq]{1,12}") {
        let engine = AdvisoryEngine::new();
        prop_assert_eq!(
            engine.recommend_crops("", "", &season, 1.0),
            engine.recommend_crops("", "", "Summer", 1.0)
        );
    }

    #[test]
    fn growth_insights_are_total(
        crop in any_text(),
        stage in any_text(),
        days in prop::num::i64::ANY,
        health in any_text(),
        weather in any_text(),
    ) {
        let insight = AdvisoryEngine::new().growth_insights(&crop, &stage, days, &health, &weather);
        prop_assert!((3..=4).contains(&insight.insights.len()));
        prop_assert!((3..=4).contains(&insight.recommendations.len()));
        prop_assert!(!insight.next_milestone.is_empty());
        let remaining = harvest_days_remaining(days);
        prop_assert!(remaining >= 1);
        prop_assert_eq!(insight.estimated_harvest_date, format!("In {} days", remaining));
    }

    #[test]
    fn organic_solution_is_total(problem in any_text(), crop in any_text(), severity in any_text()) {
        let remedy = AdvisoryEngine::new().organic_solution(&problem, &crop, &severity);
        prop_assert!(!remedy.solution_name.is_empty());
        prop_assert!(!remedy.ingredients.is_empty());
        prop_assert!((1.0..=5.0).contains(&remedy.effectiveness_rating()));
    }

    #[test]
    fn classification_prefers_pest(prefix in "[a-z ]{0,10}", suffix in "[a-z ]{0,10}") {
        let problem = format!("{}PEST{}disease", prefix, suffix);
        prop_assert_eq!(classify(&problem), ProblemCategory::Pest);
    }

    #[test]
    fn contract_parsers_never_panic(text in ".{0,200}") {
        let _ = parse_land_analysis(&text);
        let _ = parse_crop_candidates(&text);
        let _ = parse_growth_insight(&text);
        let _ = parse_organic_remedy(&text);
    }

    #[test]
    fn ranking_preserves_membership(season in any_text()) {
        let crops = AdvisoryEngine::new().recommend_crops("", "", &season, 1.0);
        let mut before: Vec<String> = crops.iter().map(|c| c.name.clone()).collect();
        let mut after: Vec<String> = rank_crops(crops).into_iter().map(|c| c.name).collect();
        before.sort();
        after.sort();
        prop_assert_eq!(before, after);
    }
}

#[test]
fn engine_output_round_trips_through_contracts() {
    let engine = AdvisoryEngine::new();

    let land = engine.analyze_land("pH 5.0 sandy loam", "Jaipur");
    let text = serde_json::to_string(&land).unwrap();
    assert_eq!(parse_land_analysis(&text).unwrap(), land);

    let crops = engine.recommend_crops("", "", "Winter", 1.0);
    let text = format!("Here you go: {}", serde_json::to_string(&crops).unwrap());
    assert_eq!(parse_crop_candidates(&text).unwrap(), crops);

    let insight = engine.growth_insights("Peas", "Seedling", 12, "Good", "Cool");
    let text = serde_json::to_string(&insight).unwrap();
    assert_eq!(parse_growth_insight(&text).unwrap(), insight);

    let remedy = engine.organic_solution("leaf disease", "Peas", "Low");
    let text = serde_json::to_string(&remedy).unwrap();
    assert_eq!(parse_organic_remedy(&text).unwrap(), remedy);
}
