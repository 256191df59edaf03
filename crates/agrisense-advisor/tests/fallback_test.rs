use agrisense_advisor::service::{
    CropPlanRequest, CropRecommendationRequest, GrowthInsightRequest, LandAnalysisRequest,
    OrganicSolutionRequest,
};
use agrisense_advisor::{
    AdvisoryService, AdvisoryStore, AiGateway, Completion, CompletionClient, CompletionRequest,
    FallbackReason, InlineImage, MemoryStore, Provenance, UserId,
};
use agrisense_core::{AdvisoryEngine, RankPolicy};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const LAND_JSON: &str = r#"{"soilType":"Red Laterite","phLevel":5.9,"moisture":"Low","fertility":"Fair","recommendations":["Mulch heavily","Add lime at 1 t/acre","Sow a green manure before monsoon"],"suggestedCrops":["Cashew","Finger Millet","Groundnut","Cowpea"],"confidence":72}"#;
const CROPS_JSON: &str = r#"[
  {"name":"Finger Millet","variety":"GPU-28","growthPeriod":110,"waterNeeds":"Low","expectedYield":"10 quintals","expectedProfit":30000,"difficulty":"Easy","marketDemand":3.5,"seasonality":"Kharif"},
  {"name":"Groundnut","variety":"TMV-2","growthPeriod":105,"waterNeeds":"Medium","expectedYield":"8 quintals","expectedProfit":52000,"difficulty":"Medium","marketDemand":4.5,"seasonality":"Monsoon"},
  {"name":"Cowpea","variety":"C-152","growthPeriod":75,"waterNeeds":"Low","expectedYield":"5 quintals","expectedProfit":61000,"difficulty":"Easy","marketDemand":4.5,"seasonality":"Summer"}
]"#;
const GROWTH_JSON: &str = r#"{"insights":["Canopy is closing on schedule","Leaf colour is even","No borer damage seen"],"recommendations":["Side-dress with vermicompost","Earth up the rows","Irrigate every 6 days"],"nextMilestone":"Tasselling in 12 days","estimatedHarvestDate":"In 48 days"}"#;
const REMEDY_JSON: &str = r#"{"solution":"Trichoderma Drench","ingredients":["Trichoderma viride","Jaggery"],"instructions":"Mix 5 g per litre and rest overnight","effectiveness":4,"applicationMethod":"Soil drench around the root zone"}"#;

/// Answers each operation with a well-formed payload, wrapped in chatter.
#[derive(Debug, Default)]
struct Agronomist {
    images_seen: Mutex<Vec<usize>>,
}

#[async_trait::async_trait]
impl CompletionClient for Agronomist {
    fn name(&self) -> &str {
        "agronomist"
    }

    async fn complete(&self, request: &CompletionRequest) -> anyhow::Result<Completion> {
        self.images_seen.lock().unwrap().push(request.images.len());
        let payload = if request.prompt.contains("\"suggestedCrops\"") {
            LAND_JSON
        } else if request.prompt.contains("\"growthPeriod\"") {
            CROPS_JSON
        } else if request.prompt.contains("\"nextMilestone\"") {
            GROWTH_JSON
        } else {
            REMEDY_JSON
        };
        Ok(Completion {
            provider: "agronomist".to_string(),
            text: format!("Here is my assessment:\n```json\n{}\n```\nGood luck!", payload),
            token_cost: 321,
        })
    }
}

#[derive(Debug)]
struct Unreachable;

#[async_trait::async_trait]
impl CompletionClient for Unreachable {
    fn name(&self) -> &str {
        "unreachable"
    }

    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Completion> {
        anyhow::bail!("API error (503 Service Unavailable): overloaded")
    }
}

#[derive(Debug)]
struct Sluggish;

#[async_trait::async_trait]
impl CompletionClient for Sluggish {
    fn name(&self) -> &str {
        "sluggish"
    }

    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Completion> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        anyhow::bail!("should have been abandoned")
    }
}

#[derive(Debug)]
struct Rambling(String);

#[async_trait::async_trait]
impl CompletionClient for Rambling {
    fn name(&self) -> &str {
        "rambling"
    }

    async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Completion> {
        Ok(Completion {
            provider: "rambling".to_string(),
            text: self.0.clone(),
            token_cost: 0,
        })
    }
}

fn gateway(client: impl CompletionClient + 'static) -> AiGateway {
    AiGateway::new(Some(Arc::new(client)), Duration::from_millis(200))
}

fn fallback(reason: FallbackReason) -> Provenance {
    Provenance::Fallback { reason }
}

fn field_set(value: &impl Serialize) -> BTreeSet<String> {
    fn keys(value: &Value) -> BTreeSet<String> {
        match value {
            Value::Object(map) => map.keys().cloned().collect(),
            Value::Array(items) => items.iter().flat_map(keys).collect(),
            _ => BTreeSet::new(),
        }
    }
    keys(&serde_json::to_value(value).unwrap())
}

#[tokio::test]
async fn test_ai_answers_are_used_when_valid() {
    let gateway = gateway(Agronomist::default());

    let land = gateway.analyze_land("laterite slope", "Ratnagiri").await;
    assert_eq!(
        land.provenance,
        Provenance::Ai {
            provider: "agronomist".to_string()
        }
    );
    assert_eq!(land.value.soil.soil_type, "Red Laterite");
    assert_eq!(land.value.soil.ph_level(), 5.9);

    let crops = gateway.recommend_crops("Red", "Ratnagiri", "Kharif", 2.0).await;
    assert!(crops.provenance.is_ai());
    let names: Vec<&str> = crops.value.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Finger Millet", "Groundnut", "Cowpea"]);

    let growth = gateway
        .growth_insights("Maize", "Vegetative", 40, "Healthy", "Humid")
        .await;
    assert_eq!(growth.value.next_milestone, "Tasselling in 12 days");

    let remedy = gateway.organic_solution("root rot", "Maize", "Medium").await;
    assert_eq!(remedy.value.solution_name, "Trichoderma Drench");
    assert_eq!(remedy.value.effectiveness_rating(), 4.0);
}

#[tokio::test]
async fn test_every_failure_mode_falls_back_to_the_engine() {
    let engine = AdvisoryEngine::new();
    let cases = vec![
        (AiGateway::disabled(), FallbackReason::Disabled),
        (gateway(Unreachable), FallbackReason::Transport),
        (gateway(Sluggish), FallbackReason::Timeout),
        (
            gateway(Rambling("I'd love to help, but I need more details.".into())),
            FallbackReason::Contract,
        ),
        (
            gateway(Rambling(r#"{"soilType": "Clay", "phLevel": "#.into())),
            FallbackReason::Contract,
        ),
    ];

    for (gateway, reason) in cases {
        let land = gateway.analyze_land("flat black soil", "Akola").await;
        assert_eq!(land.provenance, fallback(reason));
        assert_eq!(land.value, engine.analyze_land("flat black soil", "Akola"));

        let crops = gateway.recommend_crops("Black", "Akola", "Winter", 4.0).await;
        assert_eq!(crops.provenance, fallback(reason));
        assert_eq!(crops.value, engine.recommend_crops("Black", "Akola", "Winter", 4.0));

        let growth = gateway
            .growth_insights("Wheat", "Seedling", 12, "Good", "Cold")
            .await;
        assert_eq!(growth.provenance, fallback(reason));
        assert_eq!(growth.value.next_milestone, "Vegetative growth in 10-15 days");

        let remedy = gateway.organic_solution("leaf disease", "Wheat", "Low").await;
        assert_eq!(remedy.provenance, fallback(reason));
        assert_eq!(remedy.value.solution_name, "Baking Soda Fungicide");
    }
}

#[tokio::test]
async fn test_fallback_and_ai_share_the_same_field_set() {
    let ai = gateway(Agronomist::default());
    let off = AiGateway::disabled();

    assert_eq!(
        field_set(&ai.analyze_land("x", "y").await.value),
        field_set(&off.analyze_land("x", "y").await.value)
    );
    assert_eq!(
        field_set(&ai.recommend_crops("x", "y", "Summer", 1.0).await.value),
        field_set(&off.recommend_crops("x", "y", "Summer", 1.0).await.value)
    );
    assert_eq!(
        field_set(&ai.growth_insights("x", "y", 1, "z", "w").await.value),
        field_set(&off.growth_insights("x", "y", 1, "z", "w").await.value)
    );
    assert_eq!(
        field_set(&ai.organic_solution("x", "y", "z").await.value),
        field_set(&off.organic_solution("x", "y", "z").await.value)
    );
}

#[tokio::test]
async fn test_too_few_items_is_a_contract_fallback() {
    let engine = AdvisoryEngine::new();

    let land = gateway(Rambling(LAND_JSON.replace(
        r#"["Mulch heavily","Add lime at 1 t/acre","Sow a green manure before monsoon"]"#,
        r#"["only one"]"#,
    )))
    .analyze_land("laterite slope", "Ratnagiri")
    .await;
    assert_eq!(land.provenance, fallback(FallbackReason::Contract));
    assert_eq!(land.value, engine.analyze_land("laterite slope", "Ratnagiri"));

    let land = gateway(Rambling(LAND_JSON.replace(
        r#"["Cashew","Finger Millet","Groundnut","Cowpea"]"#,
        r#"["Rice"]"#,
    )))
    .analyze_land("laterite slope", "Ratnagiri")
    .await;
    assert_eq!(land.provenance, fallback(FallbackReason::Contract));

    let growth = gateway(Rambling(
        r#"{"insights":["a"],"recommendations":["b"],"nextMilestone":"Tasselling","estimatedHarvestDate":"In 48 days"}"#
            .into(),
    ))
    .growth_insights("Maize", "Vegetative", 40, "Healthy", "Humid")
    .await;
    assert_eq!(growth.provenance, fallback(FallbackReason::Contract));
    assert_eq!(growth.value.insights.len(), 4);
}

#[tokio::test]
async fn test_timeout_does_not_wait_for_the_provider() {
    let gateway = gateway(Sluggish);
    let started = std::time::Instant::now();
    let advice = gateway.organic_solution("aphids", "Beans", "High").await;
    assert_eq!(advice.provenance, fallback(FallbackReason::Timeout));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_soil_photos_are_forwarded() {
    let client = Arc::new(Agronomist::default());
    let service = AdvisoryService::new(AiGateway::new(
        Some(client.clone()),
        Duration::from_millis(200),
    ));

    let request = LandAnalysisRequest {
        description: "sandy loam".to_string(),
        location: "Jaipur".to_string(),
        soil_photos: vec![InlineImage::jpeg("AAAA"), InlineImage::jpeg("BBBB")],
    };
    let advice = service.analyze_land(None, &request).await;

    assert!(advice.provenance.is_ai());
    assert_eq!(*client.images_seen.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn test_crop_photos_are_forwarded() {
    let client = Arc::new(Agronomist::default());
    let service = AdvisoryService::new(AiGateway::new(
        Some(client.clone()),
        Duration::from_millis(200),
    ));

    let request = GrowthInsightRequest {
        crop_name: "Maize".to_string(),
        current_stage: "Vegetative".to_string(),
        days_since_planting: 40,
        crop_photos: vec![InlineImage::jpeg("CCCC")],
        ..Default::default()
    };
    let advice = service.growth_insights(None, &request).await;

    assert!(advice.provenance.is_ai());
    assert_eq!(advice.value.insights.len(), 3);
    assert_eq!(*client.images_seen.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn test_service_ranks_ai_candidates_on_request() {
    let service = AdvisoryService::new(gateway(Agronomist::default()));

    let by_demand = service
        .recommend_crops(
            None,
            &CropRecommendationRequest {
                season: "Kharif".to_string(),
                rank_by: Some(RankPolicy::MarketDemand),
                ..Default::default()
            },
        )
        .await;
    let names: Vec<&str> = by_demand.value.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Cowpea", "Groundnut", "Finger Millet"]);

    let top = service
        .recommend_crops(
            None,
            &CropRecommendationRequest {
                season: "Kharif".to_string(),
                rank_by: Some(RankPolicy::Profit),
                limit: Some(1),
                ..Default::default()
            },
        )
        .await;
    assert_eq!(top.value.len(), 1);
    assert_eq!(top.value[0].name, "Cowpea");
    assert!(top.provenance.is_ai());
}

#[tokio::test]
async fn test_service_persists_for_known_users() {
    let store = Arc::new(MemoryStore::new());
    let service = AdvisoryService::new(AiGateway::disabled()).with_store(store.clone());
    let user = UserId::new();

    service
        .analyze_land(
            Some(user),
            &LandAnalysisRequest {
                description: "Terraced plot, pH 5.5".to_string(),
                location: "Darjeeling".to_string(),
                ..Default::default()
            },
        )
        .await;
    service
        .recommend_crops(
            Some(user),
            &CropRecommendationRequest {
                season: "Winter".to_string(),
                rank_by: Some(RankPolicy::Profit),
                ..Default::default()
            },
        )
        .await;
    service
        .growth_insights(
            Some(user),
            &GrowthInsightRequest {
                crop_name: "Tea".to_string(),
                current_stage: "Flushing".to_string(),
                days_since_planting: 30,
                ..Default::default()
            },
        )
        .await;
    service
        .organic_solution(
            Some(user),
            &OrganicSolutionRequest {
                problem: "tea mosquito bug pest".to_string(),
                crop_type: "Tea".to_string(),
                severity: "High".to_string(),
            },
        )
        .await;

    let lands = store.lands_for(user).await.unwrap();
    assert_eq!(lands.len(), 1);
    assert_eq!(lands[0].analysis.soil.ph_level(), 5.5);
    assert_eq!(lands[0].provenance, fallback(FallbackReason::Disabled));

    let crop = AdvisoryEngine::new()
        .recommend_crops("", "", "Winter", 1.0)
        .remove(1);
    let plan = service
        .create_crop_plan(
            user,
            CropPlanRequest {
                land_id: lands[0].id,
                crop,
            },
        )
        .await
        .unwrap();
    assert_eq!(plan.crop.name, "Mustard");

    let dashboard = service.dashboard(user).await.unwrap();
    assert_eq!(dashboard.lands.len(), 1);
    assert_eq!(dashboard.plans.len(), 1);
    assert_eq!(dashboard.recommendations.len(), 1);
    assert_eq!(dashboard.recommendations[0].season, "Winter");
    assert_eq!(
        dashboard.recommendations[0].provenance,
        fallback(FallbackReason::Disabled)
    );
    assert_eq!(dashboard.tracking.len(), 1);
    assert_eq!(dashboard.remedies.len(), 1);
    assert_eq!(dashboard.remedies[0].remedy.solution_name, "Neem Oil Spray");
}
