//! Advisory service façade
//!
//! Takes the wire-level request structs, runs them through the [`AiGateway`],
//! applies any requested ranking, and hands finished answers to the store when
//! both a store and a user are present.

use agrisense_core::ranking::rank_remedies;
use agrisense_core::{
    classify, AdvisoryEngine, CropCandidate, GrowthInsight, LandAnalysisResult, OrganicRemedy,
    RankPolicy, Ranking,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::adapter::{Advice, AiGateway};
use crate::error::StoreError;
use crate::llm::InlineImage;
use crate::store::{
    AdvisoryStore, CropPlan, Dashboard, LandId, LandRecord, RecommendationRecord, RemedyRecord,
    TrackingRecord, UserId,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LandAnalysisRequest {
    pub description: String,
    pub location: String,
    pub soil_photos: Vec<InlineImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CropRecommendationRequest {
    pub soil_type: String,
    pub location: String,
    pub season: String,
    pub land_size_acres: f64,
    pub rank_by: Option<RankPolicy>,
    pub limit: Option<usize>,
}

impl CropRecommendationRequest {
    /// `None` keeps the order the source produced.
    pub fn ranking(&self) -> Option<Ranking> {
        if self.rank_by.is_none() && self.limit.is_none() {
            return None;
        }
        Some(Ranking {
            policy: self.rank_by.unwrap_or_default(),
            limit: self.limit,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GrowthInsightRequest {
    pub crop_name: String,
    pub current_stage: String,
    pub days_since_planting: i64,
    pub health_status: String,
    pub weather_conditions: String,
    pub crop_photos: Vec<InlineImage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganicSolutionRequest {
    pub problem: String,
    pub crop_type: String,
    pub severity: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPlanRequest {
    pub land_id: LandId,
    pub crop: CropCandidate,
}

#[derive(Debug, Clone, Default)]
pub struct AdvisoryService {
    gateway: AiGateway,
    store: Option<Arc<dyn AdvisoryStore>>,
}

impl AdvisoryService {
    pub fn new(gateway: AiGateway) -> Self {
        Self {
            gateway,
            store: None,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn AdvisoryStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn gateway(&self) -> &AiGateway {
        &self.gateway
    }

    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }

    fn store_for(&self, user: Option<UserId>) -> Option<(&dyn AdvisoryStore, UserId)> {
        Some((self.store.as_deref()?, user?))
    }

    fn require_store(&self) -> Result<&dyn AdvisoryStore, StoreError> {
        self.store.as_deref().ok_or(StoreError::Unavailable)
    }

    pub async fn analyze_land(
        &self,
        user: Option<UserId>,
        request: &LandAnalysisRequest,
    ) -> Advice<LandAnalysisResult> {
        let advice = self
            .gateway
            .analyze_land_with_photos(&request.description, &request.location, &request.soil_photos)
            .await;

        if let Some((store, user_id)) = self.store_for(user) {
            let record = LandRecord {
                id: LandId::new(),
                user_id,
                location: request.location.clone(),
                description: request.description.clone(),
                analysis: advice.value.clone(),
                provenance: advice.provenance.clone(),
                created_at: Utc::now(),
            };
            report("land analysis", store.save_land(record).await);
        }

        advice
    }

    pub async fn recommend_crops(
        &self,
        user: Option<UserId>,
        request: &CropRecommendationRequest,
    ) -> Advice<Vec<CropCandidate>> {
        let mut advice = self
            .gateway
            .recommend_crops(
                &request.soil_type,
                &request.location,
                &request.season,
                request.land_size_acres,
            )
            .await;

        if let Some(ranking) = request.ranking() {
            advice = advice.map(|crops| ranking.apply(crops));
        }

        if let Some((store, user_id)) = self.store_for(user) {
            let record = RecommendationRecord {
                user_id,
                season: request.season.clone(),
                crops: advice.value.clone(),
                provenance: advice.provenance.clone(),
                created_at: Utc::now(),
            };
            report("crop recommendations", store.save_recommendation(record).await);
        }

        advice
    }

    pub async fn growth_insights(
        &self,
        user: Option<UserId>,
        request: &GrowthInsightRequest,
    ) -> Advice<GrowthInsight> {
        let advice = self
            .gateway
            .growth_insights_with_photos(
                &request.crop_name,
                &request.current_stage,
                request.days_since_planting,
                &request.health_status,
                &request.weather_conditions,
                &request.crop_photos,
            )
            .await;

        if let Some((store, user_id)) = self.store_for(user) {
            let record = TrackingRecord {
                user_id,
                crop_name: request.crop_name.clone(),
                stage: request.current_stage.clone(),
                days_since_planting: request.days_since_planting,
                insight: advice.value.clone(),
                provenance: advice.provenance.clone(),
                created_at: Utc::now(),
            };
            report("growth tracking", store.save_tracking(record).await);
        }

        advice
    }

    pub async fn organic_solution(
        &self,
        user: Option<UserId>,
        request: &OrganicSolutionRequest,
    ) -> Advice<OrganicRemedy> {
        let advice = self
            .gateway
            .organic_solution(&request.problem, &request.crop_type, &request.severity)
            .await;

        if let Some((store, user_id)) = self.store_for(user) {
            let record = RemedyRecord {
                user_id,
                problem: request.problem.clone(),
                crop_type: request.crop_type.clone(),
                severity: request.severity.clone(),
                category: classify(&request.problem),
                remedy: advice.value.clone(),
                provenance: advice.provenance.clone(),
                created_at: Utc::now(),
            };
            report("organic remedy", store.save_remedy(record).await);
        }

        advice
    }

    /// Fixed remedies, most effective first. Never consults the AI.
    pub fn remedy_catalog(&self) -> Vec<OrganicRemedy> {
        rank_remedies(AdvisoryEngine::new().remedy_catalog())
    }

    pub async fn create_crop_plan(
        &self,
        user: UserId,
        request: CropPlanRequest,
    ) -> Result<CropPlan, StoreError> {
        let store = self.require_store()?;
        let plan = CropPlan::active(user, request.land_id, request.crop);
        store.save_crop_plan(plan.clone()).await?;
        tracing::info!(%user, land = %plan.land_id, crop = %plan.crop.name, "crop plan created");
        Ok(plan)
    }

    pub async fn dashboard(&self, user: UserId) -> Result<Dashboard, StoreError> {
        self.require_store()?.dashboard(user).await
    }
}

fn report(what: &'static str, result: Result<(), StoreError>) {
    if let Err(error) = result {
        tracing::warn!("Failed to persist {}: {}", what, error);
    }
}
