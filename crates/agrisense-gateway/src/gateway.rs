//! Main Gateway implementation
//!
//! JSON-over-HTTP front for the advisory service.

use agrisense_advisor::service::{
    CropPlanRequest, CropRecommendationRequest, GrowthInsightRequest, LandAnalysisRequest,
    OrganicSolutionRequest,
};
use agrisense_advisor::{Advice, AdvisoryService, AiGateway, Dashboard, MemoryStore};
use agrisense_core::OrganicRemedy;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::identity::{MaybeUser, RequireUser};
use crate::{GatewayError, Result};

/// Response header carrying `ai` or `fallback`
pub const ADVICE_SOURCE_HEADER: &str = "x-advice-source";

/// Soil photos arrive base64 encoded inside JSON bodies.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Gateway state shared across handlers
#[derive(Debug, Clone)]
pub struct GatewayState {
    pub config: GatewayConfig,
    pub service: Arc<AdvisoryService>,
}

/// Main Gateway
#[derive(Debug, Clone)]
pub struct Gateway {
    state: Arc<GatewayState>,
}

impl Gateway {
    /// Wire a gateway around an already-built service
    pub fn new(config: GatewayConfig, service: AdvisoryService) -> Self {
        Self {
            state: Arc::new(GatewayState {
                config,
                service: Arc::new(service),
            }),
        }
    }

    /// Build the completion client and store described by `config`
    pub fn from_config(config: GatewayConfig) -> Result<Self> {
        let ai = AiGateway::from_config(&config.advisor)
            .map_err(|e| GatewayError::InvalidConfig(format!("{:#}", e)))?;

        let mut service = AdvisoryService::new(ai);
        if config.persistence {
            service = service.with_store(Arc::new(MemoryStore::new()));
        }

        Ok(Self::new(config, service))
    }

    /// Get gateway state
    pub fn state(&self) -> Arc<GatewayState> {
        self.state.clone()
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/health", get(Self::handle_health))
            .route("/api/land/analyze", post(Self::handle_land_analysis))
            .route("/api/crops/recommend", post(Self::handle_crop_recommendations))
            .route("/api/crops/plan", post(Self::handle_crop_plan))
            .route("/api/growth/insights", post(Self::handle_growth_insights))
            .route("/api/organic/solution", post(Self::handle_organic_solution))
            .route("/api/organic/solutions", get(Self::handle_remedy_catalog))
            .route("/api/dashboard", get(Self::handle_dashboard))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Start the gateway server and run until Ctrl+C
    pub async fn start(&self) -> Result<()> {
        let addr = self.state.config.socket_addr()?;
        let router = self.build_router();

        tracing::info!(
            ai_enabled = self.state.service.gateway().is_ai_enabled(),
            persistence = self.state.service.has_store(),
            "AgriSense gateway starting on {}",
            addr
        );

        let listener = tokio::net::TcpListener::bind(addr).await?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| GatewayError::Internal(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    // HTTP handlers

    async fn handle_health(State(state): State<Arc<GatewayState>>) -> impl IntoResponse {
        Json(serde_json::json!({
            "status": "healthy",
            "version": crate::VERSION,
            "aiEnabled": state.service.gateway().is_ai_enabled(),
        }))
    }

    async fn handle_land_analysis(
        State(state): State<Arc<GatewayState>>,
        MaybeUser(user): MaybeUser,
        Json(request): Json<LandAnalysisRequest>,
    ) -> Response {
        advised(state.service.analyze_land(user, &request).await)
    }

    async fn handle_crop_recommendations(
        State(state): State<Arc<GatewayState>>,
        MaybeUser(user): MaybeUser,
        Json(request): Json<CropRecommendationRequest>,
    ) -> Response {
        advised(state.service.recommend_crops(user, &request).await)
    }

    async fn handle_crop_plan(
        State(state): State<Arc<GatewayState>>,
        RequireUser(user): RequireUser,
        Json(request): Json<CropPlanRequest>,
    ) -> Result<impl IntoResponse> {
        let plan = state.service.create_crop_plan(user, request).await?;
        Ok((StatusCode::CREATED, Json(plan)))
    }

    async fn handle_growth_insights(
        State(state): State<Arc<GatewayState>>,
        MaybeUser(user): MaybeUser,
        Json(request): Json<GrowthInsightRequest>,
    ) -> Response {
        advised(state.service.growth_insights(user, &request).await)
    }

    async fn handle_organic_solution(
        State(state): State<Arc<GatewayState>>,
        MaybeUser(user): MaybeUser,
        Json(request): Json<OrganicSolutionRequest>,
    ) -> Response {
        advised(state.service.organic_solution(user, &request).await)
    }

    async fn handle_remedy_catalog(
        State(state): State<Arc<GatewayState>>,
    ) -> Json<Vec<OrganicRemedy>> {
        Json(state.service.remedy_catalog())
    }

    async fn handle_dashboard(
        State(state): State<Arc<GatewayState>>,
        RequireUser(user): RequireUser,
    ) -> Result<Json<Dashboard>> {
        Ok(Json(state.service.dashboard(user).await?))
    }
}

/// Body is the bare value; provenance travels in a header.
fn advised<T: Serialize>(advice: Advice<T>) -> Response {
    (
        [(ADVICE_SOURCE_HEADER, advice.provenance.label())],
        Json(advice.value),
    )
        .into_response()
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", error);
        std::future::pending::<()>().await;
    }
    tracing::info!("Gateway shutdown initiated");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_creation() {
        let gateway = Gateway::from_config(GatewayConfig::default()).unwrap();
        let state = gateway.state();
        assert!(!state.service.gateway().is_ai_enabled());
        assert!(state.service.has_store());
    }

    #[test]
    fn test_persistence_can_be_disabled() {
        let gateway = Gateway::from_config(GatewayConfig::new().with_persistence(false)).unwrap();
        assert!(!gateway.state().service.has_store());
    }
}
