//! AI gateway with deterministic fallback
//!
//! Every operation makes at most one completion attempt, bounded by a timeout.
//! Whatever goes wrong (no client, transport failure, timeout, or output that
//! breaks its contract) the caller gets the [`AdvisoryEngine`] answer instead,
//! tagged with the reason. Callers never see an error.

use agrisense_core::contract;
use agrisense_core::{
    AdvisoryEngine, CropCandidate, GrowthInsight, LandAnalysisResult, OrganicRemedy,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{AdvisorConfig, DEFAULT_TIMEOUT_SECS};
use crate::error::{AdvisorError, FallbackReason};
use crate::llm::{CompletionClient, CompletionRequest, InlineImage};
use crate::prompts;

/// Where an advisory answer came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum Provenance {
    Ai { provider: String },
    Fallback { reason: FallbackReason },
}

impl Provenance {
    pub fn is_ai(&self) -> bool {
        matches!(self, Provenance::Ai { .. })
    }

    /// Short label for response headers and log fields
    pub fn label(&self) -> &'static str {
        match self {
            Provenance::Ai { .. } => "ai",
            Provenance::Fallback { .. } => "fallback",
        }
    }
}

/// An advisory value together with its provenance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Advice<T> {
    pub value: T,
    pub provenance: Provenance,
}

impl<T> Advice<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Advice<U> {
        Advice {
            value: f(self.value),
            provenance: self.provenance,
        }
    }
}

type Parser<T> = fn(&str) -> agrisense_core::Result<T>;

#[derive(Debug, Clone)]
pub struct AiGateway {
    client: Option<Arc<dyn CompletionClient>>,
    engine: AdvisoryEngine,
    timeout: Duration,
}

impl Default for AiGateway {
    fn default() -> Self {
        Self::disabled()
    }
}

impl AiGateway {
    pub fn new(client: Option<Arc<dyn CompletionClient>>, timeout: Duration) -> Self {
        Self {
            client,
            engine: AdvisoryEngine::new(),
            timeout,
        }
    }

    /// Engine-only gateway
    pub fn disabled() -> Self {
        Self::new(None, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn from_config(config: &AdvisorConfig) -> anyhow::Result<Self> {
        Ok(Self::new(config.build_client()?, config.timeout()))
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn provider_name(&self) -> Option<&str> {
        self.client.as_deref().map(|client| client.name())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn analyze_land(
        &self,
        description: &str,
        location: &str,
    ) -> Advice<LandAnalysisResult> {
        self.analyze_land_with_photos(description, location, &[])
            .await
    }

    pub async fn analyze_land_with_photos(
        &self,
        description: &str,
        location: &str,
        photos: &[InlineImage],
    ) -> Advice<LandAnalysisResult> {
        self.advise(
            "land_analysis",
            || prompts::land_analysis(description, location, photos),
            contract::parse_land_analysis,
            || self.engine.analyze_land(description, location),
        )
        .await
    }

    /// Candidates in the order the source produced them; ranking is the
    /// caller's choice.
    pub async fn recommend_crops(
        &self,
        soil_type: &str,
        location: &str,
        season: &str,
        land_size_acres: f64,
    ) -> Advice<Vec<CropCandidate>> {
        let acres = sanitize_acres(land_size_acres);
        self.advise(
            "crop_recommendations",
            || prompts::crop_recommendations(soil_type, location, season, acres),
            contract::parse_crop_candidates,
            || self.engine.recommend_crops(soil_type, location, season, acres),
        )
        .await
    }

    pub async fn growth_insights(
        &self,
        crop_name: &str,
        current_stage: &str,
        days_since_planting: i64,
        health_status: &str,
        weather_conditions: &str,
    ) -> Advice<GrowthInsight> {
        self.growth_insights_with_photos(
            crop_name,
            current_stage,
            days_since_planting,
            health_status,
            weather_conditions,
            &[],
        )
        .await
    }

    /// Photos only reach the completion service; the engine ignores them.
    pub async fn growth_insights_with_photos(
        &self,
        crop_name: &str,
        current_stage: &str,
        days_since_planting: i64,
        health_status: &str,
        weather_conditions: &str,
        photos: &[InlineImage],
    ) -> Advice<GrowthInsight> {
        self.advise(
            "growth_insights",
            || {
                prompts::growth_insights(
                    crop_name,
                    current_stage,
                    days_since_planting,
                    health_status,
                    weather_conditions,
                    photos,
                )
            },
            contract::parse_growth_insight,
            || {
                self.engine.growth_insights(
                    crop_name,
                    current_stage,
                    days_since_planting,
                    health_status,
                    weather_conditions,
                )
            },
        )
        .await
    }

    pub async fn organic_solution(
        &self,
        problem: &str,
        crop_type: &str,
        severity: &str,
    ) -> Advice<OrganicRemedy> {
        self.advise(
            "organic_solution",
            || prompts::organic_solution(problem, crop_type, severity),
            contract::parse_organic_remedy,
            || self.engine.organic_solution(problem, crop_type, severity),
        )
        .await
    }

    async fn advise<T>(
        &self,
        operation: &'static str,
        request: impl FnOnce() -> CompletionRequest,
        parse: Parser<T>,
        fallback: impl FnOnce() -> T,
    ) -> Advice<T> {
        match self.attempt(operation, request, parse).await {
            Ok((value, provider)) => Advice {
                value,
                provenance: Provenance::Ai { provider },
            },
            Err(error) => {
                let reason = error.reason();
                if reason == FallbackReason::Disabled {
                    tracing::debug!(operation, "AI disabled; answering from the advisory engine");
                } else {
                    tracing::warn!(
                        operation,
                        ?reason,
                        "AI attempt failed, answering from the advisory engine: {}",
                        error
                    );
                }
                Advice {
                    value: fallback(),
                    provenance: Provenance::Fallback { reason },
                }
            }
        }
    }

    async fn attempt<T>(
        &self,
        operation: &'static str,
        request: impl FnOnce() -> CompletionRequest,
        parse: Parser<T>,
    ) -> Result<(T, String), AdvisorError> {
        let client = self.client.as_ref().ok_or(AdvisorError::Disabled)?;
        let request = request();
        tracing::debug!(
            operation,
            provider = client.name(),
            images = request.images.len(),
            "sending completion request"
        );

        let completion = tokio::time::timeout(self.timeout, client.complete(&request))
            .await
            .map_err(|_| AdvisorError::Timeout(self.timeout))?
            .map_err(AdvisorError::Transport)?;

        tracing::debug!(
            operation,
            provider = %completion.provider,
            tokens = completion.token_cost,
            "completion received"
        );

        let value = parse(&completion.text)?;
        Ok((value, completion.provider))
    }
}

/// Negative, NaN and infinite sizes all become zero acres.
fn sanitize_acres(acres: f64) -> f64 {
    if acres.is_finite() {
        acres.max(0.0)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Completion;

    #[derive(Debug)]
    struct Canned(&'static str);

    #[async_trait::async_trait]
    impl CompletionClient for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn complete(&self, _request: &CompletionRequest) -> anyhow::Result<Completion> {
            Ok(Completion {
                provider: "canned".to_string(),
                text: self.0.to_string(),
                token_cost: 0,
            })
        }
    }

    #[tokio::test]
    async fn test_disabled_gateway_uses_engine() {
        let gateway = AiGateway::disabled();
        assert!(!gateway.is_ai_enabled());

        let advice = gateway
            .organic_solution("aphid pest infestation", "Okra", "High")
            .await;
        assert_eq!(advice.value.solution_name, "Neem Oil Spray");
        assert_eq!(
            advice.provenance,
            Provenance::Fallback {
                reason: FallbackReason::Disabled
            }
        );
        assert_eq!(advice.provenance.label(), "fallback");
    }

    #[tokio::test]
    async fn test_valid_completion_is_used() {
        let gateway = AiGateway::new(
            Some(Arc::new(Canned(
                r#"Sure! {"solution":"Garlic Chilli Spray","ingredients":["garlic","green chilli"],"instructions":"Blend and strain","effectiveness":4,"applicationMethod":"Spray at dusk"}"#,
            ))),
            Duration::from_secs(1),
        );
        assert_eq!(gateway.provider_name(), Some("canned"));

        let advice = gateway.organic_solution("aphids", "Chilli", "Low").await;
        assert!(advice.provenance.is_ai());
        assert_eq!(advice.value.solution_name, "Garlic Chilli Spray");
    }

    #[tokio::test]
    async fn test_contract_breach_falls_back() {
        let gateway = AiGateway::new(
            Some(Arc::new(Canned(r#"{"insights": []}"#))),
            Duration::from_secs(1),
        );
        let advice = gateway
            .growth_insights("Tomato", "Seedling", 10, "Healthy", "Mild")
            .await;
        assert_eq!(
            advice.provenance,
            Provenance::Fallback {
                reason: FallbackReason::Contract
            }
        );
        assert_eq!(advice.value.next_milestone, "Vegetative growth in 10-15 days");
    }

    #[test]
    fn test_provenance_serialization() {
        let value = serde_json::to_value(Provenance::Fallback {
            reason: FallbackReason::Timeout,
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"source": "fallback", "reason": "timeout"}));
    }

    #[test]
    fn test_sanitize_acres() {
        assert_eq!(sanitize_acres(-3.0), 0.0);
        assert_eq!(sanitize_acres(f64::NAN), 0.0);
        assert_eq!(sanitize_acres(f64::INFINITY), 0.0);
        assert_eq!(sanitize_acres(2.5), 2.5);
    }

    #[test]
    fn test_advice_map_keeps_provenance() {
        let advice = Advice {
            value: vec![1, 2, 3],
            provenance: Provenance::Ai {
                provider: "x".to_string(),
            },
        };
        let mapped = advice.map(|v| v.len());
        assert_eq!(mapped.value, 3);
        assert!(mapped.provenance.is_ai());
    }
}
