//! AgriSense Advisor - AI-backed agricultural advice
//!
//! Wraps a text/vision completion service around the deterministic
//! [`agrisense_core::AdvisoryEngine`]. Each advisory operation makes one
//! bounded completion attempt, validates the answer against its response
//! contract, and falls back to the engine on any failure. Callers always get
//! an answer, tagged with its [`Provenance`].
//!
//! # Layout
//!
//! - `llm` / `providers`: the completion collaborator and its Gemini and
//!   OpenAI-compatible clients
//! - `config`: provider selection from the environment or a JSON file
//! - `prompts`: one prompt per operation
//! - `adapter`: [`AiGateway`], attempt-then-fallback
//! - `service`: [`AdvisoryService`], ranking and persistence on top
//! - `store`: the persistence collaborator and [`MemoryStore`]
//!
//! ```no_run
//! use agrisense_advisor::{AdvisorConfig, AdvisoryService, AiGateway};
//! use agrisense_advisor::service::OrganicSolutionRequest;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let gateway = AiGateway::from_config(&AdvisorConfig::from_env()?)?;
//! let service = AdvisoryService::new(gateway);
//!
//! let request = OrganicSolutionRequest {
//!     problem: "aphids on new leaves".into(),
//!     crop_type: "Chilli".into(),
//!     severity: "Medium".into(),
//! };
//! let advice = service.organic_solution(None, &request).await;
//! println!("{} ({})", advice.value.solution_name, advice.provenance.label());
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod providers;
pub mod service;
pub mod store;

pub use adapter::{Advice, AiGateway, Provenance};
pub use config::{AdvisorConfig, ProviderConfig};
pub use error::{AdvisorError, FallbackReason, StoreError};
pub use llm::{Completion, CompletionClient, CompletionRequest, InlineImage};
pub use service::AdvisoryService;
pub use store::{AdvisoryStore, Dashboard, LandId, MemoryStore, UserId};
