//! AgriSense Core - deterministic agricultural advice
//!
//! AgriSense Core holds everything in the advisory pipeline that does not
//! touch the network: the data model, a rule-based Advisory Engine, the
//! ranking policies, and the response contracts used to check completion
//! output before it is trusted.
//!
//! # Architecture
//!
//! 1. **Contracts** (`contract`): extract the first JSON span from free text and
//!    validate it against a strict wire shape
//! 2. **Engine** (`engine`): total, table-driven fallback for every operation
//! 3. **Classifier** (`classifier`): ordered problem classification for remedies
//! 4. **Ranking** (`ranking`): stable presentation order for crops and remedies
//!
//! # Quick Start
//!
//! ```
//! use agrisense_core::engine::AdvisoryEngine;
//! use agrisense_core::ranking::Ranking;
//!
//! let engine = AdvisoryEngine::new();
//!
//! let analysis = engine.analyze_land("Well drained field, pH 6.4", "Nashik");
//! assert_eq!(analysis.soil.ph_level(), 6.4);
//!
//! let crops = engine.recommend_crops(&analysis.soil.soil_type, "Nashik", "Winter", 2.5);
//! let top = Ranking::top_by_profit(1).apply(crops);
//! assert_eq!(top[0].name, "Wheat");
//! ```

#![deny(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod classifier;
pub mod contract;
pub mod engine;
pub mod error;
pub mod ranking;
pub mod types;

pub use classifier::{classify, ProblemCategory};
pub use contract::Shape;
pub use engine::AdvisoryEngine;
pub use error::{ContractError, Result};
pub use ranking::{RankPolicy, Ranking};
pub use types::{
    CropCandidate, Difficulty, FertilityLevel, GrowthInsight, LandAnalysisResult, MoistureLevel,
    OrganicRemedy, Season, SoilProfile, WaterNeeds,
};
