//! Recommendation ranking
//!
//! Presentation order for crop and remedy lists, applied only when a caller
//! asks for ranked output. All sorts are stable, so candidates that compare
//! equal keep the order the engine (or the completion) produced them in.
//! Narrative sequences such as `recommendations` and `insights` are never
//! reordered.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::types::{CropCandidate, OrganicRemedy};

/// Primary sort key for crop rankings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RankPolicy {
    /// Market demand, then profit
    #[default]
    MarketDemand,
    /// Profit, then market demand
    Profit,
}

/// A ranking request: policy plus optional cut-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ranking {
    /// Sort key
    pub policy: RankPolicy,
    /// Keep only the first `limit` entries
    pub limit: Option<usize>,
}

impl Ranking {
    /// Rank by market demand, no limit
    pub fn by_market_demand() -> Self {
        Self::default()
    }

    /// Top `n` by profit
    pub fn top_by_profit(n: usize) -> Self {
        Self {
            policy: RankPolicy::Profit,
            limit: Some(n),
        }
    }

    /// Apply this ranking to a candidate list.
    pub fn apply(&self, candidates: Vec<CropCandidate>) -> Vec<CropCandidate> {
        let mut ranked = match self.policy {
            RankPolicy::MarketDemand => rank_crops(candidates),
            RankPolicy::Profit => rank_crops_by_profit(candidates),
        };
        if let Some(limit) = self.limit {
            ranked.truncate(limit);
        }
        ranked
    }
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

/// Market demand descending, then profit descending, then original order.
pub fn rank_crops(mut candidates: Vec<CropCandidate>) -> Vec<CropCandidate> {
    candidates.sort_by(|a, b| {
        descending(a.market_demand_score(), b.market_demand_score()).then_with(|| {
            descending(a.expected_profit_per_acre(), b.expected_profit_per_acre())
        })
    });
    candidates
}

/// Profit descending, then market demand descending, then original order.
pub fn rank_crops_by_profit(mut candidates: Vec<CropCandidate>) -> Vec<CropCandidate> {
    candidates.sort_by(|a, b| {
        descending(a.expected_profit_per_acre(), b.expected_profit_per_acre()).then_with(|| {
            descending(a.market_demand_score(), b.market_demand_score())
        })
    });
    candidates
}

/// Effectiveness descending, then original order.
pub fn rank_remedies(mut remedies: Vec<OrganicRemedy>) -> Vec<OrganicRemedy> {
    remedies.sort_by(|a, b| descending(a.effectiveness_rating(), b.effectiveness_rating()));
    remedies
}
