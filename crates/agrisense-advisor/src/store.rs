//! Persistence collaborator
//!
//! The hosted relational service owns the real tables; the advisor only needs
//! to hand it finished records keyed by opaque user and land identifiers.
//! [`MemoryStore`] is the in-process implementation used by tests and local
//! runs.

use agrisense_core::{
    CropCandidate, GrowthInsight, LandAnalysisResult, OrganicRemedy, ProblemCategory,
};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::adapter::Provenance;
use crate::error::StoreError;

/// Authenticated user, as supplied by the identity collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Registered land parcel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandId(pub Uuid);

impl LandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandRecord {
    pub id: LandId,
    pub user_id: UserId,
    pub location: String,
    pub description: String,
    pub analysis: LandAnalysisResult,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
}

/// Plans are only ever created active; nothing moves them on yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Active,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropPlan {
    pub id: Uuid,
    pub user_id: UserId,
    pub land_id: LandId,
    pub crop: CropCandidate,
    pub status: PlanStatus,
    pub created_at: DateTime<Utc>,
}

impl CropPlan {
    pub fn active(user_id: UserId, land_id: LandId, crop: CropCandidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            land_id,
            crop,
            status: PlanStatus::Active,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRecord {
    pub user_id: UserId,
    pub season: String,
    pub crops: Vec<CropCandidate>,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingRecord {
    pub user_id: UserId,
    pub crop_name: String,
    pub stage: String,
    pub days_since_planting: i64,
    pub insight: GrowthInsight,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemedyRecord {
    pub user_id: UserId,
    pub problem: String,
    pub crop_type: String,
    pub severity: String,
    pub category: ProblemCategory,
    pub remedy: OrganicRemedy,
    pub provenance: Provenance,
    pub created_at: DateTime<Utc>,
}

/// Everything stored for one user, newest first
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub lands: Vec<LandRecord>,
    pub plans: Vec<CropPlan>,
    pub recommendations: Vec<RecommendationRecord>,
    pub tracking: Vec<TrackingRecord>,
    pub remedies: Vec<RemedyRecord>,
}

#[async_trait::async_trait]
pub trait AdvisoryStore: Send + Sync + fmt::Debug {
    async fn save_land(&self, record: LandRecord) -> Result<(), StoreError>;

    async fn lands_for(&self, user: UserId) -> Result<Vec<LandRecord>, StoreError>;

    /// Fails with [`StoreError::LandNotFound`] when the land is not registered
    /// to the plan's user.
    async fn save_crop_plan(&self, plan: CropPlan) -> Result<(), StoreError>;

    async fn plans_for(&self, user: UserId) -> Result<Vec<CropPlan>, StoreError>;

    async fn save_recommendation(&self, record: RecommendationRecord) -> Result<(), StoreError>;

    async fn save_tracking(&self, record: TrackingRecord) -> Result<(), StoreError>;

    async fn save_remedy(&self, record: RemedyRecord) -> Result<(), StoreError>;

    async fn dashboard(&self, user: UserId) -> Result<Dashboard, StoreError>;
}

#[derive(Debug, Default)]
struct UserRecords {
    lands: Vec<LandRecord>,
    plans: Vec<CropPlan>,
    recommendations: Vec<RecommendationRecord>,
    tracking: Vec<TrackingRecord>,
    remedies: Vec<RemedyRecord>,
}

fn newest_first<T: Clone>(items: &[T]) -> Vec<T> {
    items.iter().rev().cloned().collect()
}

/// In-memory store sharded by user
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: DashMap<UserId, UserRecords>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl AdvisoryStore for MemoryStore {
    async fn save_land(&self, record: LandRecord) -> Result<(), StoreError> {
        self.users
            .entry(record.user_id)
            .or_default()
            .lands
            .push(record);
        Ok(())
    }

    async fn lands_for(&self, user: UserId) -> Result<Vec<LandRecord>, StoreError> {
        Ok(self
            .users
            .get(&user)
            .map(|records| newest_first(&records.lands))
            .unwrap_or_default())
    }

    async fn save_crop_plan(&self, plan: CropPlan) -> Result<(), StoreError> {
        let Some(mut records) = self.users.get_mut(&plan.user_id) else {
            return Err(StoreError::LandNotFound(plan.land_id));
        };
        if !records.lands.iter().any(|land| land.id == plan.land_id) {
            return Err(StoreError::LandNotFound(plan.land_id));
        }
        records.plans.push(plan);
        Ok(())
    }

    async fn plans_for(&self, user: UserId) -> Result<Vec<CropPlan>, StoreError> {
        Ok(self
            .users
            .get(&user)
            .map(|records| newest_first(&records.plans))
            .unwrap_or_default())
    }

    async fn save_recommendation(&self, record: RecommendationRecord) -> Result<(), StoreError> {
        self.users
            .entry(record.user_id)
            .or_default()
            .recommendations
            .push(record);
        Ok(())
    }

    async fn save_tracking(&self, record: TrackingRecord) -> Result<(), StoreError> {
        self.users
            .entry(record.user_id)
            .or_default()
            .tracking
            .push(record);
        Ok(())
    }

    async fn save_remedy(&self, record: RemedyRecord) -> Result<(), StoreError> {
        self.users
            .entry(record.user_id)
            .or_default()
            .remedies
            .push(record);
        Ok(())
    }

    async fn dashboard(&self, user: UserId) -> Result<Dashboard, StoreError> {
        Ok(self
            .users
            .get(&user)
            .map(|records| Dashboard {
                lands: newest_first(&records.lands),
                plans: newest_first(&records.plans),
                recommendations: newest_first(&records.recommendations),
                tracking: newest_first(&records.tracking),
                remedies: newest_first(&records.remedies),
            })
            .unwrap_or_default())
    }
}
