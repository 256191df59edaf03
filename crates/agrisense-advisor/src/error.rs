//! Error types for the advisor

use agrisense_core::ContractError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::store::LandId;

/// Why an AI attempt did not produce a result. Never reaches callers of the
/// advisory operations; it only decides the fallback reason and the log line.
#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("no completion client configured")]
    Disabled,

    #[error("completion request failed: {0:#}")]
    Transport(anyhow::Error),

    #[error("completion timed out after {0:?}")]
    Timeout(Duration),

    #[error("completion broke its response contract: {0}")]
    Contract(#[from] ContractError),
}

impl AdvisorError {
    pub fn reason(&self) -> FallbackReason {
        match self {
            AdvisorError::Disabled => FallbackReason::Disabled,
            AdvisorError::Transport(_) => FallbackReason::Transport,
            AdvisorError::Timeout(_) => FallbackReason::Timeout,
            AdvisorError::Contract(_) => FallbackReason::Contract,
        }
    }
}

/// Coarse reason a result came from the deterministic engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    Disabled,
    Transport,
    Timeout,
    Contract,
}

/// Persistence collaborator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no advisory store configured")]
    Unavailable,

    #[error("land not found: {0}")]
    LandNotFound(LandId),

    #[error("storage backend error: {0}")]
    Backend(String),
}
