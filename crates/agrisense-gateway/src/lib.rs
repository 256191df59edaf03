//! AgriSense Gateway - HTTP front for agricultural advice
//!
//! Exposes the advisory service over JSON:
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /health` | liveness and whether a completion provider is configured |
//! | `POST /api/land/analyze` | soil profile and suggestions for a parcel |
//! | `POST /api/crops/recommend` | crop candidates for a season, optionally ranked |
//! | `POST /api/crops/plan` | start a crop plan on a registered parcel |
//! | `POST /api/growth/insights` | progress notes for a growing crop |
//! | `POST /api/organic/solution` | organic remedy for a pest, disease or deficiency |
//! | `GET /api/organic/solutions` | fixed remedy catalog, most effective first |
//! | `GET /api/dashboard` | everything stored for the caller |
//!
//! Advisory routes always answer 200. The `x-advice-source` response header
//! says whether the answer came from the completion provider (`ai`) or the
//! deterministic engine (`fallback`).

pub mod config;
pub mod error;
pub mod gateway;
pub mod identity;

pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayState, ADVICE_SOURCE_HEADER};
pub use identity::{MaybeUser, RequireUser, USER_ID_HEADER};

/// Gateway version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8080;

/// Default host
pub const DEFAULT_HOST: &str = "127.0.0.1";
