pub use aggregation::identity::{IdentityMap, IdentityResolver, RosterSource};
pub use aggregation::rehost::{MapOverview, Quarantine, RehostFlag, RoundOverview};
pub use aggregation::season::Season;
pub use config::EngineConfig;
pub use engine::{BatchOutcome, BatchReport, RejectedMatch, StatsEngine};
pub use error::{Result, StatsError};
pub use model::*;

pub mod aggregation;
mod config;
mod engine;
mod error;
mod model;
