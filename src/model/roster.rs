use serde::{Deserialize, Serialize};

/// A team and its registered players, in roster order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterTeam {
    pub team: String,
    pub players: Vec<String>,
}

/// A canonical player and the team they are registered with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RosterEntry {
    pub player: String,
    pub team: String,
}

/// A raw username resolved to its roster entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identity {
    pub player: String,
    pub team: String,
}

/// Emitted when an in-game username only fuzzily matches the roster, so the
/// roster can be corrected out-of-band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub username: String,
    pub canonical: String,
    pub team: String,
    pub similarity: f64,
}
