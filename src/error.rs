/// All errors that can occur while aggregating replay statistics.
#[derive(thiserror::Error, Debug)]
pub enum StatsError {
    /// No roster data is available, so no username can be resolved.
    #[error("cannot resolve {username}: roster is empty")]
    UnresolvedIdentity { username: String },

    /// A round is missing data required for aggregation (map, scores, ...).
    #[error("malformed round data in round {round}: {context}")]
    MalformedRoundData { round: u32, context: &'static str },

    /// The match identifier has already been committed to the season.
    #[error("match {match_id} has already been processed")]
    DuplicateMatch { match_id: String },

    /// Decoder output could not be deserialized.
    #[error("failed to decode match data: {0}")]
    Decode(#[from] serde_json::Error),

    /// The match start timestamp could not be parsed.
    #[error("failed to parse match timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

impl StatsError {
    /// Fatal errors abort the whole aggregation run instead of a single match.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StatsError::UnresolvedIdentity { .. })
    }

    pub(crate) fn malformed(round: u32, context: &'static str) -> Self {
        StatsError::MalformedRoundData { round, context }
    }
}

pub type Result<T> = std::result::Result<T, StatsError>;
