use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One map recording as produced by the external replay decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedMatch {
    #[serde(default)]
    pub rounds: Vec<DecodedRound>,
}

impl DecodedMatch {
    /// Parse the decoder's JSON output.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Map name as reported by the final round.
    pub fn map_name(&self) -> Option<&str> {
        self.rounds
            .last()
            .and_then(|r| r.map.as_ref())
            .map(|m| m.name.as_str())
    }
}

/// A single round of a decoded recording.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedRound {
    #[serde(rename = "recordingProfileID", default)]
    pub recording_profile_id: String,
    #[serde(default)]
    pub additional_tags: Option<Vec<String>>,
    pub timestamp: Option<String>,
    pub round_number: Option<u32>,
    pub map: Option<MapInfo>,
    pub site: Option<String>,
    #[serde(default)]
    pub teams: Vec<DecodedTeam>,
    #[serde(default)]
    pub players: Vec<DecodedPlayer>,
    #[serde(default)]
    pub stats: Vec<DecodedPlayerRound>,
    /// Detailed event feed; absent for rounds recorded without feedback.
    #[serde(default)]
    pub match_feedback: Option<Vec<FeedbackEvent>>,
}

/// Map played in a round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    pub name: String,
}

/// Team state at the end of a round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedTeam {
    #[serde(default)]
    pub name: String,
    pub score: Option<u32>,
    #[serde(default)]
    pub won: bool,
    pub role: Option<Side>,
}

/// A player taking part in a round, with the index of their team in `teams`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedPlayer {
    pub username: String,
    pub team_index: usize,
}

/// Per-player counters for a single round.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecodedPlayerRound {
    pub username: String,
    #[serde(default)]
    pub kills: u32,
    #[serde(default)]
    pub died: bool,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub headshots: u32,
}

/// An entry of the round's event feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackEvent {
    #[serde(rename = "type")]
    pub kind: FeedbackType,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub time_in_seconds: f64,
}

/// Wrapper around the feed event kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackType {
    pub name: FeedbackKind,
}

/// Event kinds the engine cares about; anything else is kept as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedbackKind {
    Kill,
    /// Death without a killer, i.e. a suicide.
    Death,
    DefuserPlantComplete,
    DefuserDisableComplete,
    #[serde(other)]
    Other,
}

/// Which side a team played in a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Attack,
    Defense,
}
