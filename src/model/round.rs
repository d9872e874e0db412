use std::collections::BTreeMap;

use serde::Serialize;
use strum_macros::Display;

use crate::model::Side;

/// Recording metadata shared by every round of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordingHeader {
    pub profile_id: String,
    pub tags: Vec<String>,
    pub timestamp: String,
}

/// A match normalized into ordered rounds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedMatch {
    pub header: RecordingHeader,
    pub rounds: Vec<ExtractedRound>,
}

impl ExtractedMatch {
    /// Every distinct username appearing in the match, in first-seen order.
    pub fn usernames(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.rounds
            .iter()
            .flat_map(|round| round.usernames())
            .filter(|name| seen.insert(*name))
            .collect()
    }
}

/// One validated round with its events in feed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedRound {
    /// 1-indexed, in source order.
    pub number: u32,
    pub map: String,
    pub site: Option<String>,
    pub teams: Vec<TeamSnapshot>,
    pub participants: Vec<Participant>,
    pub snapshots: Vec<PlayerSnapshot>,
    pub kills: Vec<KillEvent>,
    pub objectives: Vec<ObjectiveEvent>,
    pub self_deaths: Vec<SelfDeath>,
    /// False when the recording carried no event feed for this round.
    pub has_feed: bool,
}

impl ExtractedRound {
    fn usernames(&self) -> impl Iterator<Item = &str> {
        self.participants
            .iter()
            .map(|p| p.username.as_str())
            .chain(self.snapshots.iter().map(|s| s.username.as_str()))
            .chain(
                self.kills
                    .iter()
                    .flat_map(|k| [k.killer.as_str(), k.victim.as_str()]),
            )
            .chain(self.objectives.iter().map(|o| o.username.as_str()))
            .chain(self.self_deaths.iter().map(|d| d.username.as_str()))
    }

    pub fn planted(&self, username: &str) -> bool {
        self.objectives
            .iter()
            .any(|o| o.kind == ObjectiveKind::PlantComplete && o.username == username)
    }
}

/// A team's state at the end of a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSnapshot {
    pub name: String,
    /// Cumulative score after this round.
    pub score: u32,
    pub side: Option<Side>,
    pub won: bool,
}

/// A player listed in a round, with their team index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub username: String,
    pub team_index: usize,
}

/// A player's per-round stat line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSnapshot {
    pub username: String,
    pub kills: u32,
    pub died: bool,
    pub assists: u32,
    pub headshots: u32,
}

/// A kill from the round feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KillEvent {
    pub killer: String,
    pub victim: String,
    /// Round-relative time in seconds.
    pub time: f64,
    pub round: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectiveKind {
    PlantComplete,
    DisableComplete,
}

/// A completed objective, at most one per player and kind per round.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectiveEvent {
    pub username: String,
    pub kind: ObjectiveKind,
    pub round: u32,
}

/// A death without a killer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelfDeath {
    pub username: String,
    pub round: u32,
}

/// Multi-kill tier reached by a player in one round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
pub enum MultiKill {
    #[strum(serialize = "2k")]
    Double,
    #[strum(serialize = "3k")]
    Triple,
    #[strum(serialize = "4k")]
    Quad,
    #[strum(serialize = "ace")]
    Ace,
}

impl MultiKill {
    pub fn from_kills(kills: u32) -> Option<Self> {
        match kills {
            2 => Some(MultiKill::Double),
            3 => Some(MultiKill::Triple),
            4 => Some(MultiKill::Quad),
            5 => Some(MultiKill::Ace),
            _ => None,
        }
    }
}

/// Round-scoped credits for one player.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundCredit {
    pub opening_kill: bool,
    pub opening_death: bool,
    pub trades: u32,
    pub multi_kill: Option<MultiKill>,
    pub kost: bool,
    pub objectives: u32,
    pub suicides: u32,
    pub teamkills: u32,
    pub clutch: bool,
}

/// Everything the analyzer derived from one round, keyed by raw username.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RoundFacts {
    pub round: u32,
    pub credits: BTreeMap<String, RoundCredit>,
}

impl RoundFacts {
    pub fn credit(&self, username: &str) -> Option<&RoundCredit> {
        self.credits.get(username)
    }

    pub(crate) fn credit_mut(&mut self, username: &str) -> &mut RoundCredit {
        self.credits.entry(username.to_owned()).or_default()
    }
}
