use itertools::Itertools;
use serde::Serialize;
use tracing::warn;

use crate::aggregation::identity::IdentityResolver;
use crate::error::Result;
use crate::model::{DecodedMatch, Side};

/// Two consecutive maps of a batch reporting the same map name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RehostFlag {
    /// Index of the first map of the repeated pair.
    pub position: usize,
    pub map: String,
}

/// Find the first pair of consecutive recordings played on the same map.
///
/// A genuine back-to-back rematch on one map cannot be told apart from a
/// rehost and is flagged as well.
pub fn detect_rehost(batch: &[DecodedMatch]) -> Option<RehostFlag> {
    batch
        .iter()
        .map(DecodedMatch::map_name)
        .tuple_windows()
        .position(|(a, b)| a.is_some() && a == b)
        .and_then(|position| {
            batch[position].map_name().map(|map| RehostFlag {
                position,
                map: map.to_owned(),
            })
        })
}

/// A batch set aside for manual merging.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quarantine {
    /// `{team}-vs-{opponent}-{start}`, safe to use as a directory name.
    pub name: String,
    pub flag: RehostFlag,
    pub replays: Vec<DecodedMatch>,
}

impl Quarantine {
    pub fn new(
        batch: Vec<DecodedMatch>,
        flag: RehostFlag,
        resolver: &IdentityResolver,
    ) -> Result<Self> {
        let first_round = batch.first().and_then(|m| m.rounds.first());
        let team_of = |username: Option<&String>| -> Result<String> {
            match username {
                Some(name) => Ok(resolver.resolve(name)?.team),
                None => Ok("unknown".to_owned()),
            }
        };
        let stats = first_round.map(|r| r.stats.as_slice()).unwrap_or_default();
        let team = team_of(stats.first().map(|s| &s.username))?;
        let opponent = team_of(stats.last().map(|s| &s.username))?;
        let start = first_round
            .and_then(|r| r.timestamp.as_deref())
            .unwrap_or_default()
            .replace(':', "-");

        let name = format!("{team}-vs-{opponent}-{start}").replace(' ', "_");
        warn!(
            name = %name,
            map = %flag.map,
            position = flag.position,
            "rehost detected, batch quarantined for manual merge"
        );
        Ok(Self {
            name,
            flag,
            replays: batch,
        })
    }

    /// Round-by-round breakdown of every quarantined map.
    pub fn round_overview(&self, resolver: &IdentityResolver) -> Result<Vec<MapOverview>> {
        self.replays
            .iter()
            .map(|replay| map_overview(replay, resolver))
            .collect()
    }
}

/// Round table of one quarantined map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapOverview {
    pub map: String,
    pub rounds: Vec<RoundOverview>,
}

/// One round of a quarantined map, by side.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoundOverview {
    pub round: u32,
    pub attacking_team: String,
    pub attack_score: u32,
    pub defending_team: String,
    pub defense_score: u32,
    pub site: Option<String>,
}

fn map_overview(replay: &DecodedMatch, resolver: &IdentityResolver) -> Result<MapOverview> {
    // Roster team behind each team index, from the first round's players.
    let mut team_names = [None, None];
    if let Some(first) = replay.rounds.first() {
        for player in &first.players {
            if let Some(slot) = team_names.get_mut(player.team_index) {
                if slot.is_none() {
                    *slot = Some(resolver.resolve(&player.username)?.team);
                }
            }
        }
    }
    let [team_0, team_1] = team_names.map(Option::unwrap_or_default);

    let rounds = replay
        .rounds
        .iter()
        .enumerate()
        .map(|(i, round)| {
            let attack = round
                .teams
                .iter()
                .position(|t| t.role == Some(Side::Attack))
                .unwrap_or(0);
            let defense = 1 - attack.min(1);
            let name = |index: usize| {
                if index == 0 {
                    team_0.clone()
                } else {
                    team_1.clone()
                }
            };
            let score = |index: usize| {
                round
                    .teams
                    .get(index)
                    .and_then(|t| t.score)
                    .unwrap_or_default()
            };
            RoundOverview {
                round: round.round_number.unwrap_or(i as u32),
                attacking_team: name(attack),
                attack_score: score(attack),
                defending_team: name(defense),
                defense_score: score(defense),
                site: round.site.clone(),
            }
        })
        .collect_vec();

    Ok(MapOverview {
        map: replay.map_name().unwrap_or_default().to_owned(),
        rounds,
    })
}
