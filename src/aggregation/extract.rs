use std::collections::HashSet;

use itertools::Itertools;
use tracing::debug;

use crate::error::{Result, StatsError};
use crate::model::{
    DecodedMatch, DecodedRound, ExtractedMatch, ExtractedRound, FeedbackKind, KillEvent,
    ObjectiveEvent, ObjectiveKind, Participant, PlayerSnapshot, RecordingHeader, SelfDeath,
    TeamSnapshot,
};

/// Normalize a decoded recording into ordered rounds.
pub fn extract_match(decoded: &DecodedMatch) -> Result<ExtractedMatch> {
    let first = decoded
        .rounds
        .first()
        .ok_or(StatsError::malformed(0, "recording contains no rounds"))?;
    let header = RecordingHeader {
        profile_id: first.recording_profile_id.clone(),
        tags: first.additional_tags.clone().unwrap_or_default(),
        timestamp: first
            .timestamp
            .clone()
            .ok_or(StatsError::malformed(1, "missing round timestamp"))?,
    };

    let rounds = decoded
        .rounds
        .iter()
        .enumerate()
        .map(|(i, round)| extract_round(i as u32 + 1, round))
        .collect::<Result<Vec<_>>>()?;

    debug!(
        rounds = rounds.len(),
        without_feed = rounds.iter().filter(|r| !r.has_feed).count(),
        "extracted match"
    );
    Ok(ExtractedMatch { header, rounds })
}

/// Normalize a single round. `number` is 1-indexed.
pub fn extract_round(number: u32, round: &DecodedRound) -> Result<ExtractedRound> {
    let map = round
        .map
        .as_ref()
        .map(|m| m.name.clone())
        .filter(|name| !name.is_empty())
        .ok_or(StatsError::malformed(number, "missing map"))?;

    if round.teams.len() != 2 {
        return Err(StatsError::malformed(number, "expected exactly two teams"));
    }
    let teams = round
        .teams
        .iter()
        .map(|team| {
            Ok(TeamSnapshot {
                name: team.name.clone(),
                score: team
                    .score
                    .ok_or(StatsError::malformed(number, "missing team score"))?,
                side: team.role,
                won: team.won,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let participants = round
        .players
        .iter()
        .map(|p| Participant {
            username: p.username.clone(),
            team_index: p.team_index,
        })
        .collect_vec();
    if participants.iter().any(|p| p.team_index >= teams.len()) {
        return Err(StatsError::malformed(number, "player team index out of range"));
    }

    let snapshots = round
        .stats
        .iter()
        .map(|s| PlayerSnapshot {
            username: s.username.clone(),
            kills: s.kills,
            died: s.died,
            assists: s.assists,
            headshots: s.headshots,
        })
        .collect_vec();

    let mut kills = Vec::new();
    let mut objectives = Vec::new();
    let mut self_deaths = Vec::new();
    let mut credited = HashSet::new();

    let feed = round.match_feedback.as_deref();
    for event in feed.unwrap_or_default() {
        match event.kind.name {
            FeedbackKind::Kill => kills.push(KillEvent {
                killer: event.username.clone(),
                victim: event.target.clone(),
                time: event.time_in_seconds,
                round: number,
            }),
            FeedbackKind::Death => self_deaths.push(SelfDeath {
                username: event.username.clone(),
                round: number,
            }),
            FeedbackKind::DefuserPlantComplete | FeedbackKind::DefuserDisableComplete => {
                let kind = if event.kind.name == FeedbackKind::DefuserPlantComplete {
                    ObjectiveKind::PlantComplete
                } else {
                    ObjectiveKind::DisableComplete
                };
                if credited.insert((event.username.as_str(), kind)) {
                    objectives.push(ObjectiveEvent {
                        username: event.username.clone(),
                        kind,
                        round: number,
                    });
                }
            }
            FeedbackKind::Other => {}
        }
    }

    Ok(ExtractedRound {
        number,
        map,
        site: round.site.clone(),
        teams,
        participants,
        snapshots,
        kills,
        objectives,
        self_deaths,
        has_feed: feed.is_some(),
    })
}
