use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use itertools::Itertools;
use tracing::debug;

use crate::aggregation::analyze::RoundAnalyzer;
use crate::aggregation::extract::extract_match;
use crate::aggregation::identity::IdentityResolver;
use crate::config::EngineConfig;
use crate::error::{Result, StatsError};
use crate::model::{
    DecodedMatch, ExtractedMatch, Identity, MatchResult, MatchSummary, PlayerMatchStats,
    RecordingHeader, StatCounters, TeamScore,
};

/// Aggregate one decoded recording into per-player totals and a summary.
///
/// Nothing is returned unless every round was analyzed successfully.
pub fn aggregate_match(
    decoded: &DecodedMatch,
    resolver: &IdentityResolver,
    config: &EngineConfig,
) -> Result<MatchResult> {
    let extracted = extract_match(decoded)?;
    let identities = resolver.resolve_all(extracted.usernames())?;

    let analyzer = RoundAnalyzer::new(&identities, config);
    let facts = extracted
        .rounds
        .iter()
        .map(|round| analyzer.analyze(round))
        .collect::<Result<Vec<_>>>()?;

    let summary = summarize(&extracted, &identities)?;

    let mut counters: BTreeMap<&str, StatCounters> = BTreeMap::new();
    for (round, facts) in extracted.rounds.iter().zip(&facts) {
        for snapshot in &round.snapshots {
            counters
                .entry(canonical(&identities, &snapshot.username))
                .or_default()
                .record_snapshot(snapshot);
        }
        for (username, credit) in &facts.credits {
            counters
                .entry(canonical(&identities, username))
                .or_default()
                .record_credit(credit);
        }
    }

    let players = counters
        .into_iter()
        .map(|(player, counters)| {
            let team = identities
                .values()
                .find(|i| i.player == player)
                .map(|i| i.team.clone())
                .unwrap_or_default();
            let opponent = summary
                .opponent_of(&team)
                .map(|t| t.team.clone())
                .unwrap_or_default();
            PlayerMatchStats {
                player: player.to_owned(),
                team,
                opponent,
                map: summary.map.clone(),
                match_id: summary.match_id.clone(),
                counters,
            }
        })
        .collect_vec();

    debug!(
        match_id = %summary.match_id,
        map = %summary.map,
        players = players.len(),
        "aggregated match"
    );
    Ok(MatchResult { summary, players })
}

/// Deterministic identifier: profile id, tag list and start timestamp digits.
pub fn match_id(header: &RecordingHeader) -> String {
    let timestamp = header
        .timestamp
        .chars()
        .filter(char::is_ascii_digit)
        .collect::<String>();
    format!("{}{:?}{}", header.profile_id, header.tags, timestamp)
}

pub fn parse_start_time(timestamp: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(timestamp)?.with_timezone(&Utc))
}

fn canonical<'a>(identities: &'a HashMap<String, Identity>, username: &'a str) -> &'a str {
    identities
        .get(username)
        .map(|i| i.player.as_str())
        .unwrap_or(username)
}

fn summarize(
    extracted: &ExtractedMatch,
    identities: &HashMap<String, Identity>,
) -> Result<MatchSummary> {
    let last = extracted
        .rounds
        .last()
        .ok_or(StatsError::malformed(0, "recording contains no rounds"))?;

    // Team names come from the roster, via the first player listed per index.
    let teams = last
        .teams
        .iter()
        .enumerate()
        .map(|(index, team)| {
            let name = extracted
                .rounds
                .iter()
                .flat_map(|r| &r.participants)
                .find(|p| p.team_index == index)
                .and_then(|p| identities.get(&p.username))
                .map(|i| i.team.clone())
                .unwrap_or_else(|| team.name.clone());
            TeamScore {
                team: name,
                score: team.score,
            }
        })
        .collect_vec();

    let winner = match teams.as_slice() {
        [a, b] if a.score > b.score => Some(a.team.clone()),
        [a, b] if b.score > a.score => Some(b.team.clone()),
        _ => None,
    };

    Ok(MatchSummary {
        match_id: match_id(&extracted.header),
        map: last.map.clone(),
        start_time: parse_start_time(&extracted.header.timestamp)?,
        teams,
        winner,
    })
}
