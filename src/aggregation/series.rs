use itertools::Itertools;

use crate::model::{MatchResult, MatchSummary, SeriesMap, SeriesSummary};

/// Build the match log entry for the accepted maps of one batch.
///
/// The series is scored from the perspective of the first map's first team
/// and identified by the first submitted map.
pub fn summarize_series(results: &[MatchResult]) -> Option<SeriesSummary> {
    let first = &results.first()?.summary;
    let team = first.teams.first()?.team.clone();
    let opponent = first
        .opponent_of(&team)
        .map(|t| t.team.clone())
        .unwrap_or_default();

    let maps = results
        .iter()
        .map(|result| {
            let (score_for, score_against) = oriented_scores(&result.summary, &team, &opponent);
            SeriesMap {
                match_id: result.summary.match_id.clone(),
                map: result.summary.map.clone(),
                start_time: result.summary.start_time,
                score_for,
                score_against,
            }
        })
        .sorted_by_key(|m| m.start_time)
        .collect_vec();

    Some(SeriesSummary {
        series_id: first.match_id.clone(),
        start_time: maps.first().map_or(first.start_time, |m| m.start_time),
        team,
        opponent,
        maps,
    })
}

/// Scores as (team, opponent), falling back to recording order when the
/// team names do not line up.
fn oriented_scores(summary: &MatchSummary, team: &str, opponent: &str) -> (u32, u32) {
    match (summary.score_of(team), summary.score_of(opponent)) {
        (Some(score_for), Some(score_against)) => (score_for, score_against),
        _ => {
            let score = |i: usize| summary.teams.get(i).map_or(0, |t| t.score);
            (score(0), score(1))
        }
    }
}
