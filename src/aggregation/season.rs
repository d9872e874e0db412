use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;
use tracing::info;

use crate::error::{Result, StatsError};
use crate::model::{
    DerivedStats, Leaderboard, MatchResult, MatchSummary, SeasonPlayerStats, SeriesSummary,
    StatCounters, TeamMapStats, TeamSeriesRecord,
};

#[derive(Debug, Clone, Default)]
struct SeasonEntry {
    team: String,
    matches: u32,
    totals: StatCounters,
}

/// Season-to-date state: raw per-player totals plus the match and series logs.
///
/// Only raw counters are stored; ratios are derived on every read.
#[derive(Debug, Clone, Default)]
pub struct Season {
    match_ids: HashSet<String>,
    series_ids: HashSet<String>,
    players: BTreeMap<String, SeasonEntry>,
    matches: Vec<MatchSummary>,
    series: Vec<SeriesSummary>,
}

impl Season {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_match(&self, match_id: &str) -> bool {
        self.match_ids.contains(match_id)
    }

    /// Add one match's player totals. Duplicates leave the season untouched.
    pub fn commit(&mut self, result: MatchResult) -> Result<()> {
        if self.contains_match(&result.summary.match_id) {
            return Err(StatsError::DuplicateMatch {
                match_id: result.summary.match_id,
            });
        }

        for stats in &result.players {
            let entry = self
                .players
                .entry(stats.player.clone())
                .or_insert_with(|| SeasonEntry {
                    team: stats.team.clone(),
                    ..Default::default()
                });
            entry.matches += 1;
            entry.totals += &stats.counters;
        }

        info!(
            match_id = %result.summary.match_id,
            map = %result.summary.map,
            players = result.players.len(),
            "committed match"
        );
        self.match_ids.insert(result.summary.match_id.clone());
        self.matches.push(result.summary);
        Ok(())
    }

    pub fn record_series(&mut self, series: SeriesSummary) -> Result<()> {
        if !self.series_ids.insert(series.series_id.clone()) {
            return Err(StatsError::DuplicateMatch {
                match_id: series.series_id,
            });
        }
        self.series.push(series);
        Ok(())
    }

    /// Full snapshot with freshly derived ratios, ordered by team then player.
    pub fn player_stats(&self) -> Vec<SeasonPlayerStats> {
        self.players
            .iter()
            .map(|(player, entry)| season_line(player, entry))
            .sorted_by(|a, b| a.team.cmp(&b.team).then_with(|| a.player.cmp(&b.player)))
            .collect_vec()
    }

    pub fn player(&self, player: &str) -> Option<SeasonPlayerStats> {
        self.players
            .get(player)
            .map(|entry| season_line(player, entry))
    }

    /// Top `n` players by `metric`; players without rounds are not ranked.
    pub fn leaderboard(&self, metric: Leaderboard, n: usize) -> Vec<SeasonPlayerStats> {
        self.player_stats()
            .into_iter()
            .filter_map(|line| line.derived.map(|d| (metric.value(&d), line)))
            .sorted_by(|(a, line_a), (b, line_b)| {
                b.total_cmp(a).then_with(|| line_a.player.cmp(&line_b.player))
            })
            .take(n)
            .map(|(_, line)| line)
            .collect_vec()
    }

    /// Per-team, per-map records over all committed matches.
    pub fn map_stats(&self) -> Vec<TeamMapStats> {
        let mut stats: BTreeMap<(String, String), TeamMapStats> = BTreeMap::new();
        for summary in &self.matches {
            for team in &summary.teams {
                let Some(opponent) = summary.opponent_of(&team.team) else {
                    continue;
                };
                let entry = stats
                    .entry((team.team.clone(), summary.map.clone()))
                    .or_insert_with(|| TeamMapStats {
                        team: team.team.clone(),
                        map: summary.map.clone(),
                        ..Default::default()
                    });
                entry.rounds_won += team.score;
                entry.rounds_lost += opponent.score;
                match summary.winner.as_deref() {
                    Some(winner) if winner == team.team => entry.wins += 1,
                    Some(_) => entry.losses += 1,
                    None => {}
                }
            }
        }
        stats.into_values().collect_vec()
    }

    pub fn matches(&self) -> &[MatchSummary] {
        &self.matches
    }

    pub fn series(&self) -> &[SeriesSummary] {
        &self.series
    }

    /// Match log rows, one per team per series.
    pub fn match_log(&self) -> Vec<TeamSeriesRecord> {
        self.series
            .iter()
            .flat_map(|s| [s.record_for(&s.team), s.record_for(&s.opponent)])
            .flatten()
            .collect_vec()
    }
}

fn season_line(player: &str, entry: &SeasonEntry) -> SeasonPlayerStats {
    SeasonPlayerStats {
        player: player.to_owned(),
        team: entry.team.clone(),
        matches: entry.matches,
        totals: entry.totals,
        derived: DerivedStats::from_counters(&entry.totals),
    }
}
