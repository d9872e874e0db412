use chrono::{DateTime, Utc};
use serde::Serialize;

/// One map of a series, scored from the perspective of the series' first team.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesMap {
    pub match_id: String,
    pub map: String,
    pub start_time: DateTime<Utc>,
    pub score_for: u32,
    pub score_against: u32,
}

impl SeriesMap {
    pub fn won(&self) -> bool {
        self.score_for > self.score_against
    }

    pub fn lost(&self) -> bool {
        self.score_for < self.score_against
    }
}

/// Match log entry for a batch of up to three maps played between two teams.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub series_id: String,
    pub start_time: DateTime<Utc>,
    pub team: String,
    pub opponent: String,
    /// Ordered by start time.
    pub maps: Vec<SeriesMap>,
}

impl SeriesSummary {
    pub fn maps_won(&self) -> u32 {
        self.maps.iter().filter(|m| m.won()).count() as u32
    }

    pub fn maps_lost(&self) -> u32 {
        self.maps.iter().filter(|m| m.lost()).count() as u32
    }

    pub fn round_diff(&self) -> i64 {
        self.maps
            .iter()
            .map(|m| i64::from(m.score_for) - i64::from(m.score_against))
            .sum()
    }

    /// More than one map was played.
    pub fn is_playoff(&self) -> bool {
        self.maps.len() > 1
    }

    pub fn winner(&self) -> Option<&str> {
        match self.maps_won().cmp(&self.maps_lost()) {
            std::cmp::Ordering::Greater => Some(self.team.as_str()),
            std::cmp::Ordering::Less => Some(self.opponent.as_str()),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// The series as seen by `team`, or `None` if it did not take part.
    pub fn record_for(&self, team: &str) -> Option<TeamSeriesRecord> {
        let flipped = if team == self.team {
            false
        } else if team == self.opponent {
            true
        } else {
            return None;
        };

        let maps = self
            .maps
            .iter()
            .map(|m| {
                let (score_for, score_against) = if flipped {
                    (m.score_against, m.score_for)
                } else {
                    (m.score_for, m.score_against)
                };
                TeamSeriesMap {
                    map: m.map.clone(),
                    score_for,
                    score_against,
                    won: score_for > score_against,
                }
            })
            .collect::<Vec<_>>();

        let maps_won = maps.iter().filter(|m| m.won).count() as u32;
        let maps_lost = maps
            .iter()
            .filter(|m| m.score_for < m.score_against)
            .count() as u32;
        let round_diff = if flipped {
            -self.round_diff()
        } else {
            self.round_diff()
        };

        Some(TeamSeriesRecord {
            start_time: self.start_time,
            team: team.to_owned(),
            opponent: if flipped {
                self.team.clone()
            } else {
                self.opponent.clone()
            },
            maps,
            maps_won,
            maps_lost,
            win: maps_won > maps_lost,
            round_diff,
            playoff: self.is_playoff(),
        })
    }
}

/// A team's row in the match log.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeriesRecord {
    pub start_time: DateTime<Utc>,
    pub team: String,
    pub opponent: String,
    pub maps: Vec<TeamSeriesMap>,
    pub maps_won: u32,
    pub maps_lost: u32,
    pub win: bool,
    pub round_diff: i64,
    pub playoff: bool,
}

/// One map of a match log row, from the row team's perspective.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSeriesMap {
    pub map: String,
    pub score_for: u32,
    pub score_against: u32,
    pub won: bool,
}

/// Season record of one team on one map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TeamMapStats {
    pub team: String,
    pub map: String,
    pub rounds_won: u32,
    pub rounds_lost: u32,
    pub wins: u32,
    pub losses: u32,
}

impl TeamMapStats {
    pub fn round_diff(&self) -> i64 {
        i64::from(self.rounds_won) - i64::from(self.rounds_lost)
    }

    /// Fraction of decided maps won; 0 when none were decided.
    pub fn win_pct(&self) -> f64 {
        let decided = self.wins + self.losses;
        if decided == 0 {
            0.0
        } else {
            f64::from(self.wins) / f64::from(decided)
        }
    }
}
