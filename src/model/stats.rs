use std::ops::AddAssign;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum_macros::{Display, EnumString};

use crate::model::{MultiKill, PlayerSnapshot, RoundCredit};

/// Raw counters shared by match and season accumulators.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct StatCounters {
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub headshots: u32,
    pub rounds: u32,
    pub objectives: u32,
    pub trades: u32,
    pub opening_kills: u32,
    pub opening_deaths: u32,
    pub two_kills: u32,
    pub three_kills: u32,
    pub four_kills: u32,
    pub aces: u32,
    pub kost_rounds: u32,
    pub suicides: u32,
    pub teamkills: u32,
    pub clutches: u32,
}

impl StatCounters {
    /// Count a round the player was listed in.
    pub fn record_snapshot(&mut self, snapshot: &PlayerSnapshot) {
        self.kills += snapshot.kills;
        self.deaths += u32::from(snapshot.died);
        self.assists += snapshot.assists;
        self.headshots += snapshot.headshots;
        self.rounds += 1;
    }

    pub fn record_credit(&mut self, credit: &RoundCredit) {
        self.opening_kills += u32::from(credit.opening_kill);
        self.opening_deaths += u32::from(credit.opening_death);
        self.trades += credit.trades;
        self.kost_rounds += u32::from(credit.kost);
        self.objectives += credit.objectives;
        self.suicides += credit.suicides;
        self.teamkills += credit.teamkills;
        self.clutches += u32::from(credit.clutch);
        match credit.multi_kill {
            Some(MultiKill::Double) => self.two_kills += 1,
            Some(MultiKill::Triple) => self.three_kills += 1,
            Some(MultiKill::Quad) => self.four_kills += 1,
            Some(MultiKill::Ace) => self.aces += 1,
            None => {}
        }
    }
}

impl AddAssign<&StatCounters> for StatCounters {
    fn add_assign(&mut self, rhs: &StatCounters) {
        self.kills += rhs.kills;
        self.deaths += rhs.deaths;
        self.assists += rhs.assists;
        self.headshots += rhs.headshots;
        self.rounds += rhs.rounds;
        self.objectives += rhs.objectives;
        self.trades += rhs.trades;
        self.opening_kills += rhs.opening_kills;
        self.opening_deaths += rhs.opening_deaths;
        self.two_kills += rhs.two_kills;
        self.three_kills += rhs.three_kills;
        self.four_kills += rhs.four_kills;
        self.aces += rhs.aces;
        self.kost_rounds += rhs.kost_rounds;
        self.suicides += rhs.suicides;
        self.teamkills += rhs.teamkills;
        self.clutches += rhs.clutches;
    }
}

/// A canonical player's totals for one match (map).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerMatchStats {
    pub player: String,
    pub team: String,
    pub opponent: String,
    pub map: String,
    pub match_id: String,
    pub counters: StatCounters,
}

/// A team's final state in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamScore {
    pub team: String,
    pub score: u32,
}

/// Summary of one map recording.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchSummary {
    pub match_id: String,
    pub map: String,
    pub start_time: DateTime<Utc>,
    /// Ordered by the recording's team index.
    pub teams: Vec<TeamScore>,
    /// `None` when the final scores are level.
    pub winner: Option<String>,
}

impl MatchSummary {
    pub fn score_of(&self, team: &str) -> Option<u32> {
        self.teams.iter().find(|t| t.team == team).map(|t| t.score)
    }

    pub fn opponent_of(&self, team: &str) -> Option<&TeamScore> {
        self.teams.iter().find(|t| t.team != team)
    }
}

/// Aggregated output of one accepted match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    pub summary: MatchSummary,
    pub players: Vec<PlayerMatchStats>,
}

/// Ratios derived from raw season totals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DerivedStats {
    pub kd: f64,
    pub kpr: f64,
    pub srv: f64,
    pub ad: f64,
    pub apr: f64,
    pub entry: i64,
    pub headshot_pct: f64,
    pub kost_pct: f64,
    pub rating: f64,
}

impl DerivedStats {
    pub const KPR_WEIGHT: f64 = 0.7937;
    pub const APR_WEIGHT: f64 = 0.9091;
    pub const SRV_WEIGHT: f64 = 0.9375;

    /// Compute ratios from raw totals; `None` when no rounds were played.
    pub fn from_counters(c: &StatCounters) -> Option<Self> {
        if c.rounds == 0 {
            return None;
        }
        let rounds = f64::from(c.rounds);
        let kills = f64::from(c.kills);
        let deaths = f64::from(c.deaths);
        let assists = f64::from(c.assists);
        let headshots = f64::from(c.headshots);

        let kpr = kills / rounds;
        let apr = assists / rounds;
        let srv = 1.0 - deaths / rounds;

        Some(Self {
            kd: ratio_or(kills, deaths),
            kpr,
            srv,
            ad: ratio_or(assists, deaths),
            apr,
            entry: i64::from(c.opening_kills) - i64::from(c.opening_deaths),
            headshot_pct: ratio_or(headshots, kills),
            kost_pct: f64::from(c.kost_rounds) / rounds,
            rating: Self::KPR_WEIGHT * kpr + Self::APR_WEIGHT * apr + Self::SRV_WEIGHT * srv,
        })
    }
}

/// `numerator / denominator`, or the numerator itself when the denominator is zero.
fn ratio_or(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        numerator
    } else {
        numerator / denominator
    }
}

/// Season-to-date line for one canonical player.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonPlayerStats {
    pub player: String,
    pub team: String,
    pub matches: u32,
    pub totals: StatCounters,
    /// Absent for players without any played rounds.
    pub derived: Option<DerivedStats>,
}

/// Metrics players can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Leaderboard {
    #[strum(to_string = "kd", serialize = "k/d")]
    Kd,
    Kost,
    Rating,
}

impl Leaderboard {
    pub fn value(&self, derived: &DerivedStats) -> f64 {
        match self {
            Leaderboard::Kd => derived.kd,
            Leaderboard::Kost => derived.kost_pct,
            Leaderboard::Rating => derived.rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_zero_deaths_fall_back_to_kills() {
        let counters = StatCounters {
            kills: 10,
            rounds: 12,
            ..Default::default()
        };
        let derived = DerivedStats::from_counters(&counters).unwrap();
        assert_eq!(derived.kd, 10.0);
        assert_eq!(derived.ad, 0.0);
        assert_eq!(derived.srv, 1.0);
    }

    #[test]
    fn test_zero_kills_headshots_fallback() {
        let counters = StatCounters {
            headshots: 2,
            rounds: 4,
            ..Default::default()
        };
        let derived = DerivedStats::from_counters(&counters).unwrap();
        assert_eq!(derived.headshot_pct, 2.0);
    }

    #[test]
    fn test_rating_formula() {
        let counters = StatCounters {
            kills: 10,
            deaths: 5,
            assists: 4,
            headshots: 5,
            rounds: 10,
            kost_rounds: 7,
            opening_kills: 3,
            opening_deaths: 4,
            ..Default::default()
        };
        let derived = DerivedStats::from_counters(&counters).unwrap();
        assert_eq!(derived.kd, 2.0);
        assert_eq!(derived.kpr, 1.0);
        assert_eq!(derived.srv, 0.5);
        assert_eq!(derived.apr, 0.4);
        assert_eq!(derived.entry, -1);
        assert_eq!(derived.headshot_pct, 0.5);
        assert_eq!(derived.kost_pct, 0.7);
        let expected = 0.7937 * 1.0 + 0.9091 * 0.4 + 0.9375 * 0.5;
        assert_eq!(derived.rating, expected);
    }

    #[test]
    fn test_no_rounds_has_no_ratios() {
        assert_eq!(DerivedStats::from_counters(&StatCounters::default()), None);
    }

    #[test]
    fn test_recomputation_is_deterministic() {
        let counters = StatCounters {
            kills: 37,
            deaths: 29,
            assists: 11,
            rounds: 61,
            kost_rounds: 41,
            ..Default::default()
        };
        let first = DerivedStats::from_counters(&counters).unwrap();
        let second = DerivedStats::from_counters(&counters).unwrap();
        assert_eq!(first.rating.to_bits(), second.rating.to_bits());
        assert_eq!(first.kost_pct.to_bits(), second.kost_pct.to_bits());
    }

    #[test]
    fn test_multi_kill_tiers_are_exclusive() {
        let mut counters = StatCounters::default();
        counters.record_credit(&RoundCredit {
            multi_kill: MultiKill::from_kills(3),
            ..Default::default()
        });
        assert_eq!(counters.two_kills, 0);
        assert_eq!(counters.three_kills, 1);
        assert_eq!(MultiKill::from_kills(1), None);
        assert_eq!(MultiKill::from_kills(6), None);
    }

    #[test]
    fn test_leaderboard_from_str() {
        assert_eq!("k/d".parse::<Leaderboard>().unwrap(), Leaderboard::Kd);
        assert_eq!("kost".parse::<Leaderboard>().unwrap(), Leaderboard::Kost);
    }
}
