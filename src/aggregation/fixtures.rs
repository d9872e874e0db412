//! Builders for decoded recordings used across the aggregation tests.

use crate::model::{
    DecodedMatch, DecodedPlayer, DecodedPlayerRound, DecodedRound, DecodedTeam, FeedbackEvent,
    FeedbackKind, FeedbackType, MapInfo, RosterTeam, Side,
};

/// Owls field A1/A2 at team index 0, Hawks field B1/B2 at team index 1.
pub(crate) fn roster() -> Vec<RosterTeam> {
    vec![
        RosterTeam {
            team: "Owls".to_owned(),
            players: vec!["A1".to_owned(), "A2".to_owned()],
        },
        RosterTeam {
            team: "Hawks".to_owned(),
            players: vec!["B1".to_owned(), "B2".to_owned()],
        },
    ]
}

pub(crate) fn round() -> RoundBuilder {
    RoundBuilder::default()
}

pub(crate) fn kill(killer: &str, victim: &str, time: f64) -> FeedbackEvent {
    FeedbackEvent {
        kind: FeedbackType {
            name: FeedbackKind::Kill,
        },
        username: killer.to_owned(),
        target: victim.to_owned(),
        time_in_seconds: time,
    }
}

pub(crate) fn feed(kind: FeedbackKind, username: &str) -> FeedbackEvent {
    FeedbackEvent {
        kind: FeedbackType { name: kind },
        username: username.to_owned(),
        target: String::new(),
        time_in_seconds: 0.0,
    }
}

pub(crate) fn recording(map: &str, scores: &[(u32, u32)]) -> DecodedMatch {
    DecodedMatch {
        rounds: scores
            .iter()
            .map(|&(a, b)| round().map(map).scores(a, b).build())
            .collect(),
    }
}

pub(crate) struct RoundBuilder {
    round: DecodedRound,
}

impl Default for RoundBuilder {
    fn default() -> Self {
        let players = [("A1", 0), ("A2", 0), ("B1", 1), ("B2", 1)];
        Self {
            round: DecodedRound {
                recording_profile_id: "profile-1".to_owned(),
                additional_tags: None,
                timestamp: Some("2024-04-12T19:33:05Z".to_owned()),
                round_number: Some(0),
                map: Some(MapInfo {
                    name: "Bank".to_owned(),
                }),
                site: None,
                teams: vec![
                    DecodedTeam {
                        name: "YOUR TEAM".to_owned(),
                        score: Some(0),
                        won: false,
                        role: Some(Side::Attack),
                    },
                    DecodedTeam {
                        name: "OPPONENTS".to_owned(),
                        score: Some(0),
                        won: false,
                        role: Some(Side::Defense),
                    },
                ],
                players: players
                    .iter()
                    .map(|&(username, team_index)| DecodedPlayer {
                        username: username.to_owned(),
                        team_index,
                    })
                    .collect(),
                stats: players
                    .iter()
                    .map(|&(username, _)| DecodedPlayerRound {
                        username: username.to_owned(),
                        ..Default::default()
                    })
                    .collect(),
                match_feedback: None,
            },
        }
    }
}

impl RoundBuilder {
    pub(crate) fn feed(mut self, events: Vec<FeedbackEvent>) -> Self {
        self.round.match_feedback = Some(events);
        self
    }

    pub(crate) fn tags(mut self, tags: &[&str]) -> Self {
        self.round.additional_tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub(crate) fn map(mut self, name: &str) -> Self {
        self.round.map = Some(MapInfo {
            name: name.to_owned(),
        });
        self
    }

    pub(crate) fn timestamp(mut self, timestamp: &str) -> Self {
        self.round.timestamp = Some(timestamp.to_owned());
        self
    }

    pub(crate) fn profile(mut self, profile_id: &str) -> Self {
        self.round.recording_profile_id = profile_id.to_owned();
        self
    }

    pub(crate) fn site(mut self, site: &str) -> Self {
        self.round.site = Some(site.to_owned());
        self
    }

    /// Cumulative scores after the round; the side that gained a point wins it.
    pub(crate) fn scores(mut self, a: u32, b: u32) -> Self {
        self.round.teams[0].score = Some(a);
        self.round.teams[1].score = Some(b);
        self
    }

    pub(crate) fn winner(mut self, team_index: usize) -> Self {
        for (i, team) in self.round.teams.iter_mut().enumerate() {
            team.won = i == team_index;
        }
        self
    }

    pub(crate) fn swap_sides(mut self) -> Self {
        for team in self.round.teams.iter_mut() {
            team.role = match team.role {
                Some(Side::Attack) => Some(Side::Defense),
                Some(Side::Defense) => Some(Side::Attack),
                None => None,
            };
        }
        self
    }

    /// Overwrite the snapshot of `username`.
    pub(crate) fn stat(mut self, username: &str, kills: u32, died: bool) -> Self {
        if let Some(stat) = self.round.stats.iter_mut().find(|s| s.username == username) {
            stat.kills = kills;
            stat.died = died;
            stat.headshots = kills.min(1);
        }
        self
    }

    /// Add a player at `team_index` with an empty snapshot.
    pub(crate) fn player(mut self, username: &str, team_index: usize) -> Self {
        self.round.players.push(DecodedPlayer {
            username: username.to_owned(),
            team_index,
        });
        self.round.stats.push(DecodedPlayerRound {
            username: username.to_owned(),
            ..Default::default()
        });
        self
    }

    pub(crate) fn assists(mut self, username: &str, assists: u32) -> Self {
        if let Some(stat) = self.round.stats.iter_mut().find(|s| s.username == username) {
            stat.assists = assists;
        }
        self
    }

    /// Reorder the snapshot listing.
    pub(crate) fn stat_order(mut self, order: &[&str]) -> Self {
        self.round.stats.sort_by_key(|s| {
            order
                .iter()
                .position(|name| *name == s.username)
                .unwrap_or(usize::MAX)
        });
        self
    }

    pub(crate) fn build(self) -> DecodedRound {
        self.round
    }
}
