use std::collections::HashMap;

use tracing::trace;

use crate::config::EngineConfig;
use crate::error::{Result, StatsError};
use crate::model::{ExtractedRound, Identity, MultiKill, RoundFacts};

/// Derives round-scoped credits from an extracted round.
///
/// Rounds are independent of each other, so one analyzer can be shared across
/// all rounds of a match and their facts folded afterwards.
#[derive(Debug, Clone, Copy)]
pub struct RoundAnalyzer<'a> {
    identities: &'a HashMap<String, Identity>,
    trade_window: f64,
}

impl<'a> RoundAnalyzer<'a> {
    /// `identities` must hold every username appearing in the analyzed rounds.
    pub fn new(identities: &'a HashMap<String, Identity>, config: &EngineConfig) -> Self {
        Self {
            identities,
            trade_window: config.trade_window_secs,
        }
    }

    pub fn analyze(&self, round: &ExtractedRound) -> Result<RoundFacts> {
        let mut facts = RoundFacts {
            round: round.number,
            ..Default::default()
        };

        if let Some(opening) = round.kills.first() {
            facts.credit_mut(&opening.killer).opening_kill = true;
            facts.credit_mut(&opening.victim).opening_death = true;
        }

        // Every earlier kill whose killer is avenged within the window counts,
        // so one death can credit several later kills.
        for (i, earlier) in round.kills.iter().enumerate() {
            for later in &round.kills[i + 1..] {
                if earlier.killer == later.victim
                    && (later.time - earlier.time).abs() <= self.trade_window
                {
                    facts.credit_mut(&later.killer).trades += 1;
                }
            }
        }

        for kill in &round.kills {
            if self.same_team(&kill.killer, &kill.victim) {
                facts.credit_mut(&kill.killer).teamkills += 1;
            }
        }

        for objective in &round.objectives {
            facts.credit_mut(&objective.username).objectives += 1;
        }

        for death in &round.self_deaths {
            facts.credit_mut(&death.username).suicides += 1;
        }

        for snapshot in &round.snapshots {
            let planted = round.planted(&snapshot.username);
            let credit = facts.credit_mut(&snapshot.username);
            credit.multi_kill = MultiKill::from_kills(snapshot.kills);
            // Disabling the defuser does not count towards KOST.
            credit.kost = !snapshot.died || snapshot.kills > 0 || credit.trades > 0 || planted;
        }

        if let Some(survivor) = self.clutch(round)? {
            facts.credit_mut(survivor).clutch = true;
        }

        trace!(round = round.number, players = facts.credits.len(), "analyzed round");
        Ok(facts)
    }

    fn team_of(&self, username: &str) -> Option<&'a str> {
        self.identities.get(username).map(|i| i.team.as_str())
    }

    fn same_team(&self, a: &str, b: &str) -> bool {
        matches!((self.team_of(a), self.team_of(b)), (Some(x), Some(y)) if x == y)
    }

    /// The lone survivor of the winning team, if the round ended as a 1vX.
    ///
    /// Sides are the round's own team indices, whatever roster team a
    /// player resolves to. Deaths are removed in snapshot listing order, not
    /// kill-feed order.
    fn clutch<'r>(&self, round: &'r ExtractedRound) -> Result<Option<&'r str>> {
        let mut living: Vec<Vec<&'r str>> = vec![Vec::new(); round.teams.len()];
        for participant in &round.participants {
            if let Some(members) = living.get_mut(participant.team_index) {
                members.push(participant.username.as_str());
            }
        }

        for snapshot in round.snapshots.iter().filter(|s| s.died) {
            for members in living.iter_mut() {
                if let Some(pos) = members.iter().position(|m| *m == snapshot.username) {
                    members.remove(pos);
                    break;
                }
            }
        }

        let lone = living
            .iter()
            .enumerate()
            .filter(|(_, members)| members.len() == 1)
            .map(|(index, members)| (index, members[0]))
            .collect::<Vec<_>>();

        match lone.as_slice() {
            [] => Ok(None),
            [(index, survivor)] => {
                let won = round.teams.get(*index).is_some_and(|t| t.won);
                Ok(won.then_some(*survivor))
            }
            _ => Err(StatsError::malformed(
                round.number,
                "more than one team reduced to a single survivor",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::extract::extract_round;
    use crate::aggregation::fixtures::{feed, kill, roster, round, RoundBuilder};
    use crate::aggregation::identity::IdentityResolver;
    use crate::model::{FeedbackKind, RosterTeam, RoundCredit};
    use pretty_assertions::assert_eq;

    fn analyze(builder: RoundBuilder) -> Result<RoundFacts> {
        let extracted = extract_round(1, &builder.build()).unwrap();
        let resolver = IdentityResolver::new(roster());
        let identities = resolver
            .resolve_all(["A1", "A2", "B1", "B2"])
            .unwrap();
        RoundAnalyzer::new(&identities, &EngineConfig::default()).analyze(&extracted)
    }

    fn credit(facts: &RoundFacts, username: &str) -> RoundCredit {
        facts.credit(username).cloned().unwrap_or_default()
    }

    #[test]
    fn test_opening_and_trade() {
        let facts = analyze(
            round()
                .feed(vec![kill("A1", "B1", 5.0), kill("B2", "A1", 7.0)])
                .stat("A1", 1, true)
                .stat("A2", 0, true)
                .stat("B1", 0, true)
                .stat("B2", 1, false),
        )
        .unwrap();

        assert!(credit(&facts, "A1").opening_kill);
        assert!(credit(&facts, "B1").opening_death);
        assert_eq!(credit(&facts, "B2").trades, 1);
        assert_eq!(credit(&facts, "A1").trades, 0);
        assert!(!credit(&facts, "B2").opening_kill);
    }

    #[test]
    fn test_trade_window_boundary() {
        let facts = analyze(round().feed(vec![kill("A1", "B1", 10.0), kill("B2", "A1", 13.0)]))
            .unwrap();
        assert_eq!(credit(&facts, "B2").trades, 1);

        let facts = analyze(round().feed(vec![kill("A1", "B1", 10.0), kill("B2", "A1", 13.5)]))
            .unwrap();
        assert_eq!(credit(&facts, "B2").trades, 0);
    }

    #[test]
    fn test_trade_window_ignores_direction() {
        // Countdown clocks produce decreasing timestamps.
        let facts = analyze(round().feed(vec![kill("A1", "B1", 80.0), kill("B2", "A1", 78.0)]))
            .unwrap();
        assert_eq!(credit(&facts, "B2").trades, 1);
    }

    #[test]
    fn test_all_pairs_trades() {
        let facts = analyze(round().feed(vec![
            kill("A1", "B1", 10.0),
            kill("A1", "B2", 11.0),
            kill("A2", "A1", 12.0),
        ]))
        .unwrap();
        assert_eq!(credit(&facts, "A2").trades, 2);
        assert_eq!(credit(&facts, "A2").teamkills, 1);
        assert_eq!(credit(&facts, "A1").teamkills, 0);
    }

    #[test]
    fn test_kost_rules() {
        let facts = analyze(
            round()
                .feed(vec![
                    kill("B1", "A1", 10.0),
                    feed(FeedbackKind::DefuserPlantComplete, "A2"),
                    feed(FeedbackKind::DefuserDisableComplete, "B2"),
                ])
                .stat("A1", 0, true)
                .stat("A2", 0, true)
                .stat("B1", 1, true)
                .stat("B2", 0, true),
        )
        .unwrap();

        assert!(!credit(&facts, "A1").kost);
        assert!(credit(&facts, "A2").kost);
        assert!(credit(&facts, "B1").kost);
        assert!(!credit(&facts, "B2").kost);
        assert_eq!(credit(&facts, "A2").objectives, 1);
        assert_eq!(credit(&facts, "B2").objectives, 1);
    }

    #[test]
    fn test_kost_via_trade() {
        let facts = analyze(
            round()
                .feed(vec![kill("B1", "A1", 10.0), kill("A2", "B1", 11.0), kill("B2", "A2", 30.0)])
                .stat("A1", 0, true)
                .stat("A2", 0, true)
                .stat("B1", 1, true),
        )
        .unwrap();
        // A2's snapshot lists no kills, the trade alone earns KOST.
        assert!(credit(&facts, "A2").kost);
        assert!(!credit(&facts, "A1").kost);
    }

    #[test]
    fn test_multi_kill_tier() {
        let facts = analyze(round().stat("A1", 3, false).stat("B1", 1, false)).unwrap();
        assert_eq!(credit(&facts, "A1").multi_kill, Some(MultiKill::Triple));
        assert_eq!(credit(&facts, "B1").multi_kill, None);
    }

    #[test]
    fn test_suicide() {
        let facts = analyze(
            round()
                .feed(vec![feed(FeedbackKind::Death, "B2")])
                .stat("B2", 0, true),
        )
        .unwrap();
        assert_eq!(credit(&facts, "B2").suicides, 1);
        assert!(!credit(&facts, "B2").kost);
    }

    #[test]
    fn test_clutch_for_winning_survivor() {
        let facts = analyze(
            round()
                .winner(0)
                .stat("A2", 0, true)
                .stat("B1", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap();
        assert!(credit(&facts, "A1").clutch);
        assert!(facts.credits.values().filter(|c| c.clutch).count() == 1);
    }

    #[test]
    fn test_no_clutch_when_survivor_lost() {
        let facts = analyze(
            round()
                .winner(1)
                .stat("A2", 0, true)
                .stat("B1", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap();
        assert!(facts.credits.values().all(|c| !c.clutch));
    }

    #[test]
    fn test_clutch_with_reordered_listing() {
        let facts = analyze(
            round()
                .winner(1)
                .stat("A1", 0, true)
                .stat("A2", 0, true)
                .stat("B1", 0, true)
                .stat_order(&["B1", "A2", "B2", "A1"]),
        )
        .unwrap();
        assert!(credit(&facts, "B2").clutch);
    }

    #[test]
    fn test_double_lone_survivor_is_malformed() {
        let err = analyze(
            round()
                .winner(0)
                .stat("A2", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap_err();
        assert!(matches!(err, StatsError::MalformedRoundData { round: 1, .. }));
    }

    /// Stand-in "Zedd" plays for team index 0 but resolves to Foxes.
    fn analyze_with_stand_in(builder: RoundBuilder) -> Result<RoundFacts> {
        let extracted = extract_round(1, &builder.player("Zedd", 0).build()).unwrap();
        let mut teams = roster();
        teams.push(RosterTeam {
            team: "Foxes".to_owned(),
            players: vec!["Zed".to_owned()],
        });
        let resolver = IdentityResolver::new(teams);
        let identities = resolver
            .resolve_all(["A1", "A2", "B1", "B2", "Zedd"])
            .unwrap();
        assert_eq!(identities["Zedd"].team, "Foxes");
        RoundAnalyzer::new(&identities, &EngineConfig::default()).analyze(&extracted)
    }

    #[test]
    fn test_clutch_uses_round_sides_not_roster_teams() {
        let facts = analyze_with_stand_in(
            round()
                .winner(0)
                .stat("B1", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap();
        assert!(facts.credits.values().all(|c| !c.clutch));

        let facts = analyze_with_stand_in(
            round()
                .winner(0)
                .stat("A1", 0, true)
                .stat("B1", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap();
        assert!(facts.credits.values().all(|c| !c.clutch));

        let facts = analyze_with_stand_in(
            round()
                .winner(0)
                .stat("A1", 0, true)
                .stat("A2", 0, true)
                .stat("B1", 0, true)
                .stat("B2", 0, true),
        )
        .unwrap();
        assert!(credit(&facts, "Zedd").clutch);
    }

    #[test]
    fn test_round_without_feed() {
        let facts = analyze(
            round()
                .stat("A1", 2, true)
                .stat("A2", 0, true)
                .stat("B1", 0, true),
        )
        .unwrap();
        assert_eq!(credit(&facts, "A1").trades, 0);
        assert!(!credit(&facts, "A1").opening_kill);
        assert!(credit(&facts, "A1").kost);
        assert!(!credit(&facts, "B1").kost);
        assert!(credit(&facts, "B2").kost);
        assert_eq!(credit(&facts, "A1").multi_kill, Some(MultiKill::Double));
    }
}
