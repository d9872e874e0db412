use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::error::{Result, StatsError};
use crate::model::{Identity, Reconciliation, RosterEntry, RosterTeam};

/// Provides the roster dataset the identity map is built from.
pub trait RosterSource: Send + Sync {
    fn load(&self) -> Vec<RosterTeam>;
}

impl RosterSource for Vec<RosterTeam> {
    fn load(&self) -> Vec<RosterTeam> {
        self.clone()
    }
}

/// Canonical player names and their teams, in roster order.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    entries: Vec<RosterEntry>,
    index: HashMap<String, usize>,
}

impl IdentityMap {
    pub fn from_roster(teams: &[RosterTeam]) -> Self {
        let mut map = Self::default();
        for roster in teams {
            for player in roster.players.iter().filter(|p| !p.trim().is_empty()) {
                if let Some(existing) = map.index.get(player).map(|&i| &map.entries[i]) {
                    warn!(
                        player = %player,
                        team = %roster.team,
                        registered_with = %existing.team,
                        "player listed on more than one roster, keeping first"
                    );
                    continue;
                }
                map.index.insert(player.clone(), map.entries.len());
                map.entries.push(RosterEntry {
                    player: player.clone(),
                    team: roster.team.clone(),
                });
            }
        }
        map
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn team_of(&self, player: &str) -> Option<&str> {
        self.index
            .get(player)
            .map(|&i| self.entries[i].team.as_str())
    }

    /// Exact lookup first, then the most similar canonical name.
    ///
    /// Similarity is case-insensitive normalized Levenshtein; only a strictly
    /// higher score replaces the current best, so earlier roster entries win
    /// ties.
    pub fn best_match(&self, username: &str) -> Option<(&RosterEntry, f64)> {
        if let Some(&i) = self.index.get(username) {
            return Some((&self.entries[i], 1.0));
        }

        let needle = username.to_lowercase();
        let mut best: Option<(&RosterEntry, f64)> = None;
        for entry in &self.entries {
            let score = strsim::normalized_levenshtein(&needle, &entry.player.to_lowercase());
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((entry, score));
            }
        }
        best
    }
}

/// Resolves in-game usernames to canonical roster identities.
///
/// The identity map is built lazily from the [`RosterSource`] and cached until
/// [`IdentityResolver::refresh`] is called. Reads are shared; only the build
/// takes the write lock.
pub struct IdentityResolver {
    source: Box<dyn RosterSource>,
    map: RwLock<Option<Arc<IdentityMap>>>,
    reconciliations: Mutex<Vec<Reconciliation>>,
    reported: Mutex<HashSet<String>>,
}

impl IdentityResolver {
    pub fn new(source: impl RosterSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            map: RwLock::new(None),
            reconciliations: Mutex::new(Vec::new()),
            reported: Mutex::new(HashSet::new()),
        }
    }

    /// The cached identity map, building it on first use.
    pub fn identity_map(&self) -> Arc<IdentityMap> {
        if let Some(map) = self
            .map
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Arc::clone(map);
        }

        let mut slot = self.map.write().unwrap_or_else(PoisonError::into_inner);
        // Another thread may have built it while we waited for the lock.
        if let Some(map) = slot.as_ref() {
            return Arc::clone(map);
        }
        let map = Arc::new(IdentityMap::from_roster(&self.source.load()));
        debug!(players = map.len(), "built identity map");
        *slot = Some(Arc::clone(&map));
        map
    }

    /// Drop the cached map; the next resolution reloads the roster.
    pub fn refresh(&self) {
        *self.map.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        debug!("identity map invalidated");
    }

    pub fn resolve(&self, username: &str) -> Result<Identity> {
        self.resolve_in(&self.identity_map(), username)
    }

    /// Resolve every username once, for use as a per-match lookup table.
    ///
    /// All names are resolved against the same map, even if a refresh lands
    /// while the batch is being resolved.
    pub fn resolve_all<'a>(
        &self,
        usernames: impl IntoIterator<Item = &'a str>,
    ) -> Result<HashMap<String, Identity>> {
        let map = self.identity_map();
        usernames
            .into_iter()
            .map(|name| Ok((name.to_owned(), self.resolve_in(&map, name)?)))
            .collect()
    }

    fn resolve_in(&self, map: &IdentityMap, username: &str) -> Result<Identity> {
        let (entry, similarity) =
            map.best_match(username)
                .ok_or_else(|| StatsError::UnresolvedIdentity {
                    username: username.to_owned(),
                })?;

        if entry.player != username {
            self.reconcile(username, entry, similarity);
        }

        Ok(Identity {
            player: entry.player.clone(),
            team: entry.team.clone(),
        })
    }

    /// Take all reconciliation diagnostics collected so far.
    pub fn drain_reconciliations(&self) -> Vec<Reconciliation> {
        std::mem::take(
            &mut *self
                .reconciliations
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        )
    }

    fn reconcile(&self, username: &str, entry: &RosterEntry, similarity: f64) {
        let first_report = self
            .reported
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(username.to_owned());
        if !first_report {
            return;
        }

        warn!(
            username,
            canonical = %entry.player,
            team = %entry.team,
            similarity,
            "username is marked differently in the roster, update the roster entry to the in-game name"
        );
        self.reconciliations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Reconciliation {
                username: username.to_owned(),
                canonical: entry.player.clone(),
                team: entry.team.clone(),
                similarity,
            });
    }
}

impl std::fmt::Debug for IdentityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityResolver")
            .field("map", &self.map)
            .finish_non_exhaustive()
    }
}
