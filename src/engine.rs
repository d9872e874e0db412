use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::aggregation::identity::{IdentityResolver, RosterSource};
use crate::aggregation::match_stats::aggregate_match;
use crate::aggregation::rehost::{detect_rehost, Quarantine};
use crate::aggregation::season::Season;
use crate::aggregation::series::summarize_series;
use crate::config::EngineConfig;
use crate::error::{Result, StatsError};
use crate::model::*;

/// The main entry point for aggregating league replays.
///
/// `StatsEngine` owns one run's context: the identity resolver built from the
/// roster, the tunables, and the season-to-date totals.
///
/// # Examples
///
/// ```no_run
/// # fn example(roster: Vec<replay_stats::RosterTeam>, json: &str) -> replay_stats::Result<()> {
/// use replay_stats::{BatchOutcome, DecodedMatch, StatsEngine};
///
/// let mut engine = StatsEngine::new(roster);
/// let batch = vec![DecodedMatch::from_json(json)?];
/// if let BatchOutcome::Processed(report) = engine.process_batch(batch)? {
///     println!("accepted {} maps", report.accepted.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StatsEngine {
    resolver: Arc<IdentityResolver>,
    config: EngineConfig,
    season: Season,
}

impl StatsEngine {
    /// Create an engine with default settings.
    pub fn new(roster: impl RosterSource + 'static) -> Self {
        Self::with_config(roster, EngineConfig::default())
    }

    pub fn with_config(roster: impl RosterSource + 'static, config: EngineConfig) -> Self {
        Self {
            resolver: Arc::new(IdentityResolver::new(roster)),
            config,
            season: Season::new(),
        }
    }

    /// Shared handle to the resolver, for aggregating matches on other threads.
    pub fn resolver(&self) -> Arc<IdentityResolver> {
        Arc::clone(&self.resolver)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn season(&self) -> &Season {
        &self.season
    }

    /// Season snapshot with freshly derived ratios.
    pub fn season_stats(&self) -> Vec<SeasonPlayerStats> {
        self.season.player_stats()
    }

    /// Aggregate one match without committing it.
    #[instrument(skip_all)]
    pub fn aggregate(&self, decoded: &DecodedMatch) -> Result<MatchResult> {
        aggregate_match(decoded, &self.resolver, &self.config)
    }

    /// Process one submitted series.
    ///
    /// Batches with a repeated consecutive map are quarantined untouched.
    /// Otherwise every map is aggregated before any is committed; a map that
    /// fails is reported and skipped while the others still count. Only a
    /// fatal error aborts the batch, in which case nothing is committed.
    #[instrument(skip_all, fields(maps = batch.len()))]
    pub fn process_batch(&mut self, batch: Vec<DecodedMatch>) -> Result<BatchOutcome> {
        if batch.len() > self.config.max_maps_per_batch {
            warn!(
                limit = self.config.max_maps_per_batch,
                "batch holds more maps than expected"
            );
        }

        if let Some(flag) = detect_rehost(&batch) {
            let quarantine = Quarantine::new(batch, flag, &self.resolver)?;
            return Ok(BatchOutcome::Quarantined(quarantine));
        }

        let mut report = BatchReport::default();
        let mut results = Vec::with_capacity(batch.len());
        for (position, decoded) in batch.iter().enumerate() {
            match self.aggregate(decoded) {
                Ok(result) => results.push(result),
                Err(error) if error.is_fatal() => return Err(error),
                Err(error) => {
                    warn!(position, error = %error, "match rejected");
                    report.rejected.push(RejectedMatch {
                        position,
                        error: error.to_string(),
                    });
                }
            }
        }

        let series = summarize_series(&results);
        for result in results {
            let summary = result.summary.clone();
            match self.season.commit(result) {
                Ok(()) => report.accepted.push(summary),
                Err(StatsError::DuplicateMatch { match_id }) => {
                    warn!(match_id = %match_id, "duplicate match skipped");
                    report.duplicates.push(match_id);
                }
                Err(error) => return Err(error),
            }
        }

        // A resubmitted series reuses the first map's id and is logged once.
        if let Some(series) = series {
            match self.season.record_series(series.clone()) {
                Ok(()) => report.series = Some(series),
                Err(error) => warn!(error = %error, "series already recorded"),
            }
        }

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            duplicates = report.duplicates.len(),
            "batch processed"
        );
        Ok(BatchOutcome::Processed(report))
    }

    /// Reload the roster on the next resolution.
    pub fn refresh_roster(&self) {
        self.resolver.refresh();
    }

    pub fn drain_reconciliations(&self) -> Vec<Reconciliation> {
        self.resolver.drain_reconciliations()
    }
}

/// What happened to a submitted batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum BatchOutcome {
    /// A map repeats back to back; nothing was aggregated.
    Quarantined(Quarantine),
    Processed(BatchReport),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchReport {
    pub accepted: Vec<MatchSummary>,
    pub rejected: Vec<RejectedMatch>,
    /// Ids of maps already committed earlier in the season.
    pub duplicates: Vec<String>,
    pub series: Option<SeriesSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedMatch {
    /// Index of the map within the submitted batch.
    pub position: usize,
    pub error: String,
}
