// Service boundary: every call recomputes from the roster and the upstream
// feed. Nothing is cached between calls.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use futures_util::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use hitboard_core::accuracy::compute_record;
use hitboard_core::config::{Config, SeasonConfig};
use hitboard_core::fetcher::{fetch_actual_hits, stat_query};
use hitboard_core::leaderboard::Leaderboard;
use hitboard_core::resolver::{resolve_player_id, PlayerResolver};
use hitboard_core::roster::{load_roster, RosterEntry, RosterError};
use hitboard_core::season::{compute_season_progress, SeasonProgress};
use hitboard_core::stats::{GameHits, PlayerHitting, PlayerId, StatQuery, StatsError, StatsSource};

use crate::pipeline::{fetch_game_logs, lookup_rows, RowGameLog, RowLookup};

const UNKNOWN_POSITION: &str = "N/A";
const NO_AVERAGE: &str = ".000";

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("failed to load roster from {path}")]
    Roster {
        path: PathBuf,
        #[source]
        source: RosterError,
    },

    #[error(transparent)]
    Stats(#[from] StatsError),
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// One complete leaderboard load.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardReport {
    pub generated_at: DateTime<Utc>,
    pub contest_end: NaiveDate,
    pub progress: SeasonProgress,
    pub leaderboard: Leaderboard,
    pub game_logs: Vec<RowGameLog>,
    /// Per-row lookup outcomes, in roster order.
    pub diagnostics: Vec<RowLookup>,
}

impl LeaderboardReport {
    /// Rows whose lookup did not succeed.
    pub fn failed_rows(&self) -> impl Iterator<Item = &RowLookup> {
        self.diagnostics.iter().filter(|d| !d.is_resolved())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerHitsReport {
    pub name: String,
    pub player_id: PlayerId,
    pub season: i32,
    pub hits: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamHitter {
    pub id: PlayerId,
    pub name: String,
    pub position: String,
    pub hits: u32,
    pub games: u32,
    pub at_bats: u32,
    pub avg: String,
    pub hits_by_date: Vec<GameHits>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamHittersReport {
    pub team_id: u32,
    pub season: i32,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub hitters: Vec<TeamHitter>,
}

// ---------------------------------------------------------------------------
// HitboardService
// ---------------------------------------------------------------------------

pub struct HitboardService {
    source: Arc<dyn StatsSource>,
    config: Config,
    base_dir: PathBuf,
}

impl HitboardService {
    /// `base_dir` anchors relative paths in `config`, such as the roster.
    pub fn new(source: Arc<dyn StatsSource>, config: Config, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            config,
            base_dir: base_dir.into(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn season(&self) -> &SeasonConfig {
        &self.config.season
    }

    fn roster_path(&self) -> PathBuf {
        let path = Path::new(&self.config.roster.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn load_entries(&self) -> Result<Vec<RosterEntry>, ServiceError> {
        let path = self.roster_path();
        load_roster(&path).map_err(|source| {
            error!("roster unreadable at {}: {}", path.display(), source);
            ServiceError::Roster { path, source }
        })
    }

    /// The hitting query used for actual hits as of `now`.
    fn hits_query(&self, now: DateTime<Utc>) -> StatQuery {
        let end = self
            .config
            .leaderboard
            .stats_end_date
            .map(|end| end.min(now.date_naive()));
        stat_query(self.season(), end)
    }

    /// Ranked leaderboard as of `now`.
    ///
    /// Only an unreadable roster fails the load. Per-row lookup failures
    /// become zero actual hits plus a diagnostic; schedule failures fall back
    /// to calendar progress.
    pub async fn leaderboard(&self, now: DateTime<Utc>) -> Result<LeaderboardReport, ServiceError> {
        let entries = self.load_entries()?;
        info!("Loaded {} roster rows", entries.len());

        let season = self.season();
        let resolver = Arc::new(PlayerResolver::new(
            self.source.clone(),
            season.sport_id,
            season.year,
        ));

        let (progress, lookups) = tokio::join!(
            compute_season_progress(self.source.as_ref(), season, now),
            lookup_rows(
                &entries,
                resolver,
                self.source.clone(),
                self.hits_query(now),
                self.config.upstream.max_in_flight,
            ),
        );

        let records = entries
            .iter()
            .zip(&lookups)
            .enumerate()
            .map(|(index, (entry, lookup))| {
                compute_record(index as u32 + 1, entry, lookup.actual_hits, &progress)
            })
            .collect();
        let leaderboard = Leaderboard::from_records(records);

        let game_logs = fetch_game_logs(
            self.source.as_ref(),
            leaderboard.top(self.config.leaderboard.game_log_rows),
            &lookups,
            season.year,
        )
        .await;

        let failed = lookups.iter().filter(|l| !l.is_resolved()).count();
        info!(
            "Leaderboard ready: {} rows, {} failed lookups, progress {:.1}% ({:?})",
            leaderboard.len(),
            failed,
            progress.percent(),
            progress.source
        );

        Ok(LeaderboardReport {
            generated_at: now,
            contest_end: season.contest_end,
            progress,
            leaderboard,
            game_logs,
            diagnostics: lookups,
        })
    }

    /// Season progress as of `now`. Never fails.
    pub async fn season_progress(&self, now: DateTime<Utc>) -> SeasonProgress {
        compute_season_progress(self.source.as_ref(), self.season(), now).await
    }

    /// Actual season hits for one player name. Unlike a leaderboard row,
    /// a failure here is returned to the caller.
    pub async fn player_hits(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<PlayerHitsReport, ServiceError> {
        let season = self.season();
        let id = resolve_player_id(self.source.as_ref(), season.sport_id, season.year, name).await?;
        let hits = fetch_actual_hits(self.source.as_ref(), id, self.hits_query(now)).await?;
        Ok(PlayerHitsReport {
            name: name.trim().to_string(),
            player_id: id,
            season: season.year,
            hits,
        })
    }

    /// Top `limit` hitters on `team_id` by hits from season start through
    /// `now`, each with a game-by-game log.
    ///
    /// A failed roster fetch fails the call. Players whose stats fail or who
    /// have no hitting line are left out.
    pub async fn team_hitters(
        &self,
        team_id: u32,
        limit: usize,
        now: DateTime<Utc>,
    ) -> Result<TeamHittersReport, ServiceError> {
        let season = self.season();
        let ids = self.source.team_roster(team_id, season.year).await?;
        info!("Team {} roster has {} players", team_id, ids.len());

        let start = season.start_date;
        let end = now.date_naive().max(start);
        let query = StatQuery::DateRange { start, end };

        let lines = self.team_hitting(&ids, query).await;
        let mut hitters: Vec<TeamHitter> = lines.into_iter().filter_map(team_hitter).collect();
        // Stable: equal hits keep roster order.
        hitters.sort_by(|a, b| b.hits.cmp(&a.hits));
        hitters.truncate(limit);

        let source = self.source.as_ref();
        let logs = join_all(hitters.iter().map(|h| async move {
            source.game_log(h.id, season.year).await.unwrap_or_else(|e| {
                warn!("game log for {} unavailable: {}", h.name, e);
                Vec::new()
            })
        }))
        .await;
        for (hitter, log) in hitters.iter_mut().zip(logs) {
            hitter.hits_by_date = log;
        }

        Ok(TeamHittersReport {
            team_id,
            season: season.year,
            start,
            end,
            hitters,
        })
    }

    /// Hitting lines for `ids`, in roster order. Failed lookups are dropped.
    async fn team_hitting(&self, ids: &[PlayerId], query: StatQuery) -> Vec<PlayerHitting> {
        let permits = Arc::new(Semaphore::new(self.config.upstream.max_in_flight.max(1)));
        let mut tasks = JoinSet::new();
        for (index, id) in ids.iter().copied().enumerate() {
            let source = self.source.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                (index, id, source.hitting(id, query).await)
            });
        }

        let mut slots: Vec<Option<PlayerHitting>> = vec![None; ids.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(hitting))) => slots[index] = Some(hitting),
                Ok((_, id, Err(e))) => warn!("hitting for player {} unavailable: {}", id, e),
                Err(e) => error!("team hitting task failed: {}", e),
            }
        }
        slots.into_iter().flatten().collect()
    }
}

/// A team hitter, or `None` for a player without a hits figure.
fn team_hitter(hitting: PlayerHitting) -> Option<TeamHitter> {
    let line = hitting.line?;
    let hits = line.hits?;
    Some(TeamHitter {
        id: hitting.person.id,
        name: hitting.person.full_name,
        position: hitting
            .person
            .position
            .unwrap_or_else(|| UNKNOWN_POSITION.into()),
        hits,
        games: line.games_played.unwrap_or(0),
        at_bats: line.at_bats.unwrap_or(0),
        avg: line.avg.unwrap_or_else(|| NO_AVERAGE.into()),
        hits_by_date: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hitboard_core::stats::{HittingLine, PersonSummary};

    fn hitting(position: Option<&str>, line: Option<HittingLine>) -> PlayerHitting {
        PlayerHitting {
            person: PersonSummary {
                id: PlayerId(1),
                full_name: "Heliot Ramos".into(),
                position: position.map(String::from),
            },
            line,
        }
    }

    #[test]
    fn team_hitter_defaults_missing_fields() {
        let h = team_hitter(hitting(
            None,
            Some(HittingLine {
                hits: Some(12),
                ..Default::default()
            }),
        ))
        .unwrap();
        assert_eq!(h.position, "N/A");
        assert_eq!(h.avg, ".000");
        assert_eq!(h.games, 0);
        assert_eq!(h.hits, 12);
    }

    #[test]
    fn team_hitter_requires_hits() {
        assert!(team_hitter(hitting(Some("LF"), None)).is_none());
        assert!(team_hitter(hitting(
            Some("LF"),
            Some(HittingLine {
                games_played: Some(4),
                ..Default::default()
            })
        ))
        .is_none());
    }
}
