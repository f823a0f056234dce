// Per-row fan-out for a leaderboard load.
//
// Every roster row resolves its player and fetches actual hits in its own
// task. Tasks are failure-isolated: a row whose lookup fails ends with zero
// hits and a diagnostic, and never affects another row. Results are merged
// back by roster index.

use std::sync::Arc;

use futures_util::future::join_all;
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use hitboard_core::accuracy::PredictionRecord;
use hitboard_core::fetcher::fetch_actual_hits;
use hitboard_core::resolver::PlayerResolver;
use hitboard_core::roster::RosterEntry;
use hitboard_core::stats::{GameHits, PlayerId, StatQuery, StatsError, StatsSource};

// ---------------------------------------------------------------------------
// Row outcome
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RowStatus {
    Resolved,
    NotFound,
    Transport,
    Malformed,
    /// The row's task panicked or was cancelled.
    TaskFailed,
}

impl RowStatus {
    fn from_error(e: &StatsError) -> Self {
        match e {
            StatsError::Transport { .. } => RowStatus::Transport,
            StatsError::NotFound { .. } => RowStatus::NotFound,
            StatsError::MalformedData { .. } => RowStatus::Malformed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RowStatus::Resolved => "resolved",
            RowStatus::NotFound => "not_found",
            RowStatus::Transport => "transport",
            RowStatus::Malformed => "malformed",
            RowStatus::TaskFailed => "task_failed",
        }
    }
}

/// What happened to one roster row's lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowLookup {
    /// 1-based roster position, same as the record id.
    pub row: u32,
    pub player: String,
    pub status: RowStatus,
    pub player_id: Option<PlayerId>,
    pub actual_hits: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RowLookup {
    fn failed(row: u32, player: &str, status: RowStatus, message: String) -> Self {
        RowLookup {
            row,
            player: player.to_string(),
            status,
            player_id: None,
            actual_hits: 0,
            message: Some(message),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == RowStatus::Resolved
    }
}

// ---------------------------------------------------------------------------
// Primary fan-out: resolve + actual hits
// ---------------------------------------------------------------------------

async fn lookup_row(
    row: u32,
    player: String,
    resolver: Arc<PlayerResolver>,
    source: Arc<dyn StatsSource>,
    query: StatQuery,
) -> RowLookup {
    let id = match resolver.resolve(&player).await {
        Ok(id) => id,
        Err(e) => {
            warn!("row {} ({}): {}, using 0 hits: {}", row, player, e.kind(), e);
            return RowLookup::failed(row, &player, RowStatus::from_error(&e), e.to_string());
        }
    };

    match fetch_actual_hits(source.as_ref(), id, query).await {
        Ok(hits) => RowLookup {
            row,
            player,
            status: RowStatus::Resolved,
            player_id: Some(id),
            actual_hits: hits,
            message: None,
        },
        Err(e) => {
            warn!("row {} ({}): hits lookup failed, using 0: {}", row, player, e);
            // The id stays so the row can still get a game log.
            let mut lookup =
                RowLookup::failed(row, &player, RowStatus::from_error(&e), e.to_string());
            lookup.player_id = Some(id);
            lookup
        }
    }
}

/// Look up actual hits for every roster row, at most `max_in_flight` at a
/// time. The result has one entry per row, in roster order.
pub async fn lookup_rows(
    entries: &[RosterEntry],
    resolver: Arc<PlayerResolver>,
    source: Arc<dyn StatsSource>,
    query: StatQuery,
    max_in_flight: usize,
) -> Vec<RowLookup> {
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    let mut tasks = JoinSet::new();

    for (index, entry) in entries.iter().enumerate() {
        let row = index as u32 + 1;
        let player = entry.player.clone();
        let resolver = resolver.clone();
        let source = source.clone();
        let permits = permits.clone();
        tasks.spawn(async move {
            let _permit = permits.acquire_owned().await.ok();
            (index, lookup_row(row, player, resolver, source, query).await)
        });
    }

    let mut slots: Vec<Option<RowLookup>> = vec![None; entries.len()];
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, lookup)) => slots[index] = Some(lookup),
            Err(e) => error!("row lookup task failed: {}", e),
        }
    }

    let lookups: Vec<RowLookup> = slots
        .into_iter()
        .zip(entries)
        .enumerate()
        .map(|(index, (slot, entry))| {
            slot.unwrap_or_else(|| {
                RowLookup::failed(
                    index as u32 + 1,
                    &entry.player,
                    RowStatus::TaskFailed,
                    "lookup task did not complete".into(),
                )
            })
        })
        .collect();

    let resolved = lookups.iter().filter(|l| l.is_resolved()).count();
    debug!("{} of {} rows resolved", resolved, lookups.len());
    lookups
}

// ---------------------------------------------------------------------------
// Secondary fan-out: game logs
// ---------------------------------------------------------------------------

/// Game log for one leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowGameLog {
    pub record_id: u32,
    pub player: String,
    pub player_id: PlayerId,
    pub games: Vec<GameHits>,
}

/// Fetch game logs for `records` (already ranked). Rows that never resolved
/// are skipped; a failed fetch yields an empty log.
pub async fn fetch_game_logs(
    source: &dyn StatsSource,
    records: &[PredictionRecord],
    lookups: &[RowLookup],
    season: i32,
) -> Vec<RowGameLog> {
    let futures: Vec<_> = records
        .iter()
        .filter_map(|record| {
            let lookup = lookups.get(record.id.checked_sub(1)? as usize)?;
            Some((record, lookup.player_id?))
        })
        .map(|(record, player_id)| async move {
            let games = source
                .game_log(player_id, season)
                .await
                .unwrap_or_else(|e| {
                    warn!("game log for {} unavailable: {}", record.player, e);
                    Vec::new()
                });
            RowGameLog {
                record_id: record.id,
                player: record.player.clone(),
                player_id,
                games,
            }
        })
        .collect();

    join_all(futures).await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
