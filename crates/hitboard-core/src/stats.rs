// Upstream statistics seam: the data shapes the pipeline consumes and the
// trait a concrete stats client implements.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Failure talking to the upstream statistics feed.
///
/// Cloneable so one failed directory fetch can be reported by every row that
/// depended on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// Upstream unreachable or answered with a non-success status.
    #[error("transport error for {url}: {message}")]
    Transport {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// The player name has no match in the active-player directory.
    #[error("player '{name}' not found for season {season}")]
    NotFound { name: String, season: i32 },

    /// A successful response whose body could not be decoded.
    #[error("malformed response from {url}: {message}")]
    MalformedData { url: String, message: String },
}

impl StatsError {
    /// Short label used in per-row diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            StatsError::Transport { .. } => "transport",
            StatsError::NotFound { .. } => "not_found",
            StatsError::MalformedData { .. } => "malformed",
        }
    }
}

// ---------------------------------------------------------------------------
// Data shapes
// ---------------------------------------------------------------------------

/// Upstream numeric player identifier.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the active-player directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: PlayerId,
    pub full_name: String,
}

/// Which slice of a season a hitting query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatQuery {
    /// Full season to date.
    Season { season: i32 },
    /// Closed date range, both ends inclusive.
    DateRange { start: NaiveDate, end: NaiveDate },
}

/// Person details returned alongside a hitting line.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: PlayerId,
    pub full_name: String,
    pub position: Option<String>,
}

/// Hitting totals for one player over one query window. Every field is
/// optional because the upstream omits what it does not have.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HittingLine {
    pub hits: Option<u32>,
    pub games_played: Option<u32>,
    pub at_bats: Option<u32>,
    pub avg: Option<String>,
}

/// Result of a hitting query: who, plus their line if they have one.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerHitting {
    pub person: PersonSummary,
    pub line: Option<HittingLine>,
}

/// Hits recorded in a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameHits {
    pub date: NaiveDate,
    pub hits: u32,
}

/// Schedule window used by the season clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub sport_id: u32,
    pub team_id: u32,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Games scheduled in a window, grouped by date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Schedule {
    pub total_games: u32,
    pub dates: Vec<ScheduleDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleDate {
    pub date: NaiveDate,
    pub total_games: u32,
    pub games: Vec<ScheduledGame>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduledGame {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub venue: Option<String>,
}

// ---------------------------------------------------------------------------
// StatsSource
// ---------------------------------------------------------------------------

/// Read-only access to the upstream statistics feed.
#[async_trait]
pub trait StatsSource: Send + Sync {
    /// Every player listed for the sport and season.
    async fn active_players(&self, sport_id: u32, season: i32)
        -> Result<Vec<PlayerIdentity>, StatsError>;

    /// Hitting totals for one player over `query`.
    async fn hitting(&self, player: PlayerId, query: StatQuery)
        -> Result<PlayerHitting, StatsError>;

    async fn schedule(&self, window: ScheduleWindow) -> Result<Schedule, StatsError>;

    /// Player ids on a team's roster for the season.
    async fn team_roster(&self, team_id: u32, season: i32) -> Result<Vec<PlayerId>, StatsError>;

    /// Game-by-game hits for the season, in feed order.
    async fn game_log(&self, player: PlayerId, season: i32) -> Result<Vec<GameHits>, StatsError>;
}
