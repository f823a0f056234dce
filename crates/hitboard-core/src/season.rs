// Season clock: how much of the season has been played as of "now".
//
// The games-based estimate counts completed games in the contest's schedule
// window. When the schedule is unavailable (or, under the zero-games policy,
// reports nothing played yet) the calendar estimate is used instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::SeasonConfig;
use crate::stats::{Schedule, ScheduleWindow, StatsError, StatsSource};

const SECONDS_PER_DAY: f64 = 86_400.0;
const TBD: &str = "TBD";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressSource {
    Games,
    Calendar,
}

/// The next game on the schedule after "now".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NextGame {
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub start_time: Option<DateTime<Utc>>,
    pub venue: String,
}

/// Fraction of the season complete, and where the number came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonProgress {
    /// Always within `[0, 1]`.
    pub fraction: f64,
    pub source: ProgressSource,
    /// Raw schedule counts, present whenever the schedule was read.
    pub games_completed: Option<u32>,
    pub total_games: Option<u32>,
    pub next_game: Option<NextGame>,
}

impl SeasonProgress {
    /// Calendar-only progress for `now`.
    pub fn from_calendar(season: &SeasonConfig, now: DateTime<Utc>) -> Self {
        SeasonProgress {
            fraction: calendar_fraction(season, now),
            source: ProgressSource::Calendar,
            games_completed: None,
            total_games: None,
            next_game: None,
        }
    }

    pub fn percent(&self) -> f64 {
        self.fraction * 100.0
    }
}

// ---------------------------------------------------------------------------
// Calendar estimate
// ---------------------------------------------------------------------------

/// `clamp(now - start, 0, length) / length`, measured from midnight UTC of
/// the season's first day.
pub fn calendar_fraction(season: &SeasonConfig, now: DateTime<Utc>) -> f64 {
    if season.length_days == 0 {
        return 0.0;
    }
    let start = start_of_day(season.start_date);
    let season_secs = f64::from(season.length_days) * SECONDS_PER_DAY;
    let elapsed_secs = (now - start).num_seconds() as f64;
    elapsed_secs.clamp(0.0, season_secs) / season_secs
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

// ---------------------------------------------------------------------------
// Games-based estimate
// ---------------------------------------------------------------------------

/// Games on dates strictly before `now`, and the schedule's total.
///
/// A date counts as played once its midnight UTC has passed.
pub fn completed_games(schedule: &Schedule, now: DateTime<Utc>) -> (u32, u32) {
    let completed = schedule
        .dates
        .iter()
        .filter(|d| start_of_day(d.date) < now)
        .map(|d| d.total_games)
        .sum();
    (completed, schedule.total_games)
}

/// `completed / total`, clamped to `[0, 1]`; zero when the total is zero.
pub fn games_fraction(completed: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (f64::from(completed) / f64::from(total)).clamp(0.0, 1.0)
}

/// First not-yet-played date that has at least one game.
pub fn next_game(schedule: &Schedule, now: DateTime<Utc>) -> Option<NextGame> {
    let mut dates: Vec<_> = schedule.dates.iter().collect();
    dates.sort_by_key(|d| d.date);

    dates
        .into_iter()
        .filter(|d| start_of_day(d.date) >= now)
        .find_map(|d| {
            d.games.first().map(|game| NextGame {
                date: d.date,
                home_team: game.home_team.clone().unwrap_or_else(|| TBD.into()),
                away_team: game.away_team.clone().unwrap_or_else(|| TBD.into()),
                start_time: game.start_time,
                venue: game.venue.clone().unwrap_or_else(|| TBD.into()),
            })
        })
}

// ---------------------------------------------------------------------------
// Combining
// ---------------------------------------------------------------------------

/// Pick the progress estimate given the outcome of the schedule fetch.
///
/// Pure; [`compute_season_progress`] is the I/O wrapper.
pub fn resolve_progress(
    schedule: Result<Schedule, StatsError>,
    season: &SeasonConfig,
    now: DateTime<Utc>,
) -> SeasonProgress {
    let calendar = calendar_fraction(season, now);

    let schedule = match schedule {
        Ok(s) => s,
        Err(e) => {
            warn!(
                "schedule unavailable, using calendar progress {:.4}: {}",
                calendar, e
            );
            return SeasonProgress::from_calendar(season, now);
        }
    };

    let (completed, total) = completed_games(&schedule, now);
    let games = games_fraction(completed, total);
    let next = next_game(&schedule, now);
    debug!(completed, total, games, calendar, "season progress inputs");

    let (fraction, source) = if games == 0.0 && calendar > 0.0 && season.zero_games_fallback {
        warn!(
            "schedule reports no completed games; using calendar progress {:.4}",
            calendar
        );
        (calendar, ProgressSource::Calendar)
    } else {
        (games, ProgressSource::Games)
    };

    SeasonProgress {
        fraction,
        source,
        games_completed: Some(completed),
        total_games: Some(total),
        next_game: next,
    }
}

/// The schedule window the games-based estimate reads.
pub fn schedule_window(season: &SeasonConfig) -> ScheduleWindow {
    ScheduleWindow {
        sport_id: season.sport_id,
        team_id: season.schedule_team_id,
        start: season.start_date,
        end: season.contest_end,
    }
}

/// Season progress as of `now`. Never fails: schedule errors fall back to
/// the calendar estimate.
pub async fn compute_season_progress<S>(
    source: &S,
    season: &SeasonConfig,
    now: DateTime<Utc>,
) -> SeasonProgress
where
    S: StatsSource + ?Sized,
{
    let schedule = source.schedule(schedule_window(season)).await;
    resolve_progress(schedule, season, now)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
