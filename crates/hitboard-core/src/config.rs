// Configuration loading and parsing (hitboard.toml).

use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Name of the single config file, relative to `config/` (and `defaults/`).
pub const CONFIG_FILE: &str = "hitboard.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub season: SeasonConfig,
    pub upstream: UpstreamConfig,
    pub roster: RosterConfig,
    pub leaderboard: LeaderboardConfig,
    pub team_hitters: TeamHittersConfig,
}

/// The season window shared by the season clock and the stat queries.
///
/// This is the only place season dates live; every consumer receives it
/// explicitly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeasonConfig {
    pub year: i32,
    pub start_date: NaiveDate,
    /// Length of the regular season in days, used by the calendar estimate.
    pub length_days: u32,
    /// Last day of the contest. Bounds the schedule window used for the
    /// games-based estimate.
    pub contest_end: NaiveDate,
    pub schedule_team_id: u32,
    #[serde(default = "default_sport_id")]
    pub sport_id: u32,
    /// Substitute the calendar estimate when the schedule reports zero
    /// completed games but the calendar says the season has started.
    #[serde(default = "default_true")]
    pub zero_games_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Upper bound on concurrently running per-row lookups.
    pub max_in_flight: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RosterConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaderboardConfig {
    pub top_n: usize,
    /// How many of the best-ranked rows get a game log attached.
    pub game_log_rows: usize,
    /// When set, actual hits are counted from season start through this date
    /// (capped at today) instead of the full season to date.
    #[serde(default)]
    pub stats_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamHittersConfig {
    pub team_id: u32,
    pub limit: usize,
}

fn default_sport_id() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("hitboard/{}", env!("CARGO_PKG_VERSION"))
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/hitboard.toml` relative to `base_dir`.
///
/// Does not copy defaults; see [`ensure_config_files`].
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Parse config text without validating it.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Seed `config/` from `defaults/`: every `defaults/*.toml` without a
/// counterpart under `config/` is copied over. Existing files are kept as
/// they are. Returns the files written, in name order.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        if config_dir.is_dir() {
            return Ok(Vec::new());
        }
        return Err(seed_error(format!(
            "neither defaults/ nor config/ directory found in {}; \
             run from the project root or pass --config-dir",
            base_dir.display()
        )));
    }

    let mut seeds: Vec<PathBuf> = std::fs::read_dir(&defaults_dir)
        .map_err(|e| seed_error(format!("cannot list {}: {e}", defaults_dir.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    seeds.sort();

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| seed_error(format!("cannot create {}: {e}", config_dir.display())))?;

    let mut copied = Vec::new();
    for seed in seeds {
        let Some(name) = seed.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if target.exists() {
            debug!("Keeping existing {}", target.display());
            continue;
        }
        std::fs::copy(&seed, &target).map_err(|e| {
            seed_error(format!(
                "cannot copy {} to {}: {e}",
                seed.display(),
                target.display()
            ))
        })?;
        copied.push(target);
    }

    Ok(copied)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn seed_error(message: String) -> ConfigError {
    ConfigError::DefaultsCopyError { message }
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let season = &config.season;
    if season.length_days == 0 {
        return Err(invalid("season.length_days", "must be greater than 0"));
    }
    if season.contest_end < season.start_date {
        return Err(invalid(
            "season.contest_end",
            format!(
                "must not be before season.start_date ({} < {})",
                season.contest_end, season.start_date
            ),
        ));
    }

    let upstream = &config.upstream;
    if upstream.base_url.trim().is_empty() {
        return Err(invalid("upstream.base_url", "must not be empty"));
    }
    if upstream.timeout_secs == 0 {
        return Err(invalid("upstream.timeout_secs", "must be greater than 0"));
    }
    if upstream.max_in_flight == 0 {
        return Err(invalid("upstream.max_in_flight", "must be greater than 0"));
    }

    if config.roster.path.trim().is_empty() {
        return Err(invalid("roster.path", "must not be empty"));
    }

    if config.leaderboard.top_n == 0 {
        return Err(invalid("leaderboard.top_n", "must be greater than 0"));
    }
    if let Some(end) = config.leaderboard.stats_end_date {
        if end < season.start_date {
            return Err(invalid(
                "leaderboard.stats_end_date",
                format!("must not be before season.start_date, got {end}"),
            ));
        }
    }

    if config.team_hitters.limit == 0 {
        return Err(invalid("team_hitters.limit", "must be greater than 0"));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
