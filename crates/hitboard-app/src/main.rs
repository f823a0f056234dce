// hitboard entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (log to file; stdout carries the report)
// 3. Seed and load config
// 4. Build the MLB Stats API client and the service
// 5. Run the subcommand and print text or JSON

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use hitboard_app::report;
use hitboard_app::service::HitboardService;
use hitboard_core::config;
use hitboard_mlb::MlbStatsClient;

/// Games shown per hitter in the team report.
const RECENT_GAMES: usize = 5;

#[derive(Parser)]
#[command(name = "hitboard")]
#[command(
    about = "Hit-prediction contest leaderboard backed by the MLB Stats API",
    long_about = None
)]
struct Cli {
    /// Directory containing config/, defaults/ and the roster
    #[arg(long, default_value = ".")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ranked prediction leaderboard
    Leaderboard {
        /// Rows in the table (defaults to leaderboard.top_n)
        #[arg(long)]
        top: Option<usize>,
        #[arg(long)]
        json: bool,
    },
    /// Season progress and the next game
    Progress {
        #[arg(long)]
        json: bool,
    },
    /// Actual hits for one player
    Player {
        /// Full player name, e.g. "Aaron Judge"
        name: String,
        #[arg(long)]
        json: bool,
    },
    /// Top hitters on a team with their game logs
    Team {
        #[arg(long)]
        team_id: Option<u32>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.config_dir)?;
    info!("hitboard starting");

    let copied = config::ensure_config_files(&cli.config_dir)
        .context("failed to seed config from defaults")?;
    for path in &copied {
        info!("Copied default config: {}", path.display());
    }
    let config =
        config::load_config_from(&cli.config_dir).context("failed to load configuration")?;
    info!(
        "Config loaded: season {} from {} ({} days), contest ends {}",
        config.season.year,
        config.season.start_date,
        config.season.length_days,
        config.season.contest_end
    );

    let client =
        MlbStatsClient::new(&config.upstream).context("failed to build MLB Stats API client")?;
    info!("Upstream: {}", client.base_url());

    let top_n = config.leaderboard.top_n;
    let team_defaults = config.team_hitters.clone();
    let contest_end = config.season.contest_end;
    let service = HitboardService::new(Arc::new(client), config, cli.config_dir.clone());
    let now = Utc::now();

    match cli.command {
        Commands::Leaderboard { top, json } => {
            let board = service
                .leaderboard(now)
                .await
                .context("failed to build leaderboard")?;
            emit(json, &board, |b| report::leaderboard_report(b, top.unwrap_or(top_n)))?;
        }
        Commands::Progress { json } => {
            let progress = service.season_progress(now).await;
            emit(json, &progress, |p| report::progress_report(p, contest_end))?;
        }
        Commands::Player { name, json } => {
            let hits = service
                .player_hits(&name, now)
                .await
                .with_context(|| format!("failed to look up hits for '{name}'"))?;
            emit(json, &hits, report::player_hits_line)?;
        }
        Commands::Team {
            team_id,
            limit,
            json,
        } => {
            let team_id = team_id.unwrap_or(team_defaults.team_id);
            let hitters = service
                .team_hitters(team_id, limit.unwrap_or(team_defaults.limit), now)
                .await
                .with_context(|| format!("failed to load hitters for team {team_id}"))?;
            emit(json, &hitters, |h| report::team_hitters_report(h, RECENT_GAMES))?;
        }
    }

    info!("hitboard done");
    Ok(())
}

/// Print `value` as pretty JSON, or as the text `render` produces.
fn emit<T: Serialize>(
    json: bool,
    value: &T,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<()> {
    if json {
        let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
        println!("{text}");
    } else {
        print!("{}", render(value));
    }
    Ok(())
}

/// Initialize tracing to log to `<base_dir>/logs/hitboard.log`.
fn init_tracing(base_dir: &Path) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let log_dir = base_dir.join("logs");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;

    let log_file = std::fs::File::create(log_dir.join("hitboard.log"))
        .context("failed to create log file")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hitboard=info,warn"));

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(log_file)
        .with_ansi(false)
        .with_target(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
