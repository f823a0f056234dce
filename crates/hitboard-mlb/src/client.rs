// MLB Stats API client.
//
// Plain JSON GETs against the public statsapi endpoints, decoded into the
// `response` shapes and converted to hitboard types. Network failures and
// non-success statuses surface as `StatsError::Transport`; bodies that do not
// decode surface as `StatsError::MalformedData`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use hitboard_core::config::UpstreamConfig;
use hitboard_core::stats::{
    GameHits, PlayerHitting, PlayerId, PlayerIdentity, Schedule, ScheduleWindow, StatQuery,
    StatsError, StatsSource,
};

use crate::response::{
    PeopleResponse, PlayersResponse, RosterResponse, ScheduleResponse, StatsResponse,
};

/// Longest slice of an error body kept in a log line.
const ERROR_BODY_PREVIEW: usize = 200;

// ---------------------------------------------------------------------------
// MlbStatsClient
// ---------------------------------------------------------------------------

pub struct MlbStatsClient {
    http: reqwest::Client,
    base_url: String,
}

impl MlbStatsClient {
    /// Build a client with the configured timeout and user agent.
    pub fn new(config: &UpstreamConfig) -> reqwest::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, StatsError> {
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport(&url, &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                "upstream returned {} for {}: {}",
                status,
                url,
                preview(&body)
            );
            return Err(StatsError::Transport {
                url,
                status: Some(status.as_u16()),
                message: format!("HTTP {status}"),
            });
        }

        let bytes = response.bytes().await.map_err(|e| transport(&url, &e))?;
        decode(&url, &bytes)
    }
}

#[async_trait]
impl StatsSource for MlbStatsClient {
    async fn active_players(
        &self,
        sport_id: u32,
        season: i32,
    ) -> Result<Vec<PlayerIdentity>, StatsError> {
        let raw: PlayersResponse = self
            .get_json(players_url(&self.base_url, sport_id, season))
            .await?;
        let players = raw.into_identities();
        debug!("{} active players for season {}", players.len(), season);
        Ok(players)
    }

    async fn hitting(
        &self,
        player: PlayerId,
        query: StatQuery,
    ) -> Result<PlayerHitting, StatsError> {
        let raw: PeopleResponse = self
            .get_json(hitting_url(&self.base_url, player, query))
            .await?;
        Ok(raw.into_player_hitting(player))
    }

    async fn schedule(&self, window: ScheduleWindow) -> Result<Schedule, StatsError> {
        let raw: ScheduleResponse = self.get_json(schedule_url(&self.base_url, window)).await?;
        Ok(raw.into_schedule())
    }

    async fn team_roster(&self, team_id: u32, season: i32) -> Result<Vec<PlayerId>, StatsError> {
        let raw: RosterResponse = self
            .get_json(team_roster_url(&self.base_url, team_id, season))
            .await?;
        Ok(raw.into_player_ids())
    }

    async fn game_log(&self, player: PlayerId, season: i32) -> Result<Vec<GameHits>, StatsError> {
        let raw: StatsResponse = self
            .get_json(game_log_url(&self.base_url, player, season))
            .await?;
        Ok(raw.into_game_log())
    }
}

// ---------------------------------------------------------------------------
// URL builders
// ---------------------------------------------------------------------------

pub(crate) fn players_url(base: &str, sport_id: u32, season: i32) -> String {
    format!("{base}/sports/{sport_id}/players?season={season}")
}

pub(crate) fn hitting_url(base: &str, player: PlayerId, query: StatQuery) -> String {
    let stats = match query {
        StatQuery::Season { season } => {
            format!("stats(group=hitting,type=season,season={season})")
        }
        StatQuery::DateRange { start, end } => format!(
            "stats(group=hitting,type=byDateRange,startDate={},endDate={})",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d")
        ),
    };
    format!("{base}/people/{player}?hydrate={stats}")
}

pub(crate) fn schedule_url(base: &str, window: ScheduleWindow) -> String {
    format!(
        "{base}/schedule?hydrate=team,lineups&sportId={}&startDate={}&endDate={}&teamId={}",
        window.sport_id,
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d"),
        window.team_id
    )
}

pub(crate) fn team_roster_url(base: &str, team_id: u32, season: i32) -> String {
    format!("{base}/teams/{team_id}/roster?season={season}")
}

pub(crate) fn game_log_url(base: &str, player: PlayerId, season: i32) -> String {
    format!("{base}/people/{player}/stats?stats=gameLog&group=hitting&season={season}&hydrate=team")
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

fn transport(url: &str, e: &reqwest::Error) -> StatsError {
    StatsError::Transport {
        url: url.to_string(),
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    }
}

/// Decode a success body, mapping failures to `MalformedData`.
pub(crate) fn decode<T: DeserializeOwned>(url: &str, body: &[u8]) -> Result<T, StatsError> {
    serde_json::from_slice(body).map_err(|e| StatsError::MalformedData {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn preview(body: &str) -> &str {
    match body.char_indices().nth(ERROR_BODY_PREVIEW) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
