// Player name resolution against the upstream active-player directory.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::stats::{PlayerId, PlayerIdentity, StatsError, StatsSource};

/// Case-insensitive full-name index over one season's active players.
#[derive(Debug, Clone, Default)]
pub struct PlayerDirectory {
    by_name: HashMap<String, PlayerId>,
}

impl PlayerDirectory {
    pub fn new(players: Vec<PlayerIdentity>) -> Self {
        let mut by_name = HashMap::with_capacity(players.len());
        for p in players {
            // First listing wins, matching a front-to-back search.
            by_name.entry(normalize(&p.full_name)).or_insert(p.id);
        }
        PlayerDirectory { by_name }
    }

    /// Exact match ignoring case and surrounding whitespace.
    pub fn lookup(&self, full_name: &str) -> Option<PlayerId> {
        self.by_name.get(&normalize(full_name)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Resolve one name with a fresh directory fetch.
pub async fn resolve_player_id<S>(
    source: &S,
    sport_id: u32,
    season: i32,
    full_name: &str,
) -> Result<PlayerId, StatsError>
where
    S: StatsSource + ?Sized,
{
    let players = source.active_players(sport_id, season).await?;
    PlayerDirectory::new(players)
        .lookup(full_name)
        .ok_or_else(|| StatsError::NotFound {
            name: full_name.to_string(),
            season,
        })
}

/// Resolver shared by every row of a single leaderboard load.
///
/// The directory is fetched on the first call and reused by the rest of the
/// load, including its failure. Build a new resolver for each load.
pub struct PlayerResolver {
    source: Arc<dyn StatsSource>,
    sport_id: u32,
    season: i32,
    directory: OnceCell<Result<Arc<PlayerDirectory>, StatsError>>,
}

impl PlayerResolver {
    pub fn new(source: Arc<dyn StatsSource>, sport_id: u32, season: i32) -> Self {
        PlayerResolver {
            source,
            sport_id,
            season,
            directory: OnceCell::new(),
        }
    }

    async fn directory(&self) -> Result<Arc<PlayerDirectory>, StatsError> {
        self.directory
            .get_or_init(|| async {
                self.source
                    .active_players(self.sport_id, self.season)
                    .await
                    .map(|players| {
                        let directory = PlayerDirectory::new(players);
                        info!(
                            "loaded {} active players for season {}",
                            directory.len(),
                            self.season
                        );
                        Arc::new(directory)
                    })
            })
            .await
            .clone()
    }

    pub async fn resolve(&self, full_name: &str) -> Result<PlayerId, StatsError> {
        let directory = self.directory().await?;
        let id = directory.lookup(full_name).ok_or_else(|| StatsError::NotFound {
            name: full_name.to_string(),
            season: self.season,
        })?;
        debug!("resolved '{}' to player {}", full_name, id);
        Ok(id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
