// Actual-hits lookup for a resolved player.

use chrono::NaiveDate;
use tracing::debug;

use crate::config::SeasonConfig;
use crate::stats::{PlayerId, StatQuery, StatsError, StatsSource};

/// Build the hitting query for `season`: a closed range from season start
/// through `end_date` when one is given, the full season otherwise.
///
/// An end date before season start collapses to the opening day.
pub fn stat_query(season: &SeasonConfig, end_date: Option<NaiveDate>) -> StatQuery {
    match end_date {
        Some(end) => StatQuery::DateRange {
            start: season.start_date,
            end: end.max(season.start_date),
        },
        None => StatQuery::Season {
            season: season.year,
        },
    }
}

/// Hits for `player` over `query`. A player with no hitting line, or a line
/// without a hits figure, has zero hits.
pub async fn fetch_actual_hits<S>(
    source: &S,
    player: PlayerId,
    query: StatQuery,
) -> Result<u32, StatsError>
where
    S: StatsSource + ?Sized,
{
    let hitting = source.hitting(player, query).await?;
    let hits = hitting.line.and_then(|line| line.hits).unwrap_or(0);
    debug!("player {} has {} hits for {:?}", player, hits, query);
    Ok(hits)
}
