// MLB Stats API response shapes and their conversion into hitboard types.
//
// Every container field defaults when absent: the API drops empty arrays and
// objects rather than sending them, and an absent stat means "none yet".

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use hitboard_core::stats::{
    GameHits, HittingLine, PersonSummary, PlayerHitting, PlayerId, PlayerIdentity, Schedule,
    ScheduleDate, ScheduledGame,
};

// ---------------------------------------------------------------------------
// /sports/{sportId}/players
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlayersResponse {
    #[serde(default)]
    pub people: Vec<RawPlayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPlayer {
    pub id: u64,
    #[serde(default)]
    pub full_name: Option<String>,
}

impl PlayersResponse {
    /// Directory entries; players listed without a name cannot be matched
    /// and are dropped.
    pub fn into_identities(self) -> Vec<PlayerIdentity> {
        self.people
            .into_iter()
            .filter_map(|p| {
                p.full_name.map(|full_name| PlayerIdentity {
                    id: PlayerId(p.id),
                    full_name,
                })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// /people/{id}?hydrate=stats(...)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PeopleResponse {
    #[serde(default)]
    pub people: Vec<RawPerson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPerson {
    pub id: u64,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub primary_position: Option<RawPosition>,
    #[serde(default)]
    pub stats: Vec<RawStatGroup>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPosition {
    #[serde(default)]
    pub abbreviation: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawStatGroup {
    #[serde(default)]
    pub splits: Vec<RawSplit>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawSplit {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub stat: Option<RawHittingStat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawHittingStat {
    #[serde(default)]
    pub hits: Option<u32>,
    #[serde(default)]
    pub games_played: Option<u32>,
    #[serde(default)]
    pub at_bats: Option<u32>,
    #[serde(default)]
    pub avg: Option<String>,
}

impl PeopleResponse {
    /// The first person's first split, i.e. `people[0].stats[0].splits[0].stat`.
    ///
    /// An empty `people` array yields a summary carrying only `requested`.
    pub fn into_player_hitting(self, requested: PlayerId) -> PlayerHitting {
        let Some(person) = self.people.into_iter().next() else {
            return PlayerHitting {
                person: PersonSummary {
                    id: requested,
                    ..Default::default()
                },
                line: None,
            };
        };

        let line = person
            .stats
            .into_iter()
            .next()
            .and_then(|group| group.splits.into_iter().next())
            .and_then(|split| split.stat)
            .map(|stat| HittingLine {
                hits: stat.hits,
                games_played: stat.games_played,
                at_bats: stat.at_bats,
                avg: stat.avg,
            });

        PlayerHitting {
            person: PersonSummary {
                id: PlayerId(person.id),
                full_name: person.full_name,
                position: person.primary_position.and_then(|p| p.abbreviation),
            },
            line,
        }
    }
}

// ---------------------------------------------------------------------------
// /people/{id}/stats?stats=gameLog
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct StatsResponse {
    #[serde(default)]
    pub stats: Vec<RawStatGroup>,
}

impl StatsResponse {
    /// One entry per dated split; a game without a hits figure had none.
    pub fn into_game_log(self) -> Vec<GameHits> {
        self.stats
            .into_iter()
            .next()
            .map(|group| group.splits)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|split| {
                let date = split.date?;
                let hits = split.stat.and_then(|s| s.hits).unwrap_or(0);
                Some(GameHits { date, hits })
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// /teams/{id}/roster
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RosterResponse {
    #[serde(default)]
    pub roster: Vec<RawRosterSlot>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawRosterSlot {
    pub person: RawPersonRef,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPersonRef {
    pub id: u64,
}

impl RosterResponse {
    pub fn into_player_ids(self) -> Vec<PlayerId> {
        self.roster
            .into_iter()
            .map(|slot| PlayerId(slot.person.id))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// /schedule
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ScheduleResponse {
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub dates: Vec<RawScheduleDate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawScheduleDate {
    pub date: NaiveDate,
    #[serde(default)]
    pub total_games: u32,
    #[serde(default)]
    pub games: Vec<RawGame>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawGame {
    #[serde(default)]
    pub game_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub teams: Option<RawMatchup>,
    #[serde(default)]
    pub venue: Option<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawMatchup {
    #[serde(default)]
    pub home: Option<RawSide>,
    #[serde(default)]
    pub away: Option<RawSide>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSide {
    #[serde(default)]
    pub team: Option<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

fn side_name(side: Option<RawSide>) -> Option<String> {
    side.and_then(|s| s.team).and_then(|t| t.name)
}

impl ScheduleResponse {
    pub fn into_schedule(self) -> Schedule {
        let dates = self
            .dates
            .into_iter()
            .map(|d| ScheduleDate {
                date: d.date,
                total_games: d.total_games,
                games: d
                    .games
                    .into_iter()
                    .map(|g| {
                        let teams = g.teams.unwrap_or_default();
                        ScheduledGame {
                            home_team: side_name(teams.home),
                            away_team: side_name(teams.away),
                            start_time: g.game_date,
                            venue: g.venue.and_then(|v| v.name),
                        }
                    })
                    .collect(),
            })
            .collect();

        Schedule {
            total_games: self.total_games,
            dates,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn decode<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    // -- Players --

    #[test]
    fn players_into_identities() {
        let raw: PlayersResponse = decode(
            r#"{
                "copyright": "...",
                "people": [
                    { "id": 592450, "fullName": "Aaron Judge", "active": true },
                    { "id": 660271, "fullName": "Shohei Ohtani" },
                    { "id": 1 }
                ]
            }"#,
        );
        let players = raw.into_identities();
        assert_eq!(players.len(), 2);
        assert_eq!(players[0].id, PlayerId(592450));
        assert_eq!(players[0].full_name, "Aaron Judge");
    }

    #[test]
    fn players_missing_people_is_empty() {
        let raw: PlayersResponse = decode(r#"{ "copyright": "..." }"#);
        assert!(raw.into_identities().is_empty());
    }

    // -- Hitting --

    #[test]
    fn hitting_line_from_first_split() {
        let raw: PeopleResponse = decode(
            r#"{
                "people": [{
                    "id": 592450,
                    "fullName": "Aaron Judge",
                    "primaryPosition": { "code": "9", "abbreviation": "RF" },
                    "stats": [{
                        "type": { "displayName": "season" },
                        "splits": [{
                            "season": "2025",
                            "stat": { "gamesPlayed": 30, "atBats": 110, "hits": 42, "avg": ".382" }
                        }]
                    }]
                }]
            }"#,
        );
        let hitting = raw.into_player_hitting(PlayerId(592450));
        assert_eq!(hitting.person.full_name, "Aaron Judge");
        assert_eq!(hitting.person.position.as_deref(), Some("RF"));
        let line = hitting.line.unwrap();
        assert_eq!(line.hits, Some(42));
        assert_eq!(line.games_played, Some(30));
        assert_eq!(line.at_bats, Some(110));
        assert_eq!(line.avg.as_deref(), Some(".382"));
    }

    #[test]
    fn hitting_without_stats_has_no_line() {
        let raw: PeopleResponse =
            decode(r#"{ "people": [{ "id": 7, "fullName": "Pitcher Only" }] }"#);
        let hitting = raw.into_player_hitting(PlayerId(7));
        assert_eq!(hitting.person.id, PlayerId(7));
        assert!(hitting.line.is_none());
    }

    #[test]
    fn hitting_with_empty_splits_has_no_line() {
        let raw: PeopleResponse =
            decode(r#"{ "people": [{ "id": 7, "stats": [{ "splits": [] }] }] }"#);
        assert!(raw.into_player_hitting(PlayerId(7)).line.is_none());
    }

    #[test]
    fn hitting_stat_without_hits_field() {
        let raw: PeopleResponse = decode(
            r#"{ "people": [{ "id": 7, "stats": [{ "splits": [{ "stat": { "gamesPlayed": 2 } }] }] }] }"#,
        );
        let line = raw.into_player_hitting(PlayerId(7)).line.unwrap();
        assert_eq!(line.hits, None);
        assert_eq!(line.games_played, Some(2));
    }

    #[test]
    fn hitting_empty_people_keeps_requested_id() {
        let raw: PeopleResponse = decode(r#"{ "people": [] }"#);
        let hitting = raw.into_player_hitting(PlayerId(99));
        assert_eq!(hitting.person.id, PlayerId(99));
        assert!(hitting.line.is_none());
    }

    // -- Game log --

    #[test]
    fn game_log_entries_in_feed_order() {
        let raw: StatsResponse = decode(
            r#"{
                "stats": [{
                    "splits": [
                        { "date": "2025-03-27", "stat": { "hits": 2 } },
                        { "date": "2025-03-28", "stat": { "atBats": 4 } },
                        { "date": "2025-03-29" },
                        { "stat": { "hits": 5 } }
                    ]
                }]
            }"#,
        );
        let log = raw.into_game_log();
        assert_eq!(log.len(), 3);
        assert_eq!(log[0].date, NaiveDate::from_ymd_opt(2025, 3, 27).unwrap());
        assert_eq!(log[0].hits, 2);
        assert_eq!(log[1].hits, 0);
        assert_eq!(log[2].hits, 0);
    }

    #[test]
    fn game_log_missing_stats_is_empty() {
        let raw: StatsResponse = decode("{}");
        assert!(raw.into_game_log().is_empty());
    }

    // -- Team roster --

    #[test]
    fn roster_ids() {
        let raw: RosterResponse = decode(
            r#"{ "roster": [
                { "person": { "id": 1, "fullName": "A" }, "jerseyNumber": "1" },
                { "person": { "id": 2 } }
            ] }"#,
        );
        assert_eq!(raw.into_player_ids(), vec![PlayerId(1), PlayerId(2)]);
    }

    // -- Schedule --

    #[test]
    fn schedule_dates_and_games() {
        let raw: ScheduleResponse = decode(
            r#"{
                "totalItems": 2,
                "totalGames": 2,
                "dates": [
                    {
                        "date": "2025-03-27",
                        "totalGames": 1,
                        "games": [{
                            "gamePk": 778547,
                            "gameDate": "2025-03-27T20:10:00Z",
                            "teams": {
                                "away": { "team": { "id": 137, "name": "San Francisco Giants" } },
                                "home": { "team": { "id": 113, "name": "Cincinnati Reds" } }
                            },
                            "venue": { "id": 2602, "name": "Great American Ball Park" }
                        }]
                    },
                    { "date": "2025-03-28", "totalGames": 1, "games": [{}] }
                ]
            }"#,
        );
        let schedule = raw.into_schedule();
        assert_eq!(schedule.total_games, 2);
        assert_eq!(schedule.dates.len(), 2);

        let first = &schedule.dates[0].games[0];
        assert_eq!(first.home_team.as_deref(), Some("Cincinnati Reds"));
        assert_eq!(first.away_team.as_deref(), Some("San Francisco Giants"));
        assert_eq!(first.venue.as_deref(), Some("Great American Ball Park"));
        assert!(first.start_time.is_some());

        let second = &schedule.dates[1].games[0];
        assert_eq!(*second, ScheduledGame::default());
    }

    #[test]
    fn schedule_without_dates() {
        let raw: ScheduleResponse = decode(r#"{ "totalGames": 0 }"#);
        let schedule = raw.into_schedule();
        assert_eq!(schedule.total_games, 0);
        assert!(schedule.dates.is_empty());
    }
}
