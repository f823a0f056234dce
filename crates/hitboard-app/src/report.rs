// Plain-text rendering of service results.

use std::fmt::Write;

use chrono::NaiveDate;

use hitboard_core::accuracy::{Deviation, PredictionRecord};
use hitboard_core::leaderboard::Leaderboard;
use hitboard_core::season::{NextGame, ProgressSource, SeasonProgress};

use crate::pipeline::RowLookup;
use crate::service::{LeaderboardReport, PlayerHitsReport, TeamHittersReport};

const LEADERBOARD_HEADERS: [&str; 7] = [
    "Rank",
    "Student",
    "Player",
    "Predicted Hits",
    "Predicted (To Date)",
    "Actual Hits",
    "Delta",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

// ---------------------------------------------------------------------------
// Table layout
// ---------------------------------------------------------------------------

fn render_table(headers: &[&str], align: &[Align], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    push_row(&mut out, &header_cells, &widths, align);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_row(&mut out, &rule, &widths, align);
    for row in rows {
        push_row(&mut out, row, &widths, align);
    }
    out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize], align: &[Align]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .zip(align)
        .map(|((cell, w), a)| match a {
            Align::Left => format!("{cell:<w$}", w = *w),
            Align::Right => format!("{cell:>w$}", w = *w),
        })
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// `25.00%` or `∞`.
pub fn delta_cell(deviation: &Deviation) -> String {
    deviation.to_string()
}

/// Top-guesses table followed by the proration footnote.
pub fn leaderboard_table(records: &[PredictionRecord], contest_end: NaiveDate) -> String {
    use Align::{Left, Right};

    let rows: Vec<Vec<String>> = records
        .iter()
        .enumerate()
        .map(|(i, r)| {
            vec![
                (i + 1).to_string(),
                r.student.clone(),
                r.player.clone(),
                r.predicted_hits
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".into()),
                format!("{:.1}", r.predicted_hits_to_date),
                r.actual_hits.to_string(),
                delta_cell(&r.deviation),
            ]
        })
        .collect();

    let mut out = render_table(
        &LEADERBOARD_HEADERS,
        &[Right, Left, Left, Right, Right, Right, Right],
        &rows,
    );
    out.push('\n');
    out.push_str(&proration_footnote(contest_end));
    out.push('\n');
    out
}

pub fn proration_footnote(contest_end: NaiveDate) -> String {
    format!(
        "Predicted hits (to date) are calculated based on the proportion of MLB games \
         completed so far in the season (until our end date {}).",
        contest_end.format("%B %-d")
    )
}

fn badge(deviation: &Deviation) -> String {
    match deviation {
        Deviation::Finite(p) => format!("±{p}%"),
        Deviation::Unbounded => "∞".into(),
    }
}

fn first_name(student: &str) -> &str {
    student.split_whitespace().next().unwrap_or(student)
}

/// Highlight cards: the podium plus the furthest prediction.
pub fn highlight_cards(board: &Leaderboard) -> String {
    let mut out = String::new();
    for card in board.highlights() {
        let r = card.record;
        let predicted = r
            .predicted_hits
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{}: {} [{}]",
            card.label,
            first_name(&r.student),
            badge(&r.deviation)
        );
        let _ = writeln!(
            out,
            "  Guessed {} hits → {} to date",
            predicted, r.predicted_hits_to_date
        );
        let _ = writeln!(out, "  {} is at {} hits", r.player, r.actual_hits);
    }
    out
}

fn diagnostics(rows: &[&RowLookup]) -> String {
    let mut out = String::from("Lookup problems (counted as 0 hits):\n");
    for row in rows {
        let _ = writeln!(
            out,
            "  row {} ({}): {}",
            row.row,
            row.player,
            row.message.as_deref().unwrap_or(row.status.as_str())
        );
    }
    out
}

/// Full leaderboard report: progress, cards, top-`top` table and any failed
/// lookups.
pub fn leaderboard_report(report: &LeaderboardReport, top: usize) -> String {
    let mut out = String::new();
    out.push_str(&progress_report(&report.progress, report.contest_end));
    out.push('\n');

    if report.leaderboard.is_empty() {
        out.push_str("No predictions in the roster.\n");
        return out;
    }

    out.push_str(&highlight_cards(&report.leaderboard));
    out.push('\n');
    out.push_str(&leaderboard_table(
        report.leaderboard.top(top),
        report.contest_end,
    ));

    let failed: Vec<&RowLookup> = report.failed_rows().collect();
    if !failed.is_empty() {
        out.push('\n');
        out.push_str(&diagnostics(&failed));
    }
    out
}

// ---------------------------------------------------------------------------
// Season progress
// ---------------------------------------------------------------------------

pub fn progress_line(progress: &SeasonProgress, contest_end: NaiveDate) -> String {
    let until = contest_end.format("%B %-d");
    let percent = progress.percent().round();
    match (progress.source, progress.games_completed, progress.total_games) {
        (ProgressSource::Games, Some(done), Some(total)) => {
            format!("{done} of {total} games completed ({percent}%) until {until}")
        }
        _ => format!("{percent}% of the season elapsed (calendar estimate) until {until}"),
    }
}

pub fn next_game_line(game: &NextGame) -> String {
    let when = match game.start_time {
        Some(t) => format!("{} at {} UTC", game.date.format("%a, %b %-d"), t.format("%-I:%M %p")),
        None => game.date.format("%a, %b %-d").to_string(),
    };
    format!("{} @ {} - {}", game.away_team, game.home_team, when)
}

pub fn progress_report(progress: &SeasonProgress, contest_end: NaiveDate) -> String {
    let mut out = progress_line(progress, contest_end);
    out.push('\n');
    if let Some(game) = &progress.next_game {
        out.push_str("Next game: ");
        out.push_str(&next_game_line(game));
        out.push('\n');
        out.push_str("  ");
        out.push_str(&game.venue);
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// Player and team
// ---------------------------------------------------------------------------

pub fn player_hits_line(report: &PlayerHitsReport) -> String {
    format!(
        "{} ({}): {} hits in {}\n",
        report.name, report.player_id, report.hits, report.season
    )
}

/// Hitters table plus each hitter's most recent games.
pub fn team_hitters_report(report: &TeamHittersReport, recent_games: usize) -> String {
    use Align::{Left, Right};

    let mut out = format!(
        "Team {} top hitters, {} to {}\n\n",
        report.team_id, report.start, report.end
    );
    if report.hitters.is_empty() {
        out.push_str("No hitters with stats in this range.\n");
        return out;
    }

    let rows: Vec<Vec<String>> = report
        .hitters
        .iter()
        .enumerate()
        .map(|(i, h)| {
            vec![
                (i + 1).to_string(),
                h.name.clone(),
                h.position.clone(),
                h.hits.to_string(),
                h.games.to_string(),
                h.at_bats.to_string(),
                h.avg.clone(),
            ]
        })
        .collect();
    out.push_str(&render_table(
        &["#", "Name", "Pos", "H", "G", "AB", "AVG"],
        &[Right, Left, Left, Right, Right, Right, Right],
        &rows,
    ));

    out.push('\n');
    for h in &report.hitters {
        let skip = h.hits_by_date.len().saturating_sub(recent_games);
        let games: Vec<String> = h.hits_by_date[skip..]
            .iter()
            .map(|g| format!("{} {}", g.date.format("%m/%d"), g.hits))
            .collect();
        if games.is_empty() {
            let _ = writeln!(out, "{}: no game log", h.name);
        } else {
            let _ = writeln!(out, "{}: {}", h.name, games.join(", "));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use hitboard_core::stats::{GameHits, PlayerId};

    use crate::service::TeamHitter;

    fn may31() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 31).unwrap()
    }

    fn record(
        student: &str,
        player: &str,
        to_date: f64,
        actual: u32,
        deviation: Deviation,
    ) -> PredictionRecord {
        PredictionRecord {
            id: 1,
            student: student.into(),
            player: player.into(),
            predicted_hits: Some(100),
            predicted_hits_to_date: to_date,
            actual_hits: actual,
            hits_delta: to_date - f64::from(actual),
            deviation,
        }
    }

    #[test]
    fn table_rows_and_footnote() {
        let records = vec![
            record("Ana Lopez", "Aaron Judge", 50.0, 40, Deviation::Finite(25.0)),
            record("Bo", "Juan Soto", 50.0, 0, Deviation::Unbounded),
        ];
        let text = leaderboard_table(&records, may31());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("Rank"));
        assert!(lines[0].ends_with("Delta"));
        assert!(lines[1].starts_with("----"));
        assert!(lines[2].contains("Ana Lopez"));
        assert!(lines[2].contains("50.0"));
        assert!(lines[2].ends_with("25.00%"));
        assert!(lines[3].ends_with("∞"));
        assert!(text.contains("(until our end date May 31)"));
    }

    #[test]
    fn table_columns_line_up() {
        let records = vec![
            record("A", "Short", 5.0, 4, Deviation::Finite(25.0)),
            record("Much Longer Name", "P", 5.0, 5, Deviation::Finite(0.0)),
        ];
        let text = leaderboard_table(&records, may31());
        let lines: Vec<&str> = text.lines().take(4).collect();
        let player_col = lines[0].find("Player").unwrap();
        assert_eq!(lines[2].find("Short"), Some(player_col));
    }

    #[test]
    fn cards_use_first_name_and_badge() {
        let board = Leaderboard::from_records(vec![
            record("Ana Lopez", "Aaron Judge", 50.0, 40, Deviation::Finite(25.0)),
            record("Bo Kim", "Juan Soto", 50.0, 0, Deviation::Unbounded),
        ]);
        let text = highlight_cards(&board);
        assert!(text.contains("1st Place: Ana [±25%]"));
        assert!(text.contains("Guessed 100 hits → 50 to date"));
        assert!(text.contains("Aaron Judge is at 40 hits"));
        assert!(text.contains("2nd Place: Bo [∞]"));
        assert!(!text.contains("Furthest Prediction"));
    }

    fn progress(
        source: ProgressSource,
        counts: Option<(u32, u32)>,
        fraction: f64,
    ) -> SeasonProgress {
        SeasonProgress {
            fraction,
            source,
            games_completed: counts.map(|c| c.0),
            total_games: counts.map(|c| c.1),
            next_game: None,
        }
    }

    #[test]
    fn progress_line_from_games() {
        let p = progress(ProgressSource::Games, Some((27, 55)), 27.0 / 55.0);
        assert_eq!(
            progress_line(&p, may31()),
            "27 of 55 games completed (49%) until May 31"
        );
    }

    #[test]
    fn progress_line_from_calendar() {
        let p = progress(ProgressSource::Calendar, None, 30.0 / 186.0);
        assert_eq!(
            progress_line(&p, may31()),
            "16% of the season elapsed (calendar estimate) until May 31"
        );
    }

    #[test]
    fn progress_report_includes_next_game() {
        let mut p = progress(ProgressSource::Games, Some((1, 2)), 0.5);
        p.next_game = Some(NextGame {
            date: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            home_team: "San Francisco Giants".into(),
            away_team: "Seattle Mariners".into(),
            start_time: Some(Utc.with_ymd_and_hms(2025, 4, 3, 20, 45, 0).unwrap()),
            venue: "Oracle Park".into(),
        });
        let text = progress_report(&p, may31());
        assert!(text.contains(
            "Next game: Seattle Mariners @ San Francisco Giants - Thu, Apr 3 at 8:45 PM UTC"
        ));
        assert!(text.contains("  Oracle Park"));
    }

    #[test]
    fn team_report_lists_recent_games() {
        let report = TeamHittersReport {
            team_id: 137,
            season: 2025,
            start: NaiveDate::from_ymd_opt(2025, 3, 27).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 4, 3).unwrap(),
            hitters: vec![TeamHitter {
                id: PlayerId(1),
                name: "Heliot Ramos".into(),
                position: "LF".into(),
                hits: 9,
                games: 7,
                at_bats: 27,
                avg: ".333".into(),
                hits_by_date: vec![
                    GameHits {
                        date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                        hits: 1,
                    },
                    GameHits {
                        date: NaiveDate::from_ymd_opt(2025, 4, 2).unwrap(),
                        hits: 3,
                    },
                ],
            }],
        };
        let text = team_hitters_report(&report, 1);
        assert!(text.contains("Heliot Ramos"));
        assert!(text.contains(".333"));
        assert!(text.contains("Heliot Ramos: 04/02 3"));
        assert!(!text.contains("04/01"));
    }
}
