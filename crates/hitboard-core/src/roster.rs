// Prediction roster loading.
//
// The roster is a CSV with a `student,baseball_player,predicted_hits` header.
// Columns are matched by header name, so column order does not matter.

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;
use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A student's season hit prediction.
///
/// The predicted total is kept as read: `None` means the field could not be
/// parsed as a non-negative whole number and counts as zero in arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub student: String,
    pub player: String,
    pub predicted_hits: Option<u32>,
}

impl RosterEntry {
    pub fn new(student: impl Into<String>, player: impl Into<String>, predicted_hits: u32) -> Self {
        RosterEntry {
            student: student.into(),
            player: player.into(),
            predicted_hits: Some(predicted_hits),
        }
    }

    /// Predicted season hits for arithmetic purposes.
    pub fn predicted_hits_or_zero(&self) -> u32 {
        self.predicted_hits.unwrap_or(0)
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in roster: {0}")]
    Csv(#[from] csv::Error),

    #[error("roster header is missing required column `{0}`")]
    MissingColumn(&'static str),
}

// ---------------------------------------------------------------------------
// Raw CSV row
// ---------------------------------------------------------------------------

const REQUIRED_COLUMNS: [&str; 3] = ["student", "baseball_player", "predicted_hits"];

#[derive(Debug, Deserialize)]
struct RawRosterRow {
    student: String,
    baseball_player: String,
    predicted_hits: String,
}

/// Parse a predicted-hits cell the way a lenient base-10 integer parse
/// would: the leading digits are kept ("150.7" -> 150, "1e3" -> 1,
/// "150abc" -> 150). No leading digit, or a negative value, is rejected.
fn parse_predicted_hits(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    if end == 0 {
        return None;
    }
    unsigned[..end].parse::<u32>().ok()
}

// ---------------------------------------------------------------------------
// Loaders
// ---------------------------------------------------------------------------

/// Parse roster records from any reader, in file order.
pub fn parse_roster_from_reader<R: Read>(rdr: R) -> Result<Vec<RosterEntry>, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(rdr);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(RosterError::MissingColumn(column));
        }
    }

    let mut entries = Vec::new();
    for (line, result) in reader.deserialize::<RawRosterRow>().enumerate() {
        match result {
            Ok(raw) => {
                let student = raw.student.trim().to_string();
                let player = raw.baseball_player.trim().to_string();
                let predicted_hits = parse_predicted_hits(&raw.predicted_hits);
                if predicted_hits.is_none() {
                    warn!(
                        "predicted hits '{}' for {} / {} is not a whole number; counting as 0",
                        raw.predicted_hits.trim(),
                        student,
                        player
                    );
                }
                entries.push(RosterEntry {
                    student,
                    player,
                    predicted_hits,
                });
            }
            Err(e) => {
                // `line` counts data rows; +2 accounts for the header and 1-based lines.
                warn!("skipping malformed roster row {}: {}", line + 2, e);
            }
        }
    }
    Ok(entries)
}

/// Parse roster records from in-memory text.
pub fn parse_roster(raw_text: &str) -> Result<Vec<RosterEntry>, RosterError> {
    parse_roster_from_reader(raw_text.as_bytes())
}

/// Load roster records from a CSV file.
pub fn load_roster(path: &Path) -> Result<Vec<RosterEntry>, RosterError> {
    let file = std::fs::File::open(path).map_err(|e| RosterError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_roster_from_reader(file)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_in_file_order() {
        let csv_data = "\
student,baseball_player,predicted_hits
Ana Lopez,Aaron Judge,180
Ben Ito,Shohei Ohtani,175";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0], RosterEntry::new("Ana Lopez", "Aaron Judge", 180));
        assert_eq!(roster[1], RosterEntry::new("Ben Ito", "Shohei Ohtani", 175));
    }

    #[test]
    fn blank_lines_skipped() {
        let csv_data = "\
student,baseball_player,predicted_hits

Ana Lopez,Aaron Judge,180

Ben Ito,Shohei Ohtani,175
";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster.len(), 2);
    }

    #[test]
    fn crlf_line_endings() {
        let csv_data = "student,baseball_player,predicted_hits\r\nAna Lopez,Aaron Judge,180\r\n";
        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster[0].predicted_hits, Some(180));
    }

    #[test]
    fn columns_matched_by_header() {
        let csv_data = "\
predicted_hits,student,baseball_player
160,Ana Lopez,Aaron Judge";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster[0], RosterEntry::new("Ana Lopez", "Aaron Judge", 160));
    }

    #[test]
    fn missing_column_is_error() {
        let csv_data = "\
student,player,predicted_hits
Ana Lopez,Aaron Judge,180";

        match parse_roster(csv_data).unwrap_err() {
            RosterError::MissingColumn(col) => assert_eq!(col, "baseball_player"),
            other => panic!("expected MissingColumn, got: {other}"),
        }
    }

    #[test]
    fn malformed_predicted_hits_kept_as_unparsed() {
        let csv_data = "\
student,baseball_player,predicted_hits
Ana Lopez,Aaron Judge,lots
Ben Ito,Shohei Ohtani,-5
Cy Park,Juan Soto,
Di Ng,Matt Chapman,+";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster.len(), 4);
        assert_eq!(roster[0].predicted_hits, None);
        assert_eq!(roster[0].predicted_hits_or_zero(), 0);
        assert_eq!(roster[1].predicted_hits, None);
        assert_eq!(roster[2].predicted_hits, None);
        assert_eq!(roster[3].predicted_hits, None);
    }

    #[test]
    fn fractional_predicted_hits_truncated() {
        let csv_data = "\
student,baseball_player,predicted_hits
Ana Lopez,Aaron Judge,150.7
Ben Ito,Shohei Ohtani,1e3
Cy Park,Juan Soto,150abc
Di Ng,Matt Chapman,0x10
Ed Fox,Heliot Ramos, +120 ";

        let roster = parse_roster(csv_data).unwrap();
        let hits: Vec<_> = roster.iter().map(|e| e.predicted_hits).collect();
        assert_eq!(hits, vec![Some(150), Some(1), Some(150), Some(0), Some(120)]);
    }

    #[test]
    fn short_rows_skipped() {
        let csv_data = "\
student,baseball_player,predicted_hits
Ana Lopez,Aaron Judge
Ben Ito,Shohei Ohtani,175";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].student, "Ben Ito");
    }

    #[test]
    fn names_trimmed_but_not_normalized() {
        let csv_data = "\
student,baseball_player,predicted_hits
  Ana Lopez  ,  aaron JUDGE , 180 ";

        let roster = parse_roster(csv_data).unwrap();
        assert_eq!(roster[0].student, "Ana Lopez");
        assert_eq!(roster[0].player, "aaron JUDGE");
        assert_eq!(roster[0].predicted_hits, Some(180));
    }

    #[test]
    fn header_only_returns_empty_vec() {
        let roster = parse_roster("student,baseball_player,predicted_hits").unwrap();
        assert!(roster.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_roster(Path::new("/nonexistent/predictions.csv")).unwrap_err();
        assert!(matches!(err, RosterError::Io { .. }));
    }
}
