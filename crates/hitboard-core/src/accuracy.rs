// Prediction accuracy: prorate a season prediction to date and measure how
// far it is from the player's actual hits.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::roster::RosterEntry;
use crate::season::SeasonProgress;

// ---------------------------------------------------------------------------
// Deviation
// ---------------------------------------------------------------------------

/// Relative error of a prediction, in percent of actual hits.
///
/// `Unbounded` is the zero-actual-hits case with a positive prediction. It is
/// its own variant so it can never be mistaken for a large percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "percent", rename_all = "snake_case")]
pub enum Deviation {
    Finite(f64),
    Unbounded,
}

impl Deviation {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Deviation::Unbounded)
    }

    /// The percentage, if finite.
    pub fn percent(&self) -> Option<f64> {
        match self {
            Deviation::Finite(p) => Some(*p),
            Deviation::Unbounded => None,
        }
    }
}

impl fmt::Display for Deviation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deviation::Finite(p) => write!(f, "{p:.2}%"),
            Deviation::Unbounded => write!(f, "∞"),
        }
    }
}

// ---------------------------------------------------------------------------
// PredictionRecord
// ---------------------------------------------------------------------------

/// One roster row joined with live stats for a single leaderboard load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// 1-based position in the roster for this load only.
    pub id: u32,
    pub student: String,
    pub player: String,
    /// `None` when the roster value was not a whole number.
    pub predicted_hits: Option<u32>,
    pub predicted_hits_to_date: f64,
    pub actual_hits: u32,
    /// Predicted-to-date minus actual hits.
    pub hits_delta: f64,
    pub deviation: Deviation,
}

// ---------------------------------------------------------------------------
// Arithmetic
// ---------------------------------------------------------------------------

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// `round1(predicted * fraction)`, with the fraction clamped to `[0, 1]`.
pub fn predicted_to_date(predicted_hits: u32, fraction: f64) -> f64 {
    let fraction = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    if fraction == 0.0 {
        return 0.0;
    }
    round1(f64::from(predicted_hits) * fraction)
}

pub fn deviation(predicted_to_date: f64, actual_hits: u32) -> Deviation {
    if actual_hits == 0 {
        return if predicted_to_date > 0.0 {
            Deviation::Unbounded
        } else {
            Deviation::Finite(0.0)
        };
    }
    let actual = f64::from(actual_hits);
    Deviation::Finite(round2((predicted_to_date - actual).abs() / actual * 100.0))
}

/// Build the record for roster row `id` (1-based). Pure.
pub fn compute_record(
    id: u32,
    entry: &RosterEntry,
    actual_hits: u32,
    progress: &SeasonProgress,
) -> PredictionRecord {
    let to_date = predicted_to_date(entry.predicted_hits_or_zero(), progress.fraction);
    PredictionRecord {
        id,
        student: entry.student.clone(),
        player: entry.player.clone(),
        predicted_hits: entry.predicted_hits,
        predicted_hits_to_date: to_date,
        actual_hits,
        hits_delta: round1(to_date - f64::from(actual_hits)),
        deviation: deviation(to_date, actual_hits),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::season::ProgressSource;

    fn progress(fraction: f64) -> SeasonProgress {
        SeasonProgress {
            fraction,
            source: ProgressSource::Games,
            games_completed: None,
            total_games: None,
            next_game: None,
        }
    }

    #[test]
    fn half_season_scenario() {
        let entry = RosterEntry::new("Ana", "X", 100);
        let record = compute_record(1, &entry, 40, &progress(0.5));
        assert_eq!(record.predicted_hits_to_date, 50.0);
        assert_eq!(record.deviation, Deviation::Finite(25.0));
        assert_eq!(record.hits_delta, 10.0);
        assert_eq!(record.deviation.to_string(), "25.00%");
    }

    #[test]
    fn zero_actual_with_positive_prediction_is_unbounded() {
        let entry = RosterEntry::new("Ana", "X", 100);
        let record = compute_record(1, &entry, 0, &progress(0.5));
        assert_eq!(record.deviation, Deviation::Unbounded);
        assert_eq!(record.deviation.to_string(), "∞");
        assert_eq!(record.deviation.percent(), None);
    }

    #[test]
    fn zero_prediction_zero_actual_is_perfect() {
        let entry = RosterEntry::new("Ana", "X", 0);
        let record = compute_record(1, &entry, 0, &progress(0.5));
        assert_eq!(record.predicted_hits_to_date, 0.0);
        assert_eq!(record.deviation, Deviation::Finite(0.0));
    }

    #[test]
    fn zero_fraction_gives_zero_to_date() {
        let entry = RosterEntry::new("Ana", "X", 180);
        let record = compute_record(1, &entry, 0, &progress(0.0));
        assert_eq!(record.predicted_hits_to_date, 0.0);
        assert_eq!(record.deviation, Deviation::Finite(0.0));
    }

    #[test]
    fn unparsed_prediction_counts_as_zero() {
        let entry = RosterEntry {
            student: "Ana".into(),
            player: "X".into(),
            predicted_hits: None,
        };
        let record = compute_record(3, &entry, 20, &progress(0.5));
        assert_eq!(record.id, 3);
        assert_eq!(record.predicted_hits, None);
        assert_eq!(record.predicted_hits_to_date, 0.0);
        assert_eq!(record.deviation, Deviation::Finite(100.0));
    }

    #[test]
    fn to_date_rounded_to_one_decimal() {
        // 175 * 0.1613 = 28.2275
        assert_eq!(predicted_to_date(175, 0.1613), 28.2);
        // 30/186 of 150 = 24.19...
        assert_eq!(predicted_to_date(150, 30.0 / 186.0), 24.2);
    }

    #[test]
    fn deviation_rounded_to_two_decimals() {
        // |28.2 - 33| / 33 * 100 = 14.5454...
        assert_eq!(deviation(28.2, 33), Deviation::Finite(14.55));
    }

    #[test]
    fn over_and_under_prediction_use_magnitude() {
        assert_eq!(deviation(30.0, 40), Deviation::Finite(25.0));
        assert_eq!(deviation(50.0, 40), Deviation::Finite(25.0));
    }

    #[test]
    fn to_date_bounded_by_prediction() {
        for p in [0u32, 1, 7, 99, 162, 250] {
            for step in 0..=100 {
                let f = f64::from(step) / 100.0;
                let v = predicted_to_date(p, f);
                assert!(v >= 0.0, "p={p} f={f} v={v}");
                assert!(v <= f64::from(p), "p={p} f={f} v={v}");
                assert_eq!(v, round1(f64::from(p) * f));
            }
        }
    }

    #[test]
    fn out_of_range_fraction_clamped() {
        assert_eq!(predicted_to_date(100, 1.5), 100.0);
        assert_eq!(predicted_to_date(100, -0.2), 0.0);
        assert_eq!(predicted_to_date(100, f64::NAN), 0.0);
    }

    #[test]
    fn compute_record_is_deterministic() {
        let entry = RosterEntry::new("Ana", "X", 163);
        let p = progress(0.37);
        assert_eq!(
            compute_record(1, &entry, 51, &p),
            compute_record(1, &entry, 51, &p)
        );
    }

    #[test]
    fn deviation_serializes_as_tagged_variant() {
        let finite = serde_json::to_value(Deviation::Finite(25.0)).unwrap();
        assert_eq!(finite, serde_json::json!({"kind": "finite", "percent": 25.0}));

        let unbounded = serde_json::to_value(Deviation::Unbounded).unwrap();
        assert_eq!(unbounded, serde_json::json!({"kind": "unbounded"}));
    }
}
