// Leaderboard ranking.
//
// Order, best first:
// 1. finite deviations, ascending by magnitude
// 2. unbounded deviations, ascending by predicted-to-date
// 3. records without a usable deviation, in input order
//
// Ties within 1 and 2 break on student then player name.

use serde::Serialize;
use std::cmp::Ordering;

use crate::accuracy::{Deviation, PredictionRecord};

pub const PLACE_LABELS: [&str; 3] = ["1st Place", "2nd Place", "3rd Place"];
pub const FURTHEST_LABEL: &str = "Furthest Prediction";

// ---------------------------------------------------------------------------
// Sort key
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
enum RankKey {
    Finite(f64),
    Unbounded(f64),
    Missing,
}

impl RankKey {
    fn of(record: &PredictionRecord) -> Self {
        match record.deviation {
            Deviation::Finite(p) if p.is_finite() => RankKey::Finite(p.abs()),
            Deviation::Finite(_) => RankKey::Missing,
            Deviation::Unbounded => RankKey::Unbounded(record.predicted_hits_to_date),
        }
    }

    fn tier(&self) -> u8 {
        match self {
            RankKey::Finite(_) => 0,
            RankKey::Unbounded(_) => 1,
            RankKey::Missing => 2,
        }
    }
}

fn compare(a: &PredictionRecord, b: &PredictionRecord) -> Ordering {
    let (ka, kb) = (RankKey::of(a), RankKey::of(b));
    match (ka, kb) {
        (RankKey::Finite(x), RankKey::Finite(y))
        | (RankKey::Unbounded(x), RankKey::Unbounded(y)) => x
            .total_cmp(&y)
            .then_with(|| a.student.cmp(&b.student))
            .then_with(|| a.player.cmp(&b.player)),
        (RankKey::Missing, RankKey::Missing) => Ordering::Equal,
        _ => ka.tier().cmp(&kb.tier()),
    }
}

/// Sort records from most to least accurate. Stable.
pub fn rank(mut records: Vec<PredictionRecord>) -> Vec<PredictionRecord> {
    records.sort_by(compare);
    records
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// Records in rank order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Leaderboard {
    entries: Vec<PredictionRecord>,
}

/// A leaderboard record shown as a highlight card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Highlight<'a> {
    pub label: &'static str,
    pub record: &'a PredictionRecord,
}

impl Leaderboard {
    pub fn from_records(records: Vec<PredictionRecord>) -> Self {
        Leaderboard {
            entries: rank(records),
        }
    }

    pub fn entries(&self) -> &[PredictionRecord] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<PredictionRecord> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The `n` most accurate records.
    pub fn top(&self, n: usize) -> &[PredictionRecord] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// The single least accurate record.
    pub fn worst(&self) -> Option<&PredictionRecord> {
        self.entries.last()
    }

    /// Up to three places plus the furthest prediction.
    ///
    /// The furthest card is only added when it is not already one of the
    /// places shown.
    pub fn highlights(&self) -> Vec<Highlight<'_>> {
        let mut cards: Vec<Highlight<'_>> = PLACE_LABELS
            .iter()
            .zip(self.entries.iter())
            .map(|(label, record)| Highlight { label: *label, record })
            .collect();
        if self.entries.len() > PLACE_LABELS.len() {
            if let Some(record) = self.worst() {
                cards.push(Highlight {
                    label: FURTHEST_LABEL,
                    record,
                });
            }
        }
        cards
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
