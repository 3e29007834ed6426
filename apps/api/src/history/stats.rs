//! Dashboard aggregates, recomputed from the full collection on every read.

use serde::Serialize;

use crate::models::history::{EntryId, HistoryEntry, Status};

/// JD match shown for analyzed entries with no recorded (or a zero) match.
pub const DEFAULT_JD_MATCH: u32 = 85;

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    pub uploaded: usize,
    pub analyzed: usize,
    pub shortlisted: usize,
    pub rejected: usize,
}

pub fn status_counts(entries: &[HistoryEntry]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for entry in entries {
        let slot = match entry.status {
            Status::Uploaded => &mut counts.uploaded,
            Status::Analyzed => &mut counts.analyzed,
            Status::Shortlisted => &mut counts.shortlisted,
            Status::Rejected => &mut counts.rejected,
        };
        *slot += 1;
    }
    counts
}

/// Entries awaiting an HR decision, in collection order.
pub fn pending_review(entries: &[HistoryEntry]) -> Vec<&HistoryEntry> {
    entries
        .iter()
        .filter(|e| e.status == Status::Analyzed)
        .collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewRow {
    pub id: EntryId,
    pub filename: String,
    pub role: Option<String>,
    pub score: Option<u32>,
    pub jd_match: u32,
}

impl From<&HistoryEntry> for ReviewRow {
    fn from(e: &HistoryEntry) -> Self {
        Self {
            id: e.id,
            filename: e.filename.clone(),
            role: e.role.clone(),
            score: e.score,
            jd_match: e
                .jd_match
                .filter(|m| *m != 0)
                .unwrap_or(DEFAULT_JD_MATCH),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub counts: StatusCounts,
    pub to_review: Vec<ReviewRow>,
}

pub fn build_dashboard(entries: &[HistoryEntry]) -> Dashboard {
    Dashboard {
        counts: status_counts(entries),
        to_review: pending_review(entries)
            .into_iter()
            .map(ReviewRow::from)
            .collect(),
    }
}
