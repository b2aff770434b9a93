use chrono::NaiveDate;
use serde::Serialize;

use crate::modules::units::GeoPoint;

/// How an incoming name relates to what the store already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    Exact,
    NearDuplicate,
    Similar,
    None,
}

/// Outcome of the matching step. The similarity path only ever sees names
/// (the store serves the full record solely for exact matches), so the match
/// is identified by name here.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub match_type: MatchType,
    pub matched_name: Option<String>,
    pub score: f64,
}

/// A single field staged for backfill. Only fields the persisted record is
/// missing ever become staged fields.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedField {
    FormationSite(String),
    FormationDate(NaiveDate),
    Location(GeoPoint),
    Description(String),
    WikipediaUrl(String),
}

impl StagedField {
    pub fn column(&self) -> &'static str {
        match self {
            StagedField::FormationSite(_) => "formation_site",
            StagedField::FormationDate(_) => "formation_date",
            StagedField::Location(_) => "location",
            StagedField::Description(_) => "description",
            StagedField::WikipediaUrl(_) => "wikipedia_url",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// Exact match with nothing left to backfill.
    CompleteData,
    /// Best similarity score above the near-duplicate threshold.
    NearDuplicate { of: String, score: f64 },
    /// Operator answered the confirmation prompt with anything but yes.
    Declined { candidate: String },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::CompleteData => write!(f, "already exists with complete data"),
            SkipReason::NearDuplicate { of, score } => {
                write!(f, "near-duplicate of \"{}\" (score {:.3})", of, score)
            }
            SkipReason::Declined { candidate } => {
                write!(f, "not confirmed against similar \"{}\"", candidate)
            }
        }
    }
}

/// The fate of one incoming record, as decided by the reconciler.
/// Pure data; applying it is a separate step.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// New record; the id is assigned at apply time from the store's max.
    Insert,
    /// Fill the listed empty fields of the matched record.
    Backfill { id: i32, fields: Vec<StagedField> },
    Skip { reason: SkipReason },
    /// Ambiguous similarity; a human decides between insert and skip.
    Prompt { candidate: String, score: f64 },
}

/// What actually happened to a record once its decision was applied.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Inserted { id: i32 },
    Updated { id: i32, columns: Vec<&'static str> },
    Skipped { reason: SkipReason },
    Rejected { reason: String },
    Failed { reason: String },
}

/// Per-batch accounting, reported to the operator at the end of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub total: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub rejected: usize,
    pub failed: Vec<FailedRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedRecord {
    pub name: String,
    pub reason: String,
}

impl ImportSummary {
    pub fn record(&mut self, name: &str, outcome: &RecordOutcome) {
        self.total += 1;
        match outcome {
            RecordOutcome::Inserted { .. } => self.inserted += 1,
            RecordOutcome::Updated { .. } => self.updated += 1,
            RecordOutcome::Skipped { .. } => self.skipped += 1,
            RecordOutcome::Rejected { .. } => self.rejected += 1,
            RecordOutcome::Failed { reason } => self.failed.push(FailedRecord {
                name: name.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}
