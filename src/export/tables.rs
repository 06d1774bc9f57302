//! Row layouts for the CSV exports.

use std::io::{self, Write};

use super::csv::CsvWriter;
use crate::dedup::Removal;
use crate::oracle::ScoreResult;
use crate::record::CandidateRecord;
use crate::review::HumanDecision;
use crate::screening::ScreeningDecision;

/// Separator for multi-valued cells.
pub const LIST_SEPARATOR: &str = " | ";

/// Same columns the candidate loader reads, so the file can be loaded again.
pub const RECORD_COLUMNS: [&str; 7] = ["title", "abstract", "authors", "year", "doi", "arxiv_id", "source"];

pub const REMOVAL_COLUMNS: [&str; 8] = [
    "title",
    "doi",
    "arxiv_id",
    "source",
    "reason",
    "detail",
    "kept_record_key",
    "kept_title",
];

pub const DECISION_COLUMNS: [&str; 22] = [
    "record_key",
    "title",
    "abstract",
    "authors",
    "year",
    "doi",
    "arxiv_id",
    "source",
    "domain",
    "intervention",
    "method",
    "outcome",
    "exclusion",
    "title_bonus",
    "total_score",
    "zone",
    "evidence_verified",
    "downgraded",
    "reasoning",
    "evidence_quotes",
    "unverified_quotes",
    "error",
];

pub const HUMAN_DECISION_COLUMNS: [&str; 9] = [
    "record_key",
    "title",
    "human_decision",
    "reasoning",
    "confidence",
    "reviewed_at",
    "ai_zone",
    "ai_total_score",
    "agreement",
];

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn record_fields(record: &CandidateRecord) -> [String; 7] {
    [
        record.title.clone(),
        record.abstract_str().to_string(),
        opt(&record.authors).to_string(),
        record.year.map(|y| y.to_string()).unwrap_or_default(),
        opt(&record.doi).to_string(),
        opt(&record.arxiv_id).to_string(),
        opt(&record.source).to_string(),
    ]
}

pub fn write_records<W: Write>(out: W, records: &[CandidateRecord]) -> io::Result<()> {
    let mut csv = CsvWriter::new(out);
    csv.write_row(&RECORD_COLUMNS)?;
    for record in records {
        csv.write_row(&record_fields(record))?;
    }
    csv.flush()
}

pub fn write_removals<W: Write>(out: W, removals: &[Removal]) -> io::Result<()> {
    let mut csv = CsvWriter::new(out);
    csv.write_row(&REMOVAL_COLUMNS)?;
    for removal in removals {
        let record = &removal.record;
        csv.write_row(&[
            record.title.as_str(),
            opt(&record.doi),
            opt(&record.arxiv_id),
            opt(&record.source),
            removal.reason.label(),
            removal.reason.detail().as_str(),
            removal.absorbed_by.as_str(),
            removal.absorbed_by_title.as_str(),
        ])?;
    }
    csv.flush()
}

fn score_fields(score: Option<&ScoreResult>) -> [String; 7] {
    match score {
        Some(score) => {
            let s = &score.scores;
            [
                s.domain.to_string(),
                s.intervention.to_string(),
                s.method.to_string(),
                s.outcome.to_string(),
                s.exclusion.to_string(),
                s.title_bonus.to_string(),
                s.total().to_string(),
            ]
        }
        None => Default::default(),
    }
}

pub fn write_decisions<'a, W, I>(out: W, decisions: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a ScreeningDecision>,
{
    let mut csv = CsvWriter::new(out);
    csv.write_row(&DECISION_COLUMNS)?;
    for decision in decisions {
        let record = &decision.record;
        let mut row: Vec<String> = Vec::with_capacity(DECISION_COLUMNS.len());
        row.push(decision.key.to_string());
        row.extend(record_fields(record));
        row.extend(score_fields(decision.score.as_ref()));
        row.push(decision.zone.to_string());
        row.push(decision.evidence_verified().to_string());
        row.push(decision.downgraded.to_string());
        row.push(decision.score.as_ref().map(|s| s.reasoning.clone()).unwrap_or_default());
        let (quotes, unverified) = match &decision.score {
            Some(s) => (
                s.evidence_quotes.join(LIST_SEPARATOR),
                s.unverified_quotes.join(LIST_SEPARATOR),
            ),
            None => Default::default(),
        };
        row.push(quotes);
        row.push(unverified);
        row.push(decision.error.clone().unwrap_or_default());
        csv.write_row(&row)?;
    }
    csv.flush()
}

pub fn write_human_decisions<W: Write>(out: W, decisions: &[HumanDecision]) -> io::Result<()> {
    let mut csv = CsvWriter::new(out);
    csv.write_row(&HUMAN_DECISION_COLUMNS)?;
    for decision in decisions {
        csv.write_row(&[
            decision.key.to_string(),
            decision.title.clone(),
            decision.label.to_string(),
            decision.reasoning.clone(),
            decision.confidence.as_str().to_string(),
            decision.reviewed_at.to_rfc3339(),
            decision.ai_zone.to_string(),
            decision.ai_total.map(|t| t.to_string()).unwrap_or_default(),
            decision.agrees_with_ai().to_string(),
        ])?;
    }
    csv.flush()
}
