//! Output directory layout and writers for run artifacts.
//!
//! Every stage writes into one directory: CSV tables for people and
//! spreadsheets, JSON for machines, and the two progress logs that make
//! screening and review resumable.

pub mod csv;
pub mod error;
pub mod tables;

#[cfg(test)]
mod tests;

pub use error::{ExportError, ExportResult};

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::dedup::DedupOutcome;
use crate::review::HumanDecision;
use crate::screening::{ScreeningDecision, Zone};
use crate::validation::AgreementReport;

pub const DEDUPLICATED_CSV: &str = "deduplicated.csv";
pub const DEDUP_REMOVED_CSV: &str = "dedup_removed.csv";
pub const DEDUP_REPORT_JSON: &str = "dedup_report.json";
pub const AUTO_INCLUDED_CSV: &str = "auto_included.csv";
pub const AUTO_EXCLUDED_CSV: &str = "auto_excluded.csv";
pub const HUMAN_REVIEW_QUEUE_CSV: &str = "human_review_queue.csv";
pub const ERRORS_CSV: &str = "errors.csv";
pub const ALL_SCREENED_CSV: &str = "all_screened_papers.csv";
pub const HUMAN_DECISIONS_CSV: &str = "human_review_decisions.csv";
pub const VALIDATION_SAMPLE_CSV: &str = "validation_sample.csv";
pub const KAPPA_REPORT_MD: &str = "kappa_report.md";
pub const KAPPA_REPORT_JSON: &str = "kappa_report.json";
pub const SCREENING_PROGRESS_LOG: &str = "screening_progress.jsonl";
pub const REVIEW_PROGRESS_LOG: &str = "review_progress.jsonl";

/// CSV file for each zone's partition.
pub fn zone_file(zone: Zone) -> &'static str {
    match zone {
        Zone::AutoInclude => AUTO_INCLUDED_CSV,
        Zone::AutoExclude => AUTO_EXCLUDED_CSV,
        Zone::HumanReview => HUMAN_REVIEW_QUEUE_CSV,
        Zone::Error => ERRORS_CSV,
    }
}

/// A run's output directory.
#[derive(Debug, Clone)]
pub struct OutputDir {
    root: PathBuf,
}

impl OutputDir {
    /// Creates the directory if needed.
    pub fn create(root: impl Into<PathBuf>) -> ExportResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| ExportError::Io {
            path: root.clone(),
            source,
        })?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    pub fn screening_log(&self) -> PathBuf {
        self.path(SCREENING_PROGRESS_LOG)
    }

    pub fn review_log(&self) -> PathBuf {
        self.path(REVIEW_PROGRESS_LOG)
    }

    /// `deduplicated.csv`, `dedup_removed.csv` and `dedup_report.json`.
    pub fn write_dedup(&self, outcome: &DedupOutcome) -> ExportResult<()> {
        self.write_csv(DEDUPLICATED_CSV, |w| tables::write_records(w, &outcome.unique))?;
        self.write_csv(DEDUP_REMOVED_CSV, |w| tables::write_removals(w, &outcome.removed))?;
        self.write_json(DEDUP_REPORT_JSON, &outcome.report)?;
        info!(
            dir = %self.root.display(),
            unique = outcome.unique.len(),
            removed = outcome.removed.len(),
            "Wrote deduplication outputs"
        );
        Ok(())
    }

    /// One file per zone (written even when empty) plus the combined audit
    /// file.
    pub fn write_screening(&self, decisions: &[ScreeningDecision]) -> ExportResult<()> {
        for zone in Zone::ALL {
            self.write_csv(zone_file(zone), |w| {
                tables::write_decisions(w, decisions.iter().filter(|d| d.zone == zone))
            })?;
        }
        self.write_csv(ALL_SCREENED_CSV, |w| tables::write_decisions(w, decisions))?;
        info!(dir = %self.root.display(), records = decisions.len(), "Wrote screening outputs");
        Ok(())
    }

    pub fn write_validation_sample(&self, sample: &[ScreeningDecision]) -> ExportResult<()> {
        self.write_csv(VALIDATION_SAMPLE_CSV, |w| tables::write_decisions(w, sample))
    }

    pub fn write_human_decisions(&self, decisions: &[HumanDecision]) -> ExportResult<()> {
        self.write_csv(HUMAN_DECISIONS_CSV, |w| tables::write_human_decisions(w, decisions))
    }

    /// `kappa_report.md` and `kappa_report.json`.
    pub fn write_agreement(&self, report: &AgreementReport) -> ExportResult<()> {
        let md_path = self.path(KAPPA_REPORT_MD);
        fs::write(&md_path, report.to_markdown()).map_err(|source| ExportError::Io {
            path: md_path,
            source,
        })?;
        self.write_json(KAPPA_REPORT_JSON, report)
    }

    fn write_csv<F>(&self, name: &str, write: F) -> ExportResult<()>
    where
        F: FnOnce(BufWriter<File>) -> std::io::Result<()>,
    {
        let path = self.path(name);
        File::create(&path)
            .and_then(|file| write(BufWriter::new(file)))
            .map_err(|source| ExportError::Io { path, source })
    }

    fn write_json<T: Serialize>(&self, name: &str, value: &T) -> ExportResult<()> {
        let path = self.path(name);
        let text = serde_json::to_string_pretty(value).map_err(|source| ExportError::Json {
            path: path.clone(),
            source,
        })?;
        fs::write(&path, text).map_err(|source| ExportError::Io { path, source })
    }
}
