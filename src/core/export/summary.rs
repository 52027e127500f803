//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::adapters::sink::WriteMode;
use crate::core::export::coordinator::RunState;
use crate::domain::{Cutoff, Phase};
use std::path::PathBuf;
use std::time::Duration;

/// Outcome of one load phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseSummary {
    /// Which load this describes
    pub phase: Phase,

    /// Documents returned by the source
    pub documents: usize,

    /// Rows written to the output file
    pub rows_written: usize,

    /// How the batch was written; `None` when the write was skipped
    pub mode: Option<WriteMode>,

    /// Time spent extracting, transforming and writing
    pub duration: Duration,
}

impl PhaseSummary {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            documents: 0,
            rows_written: 0,
            mode: None,
            duration: Duration::ZERO,
        }
    }

    /// Whether the output file was touched in this phase
    pub fn wrote(&self) -> bool {
        self.mode.is_some()
    }

    /// Human-readable write outcome
    pub fn outcome(&self) -> String {
        match self.mode {
            Some(mode) => format!("{} rows ({})", self.rows_written, mode),
            None if self.documents > 0 => format!("{} rows (dry run)", self.documents),
            None => "skipped (no documents)".to_string(),
        }
    }
}

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Cutoff splitting the two loads
    pub cutoff: Cutoff,

    /// Output file
    pub output_path: PathBuf,

    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Historical load
    pub full_load: PhaseSummary,

    /// Incremental load
    pub incremental_load: PhaseSummary,

    /// States the run went through, in order
    pub states: Vec<RunState>,

    /// Duration of the export
    pub duration: Duration,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(cutoff: Cutoff, output_path: PathBuf, dry_run: bool) -> Self {
        Self {
            cutoff,
            output_path,
            dry_run,
            full_load: PhaseSummary::new(Phase::FullLoad),
            incremental_load: PhaseSummary::new(Phase::IncrementalLoad),
            states: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Documents read across both loads
    pub fn total_documents(&self) -> usize {
        self.full_load.documents + self.incremental_load.documents
    }

    /// Rows written across both loads
    pub fn total_rows_written(&self) -> usize {
        self.full_load.rows_written + self.incremental_load.rows_written
    }

    /// Whether the run found nothing on either side of the cutoff
    pub fn is_empty(&self) -> bool {
        self.total_documents() == 0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            cutoff = %self.cutoff,
            output = %self.output_path.display(),
            dry_run = self.dry_run,
            full_load_documents = self.full_load.documents,
            full_load_rows = self.full_load.rows_written,
            incremental_documents = self.incremental_load.documents,
            incremental_rows = self.incremental_load.rows_written,
            duration_ms = self.duration.as_millis() as u64,
            "Export completed"
        );

        if self.is_empty() {
            tracing::info!("No documents on either side of the cutoff; output left untouched");
        }
    }
}
