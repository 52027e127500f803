//! Export coordinator - main orchestrator for the export process
//!
//! Runs the two loads over a single source connection:
//!
//! ```text
//! Idle -> Connected -> FullLoadDone -> IncrementalLoadDone -> Closed
//!   \________\______________\_______________\-> Failed -> Closed
//! ```
//!
//! The connection is released on every path that acquired it, and errors
//! are returned only after release.

use crate::adapters::sink::{CsvSink, WriteMode};
use crate::adapters::source::{create_source_connector, SourceConnection, SourceConnector};
use crate::config::EtlConfig;
use crate::core::export::summary::{ExportSummary, PhaseSummary};
use crate::core::extract::Extractor;
use crate::core::transform::transform_batch;
use crate::domain::{Cutoff, EtlError, Phase, Result};
use crate::{log_phase_complete, log_phase_start};
use bson::Document;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// State of an export run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Connected,
    FullLoadDone,
    IncrementalLoadDone,
    Closed,
    Failed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Connected => "connected",
            RunState::FullLoadDone => "full_load_done",
            RunState::IncrementalLoadDone => "incremental_load_done",
            RunState::Closed => "closed",
            RunState::Failed => "failed",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered record of the states a run passed through
#[derive(Debug)]
struct RunTracker {
    states: Vec<RunState>,
}

impl RunTracker {
    fn new() -> Self {
        Self {
            states: vec![RunState::Idle],
        }
    }

    fn current(&self) -> RunState {
        self.states.last().copied().unwrap_or(RunState::Idle)
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = %self.current(), to = %next, "State transition");
        self.states.push(next);
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    connector: Arc<dyn SourceConnector>,
    sink: CsvSink,
    cutoff: Cutoff,
    dry_run: bool,
    shutdown_signal: watch::Receiver<bool>,
}

impl ExportCoordinator {
    /// Create a coordinator reading from the configured MongoDB source
    ///
    /// No connection is opened until [`ExportCoordinator::execute_export`].
    pub fn new(config: &EtlConfig, shutdown_signal: watch::Receiver<bool>) -> Self {
        let connector = create_source_connector(&config.source);
        Self::with_connector(config, connector, shutdown_signal)
    }

    /// Create a coordinator over an arbitrary source
    pub fn with_connector(
        config: &EtlConfig,
        connector: Arc<dyn SourceConnector>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> Self {
        Self {
            connector,
            sink: CsvSink::new(config.export.output_path.clone()),
            cutoff: config.export.cutoff,
            dry_run: config.application.dry_run,
            shutdown_signal,
        }
    }

    /// Execute the export
    ///
    /// 1. Connects to the source
    /// 2. Full load: documents before the cutoff, written in create mode
    /// 3. Incremental load: documents after the cutoff, appended
    /// 4. Releases the connection
    ///
    /// An empty load skips its write. When both loads are empty the output
    /// file is not touched.
    ///
    /// # Write modes
    ///
    /// The full load always writes in [`WriteMode::Create`]. The incremental
    /// load writes in [`WriteMode::Append`], with one exception: if the full
    /// load wrote nothing in this run, the incremental batch is written in
    /// [`WriteMode::Create`] instead, so the file always starts with exactly
    /// one header and never carries rows from an earlier run.
    ///
    /// # Errors
    ///
    /// Returns the first failure annotated with its [`Phase`], or
    /// [`EtlError::Interrupted`] if a shutdown signal arrived between phases.
    pub async fn execute_export(&self) -> Result<ExportSummary> {
        let start_time = Instant::now();
        let mut tracker = RunTracker::new();
        let mut summary = ExportSummary::new(
            self.cutoff,
            self.sink.path().to_path_buf(),
            self.dry_run,
        );

        tracing::info!(
            source = %self.connector.describe(),
            cutoff = %self.cutoff,
            output = %self.sink.path().display(),
            dry_run = self.dry_run,
            "Starting export process"
        );

        if let Err(e) = self.check_shutdown(Phase::Connect) {
            tracker.advance(RunState::Failed);
            return Err(e);
        }

        log_phase_start!(Phase::Connect);
        let connection = match self.connector.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                tracker.advance(RunState::Failed);
                let err = e.in_phase(Phase::Connect);
                tracing::error!(error = %err, "Failed to connect to source");
                return Err(err);
            }
        };
        tracker.advance(RunState::Connected);

        let outcome = self
            .run_loads(connection.as_ref(), &mut summary, &mut tracker)
            .await;
        if outcome.is_err() {
            tracker.advance(RunState::Failed);
        }

        let released = connection
            .close()
            .await
            .map_err(|e| e.in_phase(Phase::Disconnect));

        match (outcome, released) {
            (Ok(()), Ok(())) => {
                tracker.advance(RunState::Closed);
            }
            (Ok(()), Err(close_err)) => {
                tracker.advance(RunState::Failed);
                tracing::error!(error = %close_err, "Failed to release source connection");
                return Err(close_err);
            }
            (Err(err), close_result) => {
                if let Err(close_err) = close_result {
                    tracing::warn!(error = %close_err, "Failed to release source connection");
                }
                tracker.advance(RunState::Closed);
                tracing::error!(
                    error = %err,
                    kind = %err.kind(),
                    states = ?tracker.states,
                    "Export failed"
                );
                return Err(err);
            }
        }

        summary.states = tracker.states;
        let summary = summary.with_duration(start_time.elapsed());
        summary.log_summary();

        Ok(summary)
    }

    async fn run_loads(
        &self,
        connection: &dyn SourceConnection,
        summary: &mut ExportSummary,
        tracker: &mut RunTracker,
    ) -> Result<()> {
        let extractor = Extractor::new(connection, self.cutoff);

        self.check_shutdown(Phase::FullLoad)?;
        log_phase_start!(Phase::FullLoad);
        let started = Instant::now();
        let documents = extractor
            .historical()
            .await
            .map_err(|e| e.in_phase(Phase::FullLoad))?;
        summary.full_load = self
            .load(Phase::FullLoad, &documents, WriteMode::Create, started)
            .map_err(|e| e.in_phase(Phase::FullLoad))?;
        tracker.advance(RunState::FullLoadDone);

        self.check_shutdown(Phase::IncrementalLoad)?;
        log_phase_start!(Phase::IncrementalLoad);
        let started = Instant::now();
        let documents = extractor
            .incremental()
            .await
            .map_err(|e| e.in_phase(Phase::IncrementalLoad))?;
        let mode = if summary.full_load.wrote() {
            WriteMode::Append
        } else {
            WriteMode::Create
        };
        summary.incremental_load = self
            .load(Phase::IncrementalLoad, &documents, mode, started)
            .map_err(|e| e.in_phase(Phase::IncrementalLoad))?;
        tracker.advance(RunState::IncrementalLoadDone);

        Ok(())
    }

    /// Transform and write one load
    fn load(
        &self,
        phase: Phase,
        documents: &[Document],
        mode: WriteMode,
        started: Instant,
    ) -> Result<PhaseSummary> {
        let mut phase_summary = PhaseSummary::new(phase);
        phase_summary.documents = documents.len();

        if documents.is_empty() {
            tracing::info!(phase = %phase, "No documents; skipping write");
        } else {
            let rows = transform_batch(documents)?;

            if self.dry_run {
                tracing::info!(
                    phase = %phase,
                    rows = rows.len(),
                    mode = %mode,
                    path = %self.sink.path().display(),
                    "Dry run: skipping write"
                );
            } else {
                phase_summary.rows_written = self.sink.write(&rows, mode)?;
                phase_summary.mode = Some(mode);
                tracing::info!(
                    phase = %phase,
                    rows = phase_summary.rows_written,
                    mode = %mode,
                    path = %self.sink.path().display(),
                    "Batch written"
                );
            }
        }

        phase_summary.duration = started.elapsed();
        log_phase_complete!(
            phase,
            phase_summary.documents,
            phase_summary.rows_written,
            phase_summary.duration
        );

        Ok(phase_summary)
    }

    /// Fails with [`EtlError::Interrupted`] once a shutdown was requested
    fn check_shutdown(&self, next: Phase) -> Result<()> {
        if *self.shutdown_signal.borrow() {
            tracing::warn!(phase = %next, "Shutdown requested; stopping before phase");
            return Err(EtlError::Interrupted(next));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryConnector;
    use crate::config::{secret_string, ApplicationConfig, ExportConfig, SourceConfig};
    use bson::doc;
    use chrono::{TimeZone, Utc};
    use std::path::Path;
    use tempfile::TempDir;

    fn config(output: &Path, dry_run: bool) -> EtlConfig {
        EtlConfig {
            application: ApplicationConfig {
                log_level: "info".to_string(),
                dry_run,
            },
            source: SourceConfig {
                uri: secret_string("mongodb://localhost:27017".to_string()),
                database: "payments".to_string(),
                collection: "payment_orders".to_string(),
                connect_timeout_seconds: 1,
                app_name: "payorders-etl-test".to_string(),
            },
            export: ExportConfig {
                cutoff: Cutoff::new(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
                output_path: output.to_path_buf(),
            },
        }
    }

    fn created(month: u32) -> bson::DateTime {
        bson::DateTime::from_chrono(Utc.with_ymd_and_hms(2024, month, 15, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_tracker_records_transitions() {
        let mut tracker = RunTracker::new();
        assert_eq!(tracker.current(), RunState::Idle);

        tracker.advance(RunState::Connected);
        tracker.advance(RunState::Failed);

        assert_eq!(tracker.current(), RunState::Failed);
        assert_eq!(
            tracker.states,
            vec![RunState::Idle, RunState::Connected, RunState::Failed]
        );
    }

    #[tokio::test]
    async fn test_happy_path_state_history() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("orders.csv");
        let connector = InMemoryConnector::new(vec![
            doc! { "createdAt": created(1), "trackingnumber": "A" },
            doc! { "createdAt": created(9), "trackingnumber": "B" },
        ]);
        let (_tx, rx) = watch::channel(false);

        let coordinator =
            ExportCoordinator::with_connector(&config(&output, false), Arc::new(connector.clone()), rx);
        let summary = coordinator.execute_export().await.unwrap();

        assert_eq!(
            summary.states,
            vec![
                RunState::Idle,
                RunState::Connected,
                RunState::FullLoadDone,
                RunState::IncrementalLoadDone,
                RunState::Closed,
            ]
        );
        assert_eq!(summary.full_load.mode, Some(WriteMode::Create));
        assert_eq!(summary.incremental_load.mode, Some(WriteMode::Append));
        assert_eq!(connector.closed_count(), 1);
    }

    #[tokio::test]
    async fn test_incremental_creates_file_when_full_load_is_empty() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("orders.csv");
        std::fs::write(&output, "stale\n").unwrap();
        let connector = InMemoryConnector::new(vec![
            doc! { "createdAt": created(9), "trackingnumber": "B" },
        ]);
        let (_tx, rx) = watch::channel(false);

        let coordinator =
            ExportCoordinator::with_connector(&config(&output, false), Arc::new(connector), rx);
        let summary = coordinator.execute_export().await.unwrap();

        assert_eq!(summary.full_load.mode, None);
        assert_eq!(summary.incremental_load.mode, Some(WriteMode::Create));

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("created_at,"));
        assert!(!text.contains("stale"));
        assert_eq!(text.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_transform_failure_releases_connection() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("orders.csv");
        let connector = InMemoryConnector::new(vec![
            doc! { "createdAt": created(1), "amountInCents": "lots" },
        ]);
        let (_tx, rx) = watch::channel(false);

        let coordinator =
            ExportCoordinator::with_connector(&config(&output, false), Arc::new(connector.clone()), rx);
        let err = coordinator.execute_export().await.unwrap_err();

        assert_eq!(err.phase(), Some(Phase::FullLoad));
        assert_eq!(err.kind(), crate::domain::ErrorKind::Transform);
        assert_eq!(connector.closed_count(), 1);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_shutdown_before_connect() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("orders.csv");
        let connector = InMemoryConnector::new(vec![doc! { "createdAt": created(1) }]);
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let coordinator =
            ExportCoordinator::with_connector(&config(&output, false), Arc::new(connector.clone()), rx);
        let err = coordinator.execute_export().await.unwrap_err();

        assert!(matches!(err, EtlError::Interrupted(Phase::Connect)));
        assert_eq!(err.exit_code(), 130);
        assert_eq!(connector.closed_count(), 0);
        assert!(!output.exists());
    }
}
