//! Export orchestration
//!
//! This module provides the core export logic:
//! - Export coordination and the run state machine
//! - Summary and reporting

pub mod coordinator;
pub mod summary;

pub use coordinator::{ExportCoordinator, RunState};
pub use summary::{ExportSummary, PhaseSummary};
