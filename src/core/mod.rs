//! Core business logic.
//!
//! # Modules
//!
//! - [`extract`] - Cutoff windows and source queries
//! - [`transform`] - Document to row normalization
//! - [`export`] - Export orchestration and reporting
//!
//! # Export Workflow
//!
//! 1. **Connect**: Open the source connection
//! 2. **Full load**: Read documents created before the cutoff, transform,
//!    replace the output file
//! 3. **Incremental load**: Read documents created after the cutoff,
//!    transform, append to the output file
//! 4. **Release**: Close the connection, on every path
//! 5. **Report**: Generate the export summary
//!
//! # Example
//!
//! ```rust,no_run
//! use payorders_etl::config::load_config;
//! use payorders_etl::core::export::ExportCoordinator;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("payorders.toml")?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let coordinator = ExportCoordinator::new(&config, shutdown_rx);
//!
//! let summary = coordinator.execute_export().await?;
//!
//! println!("Full load rows: {}", summary.full_load.rows_written);
//! println!("Incremental rows: {}", summary.incremental_load.rows_written);
//! # Ok(())
//! # }
//! ```

pub mod export;
pub mod extract;
pub mod transform;
