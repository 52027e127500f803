// payorders-etl - MongoDB payment orders to CSV ETL Tool
// Copyright (c) 2025 payorders-etl Contributors
// Licensed under the MIT License

//! # payorders-etl - MongoDB payment orders to CSV
//!
//! payorders-etl exports the `payment_orders` collection of a MongoDB
//! database to a flat CSV file in two loads split by a cutoff timestamp.
//!
//! ## Overview
//!
//! - **Extracting** documents created before and after the cutoff
//! - **Transforming** them into fixed-column rows (renamed fields, floored
//!   integers, `unknown` for missing payment links)
//! - **Loading** the historical rows into a fresh file and appending the
//!   incremental rows after them
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (extract, transform, export)
//! - [`adapters`] - External integrations (MongoDB, in-memory source, CSV)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use payorders_etl::config::load_config;
//! use payorders_etl::core::export::ExportCoordinator;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("payorders.toml")?;
//!
//!     let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//!     let coordinator = ExportCoordinator::new(&config, shutdown_rx);
//!
//!     let summary = coordinator.execute_export().await?;
//!
//!     println!("Exported {} rows", summary.total_rows_written());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`], whose error
//! [`domain::EtlError`] names the failing phase and classifies the cause:
//!
//! ```rust,no_run
//! use payorders_etl::domain::EtlError;
//!
//! fn report(err: &EtlError) {
//!     eprintln!("[{}] {}", err.kind(), err);
//!     std::process::exit(err.exit_code());
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
