//! MongoDB integration
//!
//! This module provides the MongoDB source the export reads payment orders
//! from.

pub mod client;

pub use client::{MongoConnection, MongoConnector};
