//! Database module for SQLite operations.
//!
//! This module provides:
//! - Database initialization and schema setup
//! - SQLite pragma configuration
//! - Repository layer for writes and reporting queries

pub mod migrations;
pub mod repo;

pub use migrations::init_db;
pub use repo::{IntegrityReport, LoadSummary, Repository};
