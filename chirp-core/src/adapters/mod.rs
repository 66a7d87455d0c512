//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the Repository port
//! - Plain in-process collections for the Repository port (tests, embedding)
//! - Fixed demo data for seeding

pub mod demo;
pub mod duckdb;
pub mod memory;
