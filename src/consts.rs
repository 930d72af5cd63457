//! Shared constants for the junction pooling tool
//! Alejandro Gonzales-Irribarren, 2025

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// numeric values
pub const DEFAULT_MIN_JUNCTION_LENGTH: u64 = 50;
pub const DEFAULT_MIN_JUNCTION_COVERAGE: u64 = 5;
pub const MIN_SJ_FIELDS: usize = 9;

// file names
pub const POOLED_JUNCTIONS: &str = "ALL_SJ_out_filtered.tab";
