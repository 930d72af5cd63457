//! Core module for pooling splice-junction evidence across alignment runs
//! Alejandro Gonzales-Irribarren, 2025
//!
//! This module contains the main function for joining junction evidence
//! files produced independently by multiple alignment runs (one per
//! sample) into a single deduplicated, coverage-filtered table.
//!
//! In short, junctions are keyed by genomic identity (chrom, start, end,
//! strand); records for the same junction add up their unique and
//! multimapping read support and keep the maximum alignment overhang.
//! Annotated or too-short junctions are dropped on ingest; pooled
//! junctions below the unique-coverage threshold are dropped on write.

pub mod cli;
pub mod consts;
pub mod core;
pub mod utils;

pub use crate::core::join_junctions;
