//! Core module for pooling splice-junction evidence across alignment runs
//! Alejandro Gonzales-Irribarren, 2025
//!
//! This module contains the main function for joining junction evidence
//! files into a single deduplicated, coverage-filtered table.
//!
//! In short, every line of every input file is parsed into a junction
//! record and folded into an accumulator keyed by genomic identity
//! (chrom, start, end, strand). Records for the same junction seen in
//! different runs add up their read support; annotated or too-short
//! junctions are dropped on ingest. After all files are consumed, the
//! accumulator is walked once in first-encounter order and junctions
//! with enough pooled unique coverage are written out.

use std::fs::File;
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::{debug, info, warn};
use thiserror::Error;

use crate::cli::Args;
use crate::consts::{MIN_SJ_FIELDS, POOLED_JUNCTIONS};
use crate::utils::{get_progress_bar, reader};

/// Joins junction evidence files into a single filtered table
///
/// # Arguments
///
/// * `args` - The command line arguments
///
/// # Returns
///
/// * `Result<()>` - The result of the operation
///
/// # Example
///
/// ```rust, ignore
/// let args = Args::new();
/// join_junctions(args).unwrap();
/// ```
pub fn join_junctions(args: Args) -> Result<()> {
    info!("Pooling junctions from {} file(s)...", args.junctions.len());

    let mut pool = JunctionPool::new(args.min_junction_length);
    let pb = get_progress_bar(args.junctions.len() as u64, "Pooling junctions...");

    for junction in &args.junctions {
        ingest_file(junction, &mut pool)?;
        pb.inc(1);
    }

    pb.finish_and_clear();

    info!(
        "Lines seen: {} | pooled: {} ({} merged) | skipped: {} malformed, {} short, {} annotated",
        pool.stats.seen,
        pool.len(),
        pool.stats.merged,
        pool.stats.malformed,
        pool.stats.short,
        pool.stats.annotated
    );

    if pool.stats.splice_site_conflicts > 0 {
        warn!(
            "{} merged record(s) carried a splice-site class differing from the first-seen one",
            pool.stats.splice_site_conflicts
        );
    }

    let (written, filtered) = pool.write(&args.outdir, args.min_junction_coverage)?;
    info!(
        "Junctions written: {} ({} below coverage threshold)",
        written, filtered
    );

    Ok(())
}

/// Parses one junction file line by line and folds it into the pool
///
/// Lines with too few fields are skipped; any other parse failure is
/// fatal and surfaces the offending file and line number.
fn ingest_file(path: &Path, pool: &mut JunctionPool) -> Result<()> {
    let handle =
        reader(path).with_context(|| format!("Cannot open junction file {:?}", path))?;

    for (idx, line) in handle.lines().enumerate() {
        let line =
            line.with_context(|| format!("Cannot read line {} of {:?}", idx + 1, path))?;

        match JunctionRecord::parse(&line) {
            Ok(record) => pool.ingest(record),
            Err(RecordError::TooFewFields(n)) => {
                pool.stats.malformed += 1;
                debug!(
                    "Skipping line {} of {:?}: {} field(s), expected {}",
                    idx + 1,
                    path.display(),
                    n,
                    MIN_SJ_FIELDS
                );
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("{}:{}", path.display(), idx + 1));
            }
        }
    }

    Ok(())
}

/// error handling for junction lines
#[derive(Debug, Error, PartialEq)]
pub enum RecordError {
    #[error("expected at least {MIN_SJ_FIELDS} fields, found {0}")]
    TooFewFields(usize),
    #[error("invalid {field} `{value}`")]
    InvalidField { field: &'static str, value: String },
}

/// Strand of a junction [+: Forward, -: Reverse, .: Unknown]
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum Strand {
    Forward,
    Reverse,
    Unknown,
}

impl std::str::FromStr for Strand {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Strand::Forward),
            "-" => Ok(Strand::Reverse),
            "." => Ok(Strand::Unknown),
            _ => Err(RecordError::InvalidField {
                field: "strand",
                value: s.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
            Strand::Unknown => write!(f, "."),
        }
    }
}

/// One observed junction from a single alignment run
///
/// # Fields
///
/// * `chrom`: String - Chromosome name
/// * `start`: u64 - Junction start
/// * `end`: u64 - Junction end
/// * `strand`: Strand - Strand of the junction
/// * `splice_sites`: String - Donor/acceptor splice-site class
/// * `annotated`: bool - Whether the junction is present in the annotation
/// * `unique_coverage`: u64 - Uniquely-mapping read support
/// * `multimap_coverage`: u64 - Multi-mapping read support
/// * `max_overhang`: u64 - Maximum alignment overhang
#[derive(Debug, PartialEq, Clone)]
pub struct JunctionRecord {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub splice_sites: String,
    pub annotated: bool,
    pub unique_coverage: u64,
    pub multimap_coverage: u64,
    pub max_overhang: u64,
}

impl JunctionRecord {
    /// Parses one whitespace-delimited junction line
    ///
    /// # Arguments
    ///
    /// * `line` - The raw line to parse
    ///
    /// # Returns
    ///
    /// * `Result<JunctionRecord, RecordError>` - The parsed record
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let record = JunctionRecord::parse("chr1\t100\t200\t+\tGT/AG\t0\t3\t1\t10").unwrap();
    ///
    /// assert_eq!(record.chrom, "chr1");
    /// assert_eq!(record.unique_coverage, 3);
    /// ```
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        // INFO: format of junction file:
        // chr start end strand donor/acceptor annotated coverage multimap-cov alignment-overhang
        let fields = line.split_whitespace().collect::<Vec<_>>();

        if fields.len() < MIN_SJ_FIELDS {
            return Err(RecordError::TooFewFields(fields.len()));
        }

        // INFO: columns beyond the ninth are ignored by position
        let (chrom, start, end, strand, splice_sites, annotated, coverage, multimap, overhang) = (
            fields[0],
            parse_u64(fields[1], "start")?,
            parse_u64(fields[2], "end")?,
            fields[3].parse::<Strand>()?,
            fields[4],
            parse_u64(fields[5], "annotated")?,
            parse_u64(fields[6], "unique_coverage")?,
            parse_u64(fields[7], "multimap_coverage")?,
            parse_u64(fields[8], "max_overhang")?,
        );

        Ok(Self {
            chrom: chrom.to_string(),
            start,
            end,
            strand,
            splice_sites: splice_sites.to_string(),
            // INFO: means that this junction is in GTF [unannotated: 0, annotated: 1]
            annotated: annotated == 1,
            unique_coverage: coverage,
            multimap_coverage: multimap,
            max_overhang: overhang,
        })
    }
}

#[inline(always)]
fn parse_u64(value: &str, field: &'static str) -> Result<u64, RecordError> {
    value.parse::<u64>().map_err(|_| RecordError::InvalidField {
        field,
        value: value.to_string(),
    })
}

/// Genomic identity of a junction
///
/// Two records denote the same junction iff their keys are equal;
/// splice-site class and annotation status are not part of identity.
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct JunctionKey {
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
}

impl From<&JunctionRecord> for JunctionKey {
    fn from(record: &JunctionRecord) -> Self {
        Self {
            chrom: record.chrom.clone(),
            start: record.start,
            end: record.end,
            strand: record.strand,
        }
    }
}

/// Pooled evidence for one distinct junction
#[derive(Debug, PartialEq, Clone)]
pub struct PooledJunction {
    pub splice_sites: String,
    pub unique_coverage: u64,
    pub multimap_coverage: u64,
    pub max_overhang: u64,
}

impl From<&JunctionRecord> for PooledJunction {
    fn from(record: &JunctionRecord) -> Self {
        Self {
            splice_sites: record.splice_sites.clone(),
            unique_coverage: record.unique_coverage,
            multimap_coverage: record.multimap_coverage,
            max_overhang: record.max_overhang,
        }
    }
}

/// Ingest-time skip and merge counters
#[derive(Debug, Default, PartialEq)]
pub struct PoolStats {
    pub seen: u64,
    pub malformed: u64,
    pub short: u64,
    pub annotated: u64,
    pub merged: u64,
    pub splice_site_conflicts: u64,
}

/// Accumulator mapping junction identity to pooled evidence
///
/// Single writer, no readers during ingest; entries keep the order in
/// which their key was first seen.
#[derive(Debug, Default)]
pub struct JunctionPool {
    junctions: IndexMap<JunctionKey, PooledJunction>,
    min_junction_length: u64,
    pub stats: PoolStats,
}

impl JunctionPool {
    pub fn new(min_junction_length: u64) -> Self {
        Self {
            junctions: IndexMap::new(),
            min_junction_length,
            stats: PoolStats::default(),
        }
    }

    /// Folds one record into the pool
    ///
    /// Records shorter than the minimum junction length or already
    /// annotated are dropped. A new key seeds an entry from the record;
    /// an existing key adds up coverages and keeps the maximum overhang.
    ///
    /// # Arguments
    ///
    /// * `record` - The parsed record to ingest
    ///
    /// # Returns
    ///
    /// * None
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let mut pool = JunctionPool::new(50);
    ///
    /// pool.ingest(record);
    ///
    /// assert_eq!(pool.len(), 1);
    /// ```
    pub fn ingest(&mut self, record: JunctionRecord) {
        self.stats.seen += 1;

        // INFO: end < start collapses to length 0 and is skipped as short
        if record.end.saturating_sub(record.start) < self.min_junction_length {
            self.stats.short += 1;
            debug!(
                "Skipping junction {}:{}-{} as it is shorter than {}",
                record.chrom, record.start, record.end, self.min_junction_length
            );
            return;
        }

        // INFO: only novel junctions are pooled; annotated ones are
        // already captured by the reference annotation
        if record.annotated {
            self.stats.annotated += 1;
            return;
        }

        match self.junctions.entry(JunctionKey::from(&record)) {
            Entry::Occupied(mut slot) => {
                let pooled = slot.get_mut();

                // INFO: add up coverage, multimap-cov; max alignment-overhang
                pooled.unique_coverage += record.unique_coverage;
                pooled.multimap_coverage += record.multimap_coverage;
                pooled.max_overhang = pooled.max_overhang.max(record.max_overhang);

                // INFO: first-seen splice sites win; differing later values
                // are counted but never overwrite
                if pooled.splice_sites != record.splice_sites {
                    self.stats.splice_site_conflicts += 1;
                }

                self.stats.merged += 1;
            }
            Entry::Vacant(slot) => {
                slot.insert(PooledJunction::from(&record));
            }
        }
    }

    pub fn len(&self) -> usize {
        self.junctions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.junctions.is_empty()
    }

    pub fn get(&self, key: &JunctionKey) -> Option<&PooledJunction> {
        self.junctions.get(key)
    }

    /// Writes qualifying junctions to `<outdir>/ALL_SJ_out_filtered.tab`
    ///
    /// Entries are walked in first-encounter order and written iff their
    /// pooled unique coverage reaches the threshold. The annotated column
    /// is hardcoded to 1: every pooled junction is known to downstream
    /// steps from here on.
    ///
    /// # Arguments
    ///
    /// * `outdir` - The output directory, created if missing
    /// * `min_junction_coverage` - The pooled coverage threshold
    ///
    /// # Returns
    ///
    /// * `Result<(usize, usize)>` - Junctions written and filtered out
    ///
    /// # Example
    ///
    /// ```rust, ignore
    /// let pool = JunctionPool::new(50);
    ///
    /// let (written, filtered) = pool.write(&outdir, 5).unwrap();
    ///
    /// assert_eq!(written + filtered, pool.len());
    /// ```
    pub fn write(&self, outdir: &Path, min_junction_coverage: u64) -> Result<(usize, usize)> {
        std::fs::create_dir_all(outdir)
            .with_context(|| format!("Cannot create output directory {:?}", outdir))?;

        let path = outdir.join(POOLED_JUNCTIONS);
        let file =
            File::create(&path).with_context(|| format!("Cannot create {:?}", path))?;
        let mut writer = BufWriter::new(file);

        let mut written = 0;
        for (key, pooled) in &self.junctions {
            if pooled.unique_coverage < min_junction_coverage {
                continue;
            }

            writeln!(
                writer,
                "{}\t{}\t{}\t{}\t{}\t1\t{}\t{}\t{}",
                key.chrom,
                key.start,
                key.end,
                key.strand,
                pooled.splice_sites,
                pooled.unique_coverage,
                pooled.multimap_coverage,
                pooled.max_overhang
            )
            .with_context(|| format!("Cannot write to {:?}", path))?;

            written += 1;
        }

        writer
            .flush()
            .with_context(|| format!("Cannot flush {:?}", path))?;

        Ok((written, self.junctions.len() - written))
    }
}
