use clap::Parser;
use std::path::PathBuf;

use crate::consts::{DEFAULT_MIN_JUNCTION_COVERAGE, DEFAULT_MIN_JUNCTION_LENGTH, VERSION};
use crate::utils::ArgCheck;

#[derive(Debug, Parser)]
#[command(
    name = "sj-join",
    version = VERSION,
    about = "Pools splice-junction evidence from multiple alignment runs into a single filtered table"
)]
pub struct Args {
    #[arg(
        short = 'j',
        long = "junctions",
        required = true,
        value_name = "PATHS",
        value_delimiter = ',',
        num_args = 1..,
        help = "Paths to junction evidence files delimited by comma"
    )]
    pub junctions: Vec<PathBuf>,

    #[arg(
        short = 'l',
        long = "min-junction-length",
        help = "Minimum length for a junction to be pooled",
        value_name = "INT",
        default_value_t = DEFAULT_MIN_JUNCTION_LENGTH
    )]
    pub min_junction_length: u64,

    #[arg(
        short = 'm',
        long = "min-junction-coverage",
        help = "Minimum pooled unique coverage for a junction to be written",
        value_name = "INT",
        default_value_t = DEFAULT_MIN_JUNCTION_COVERAGE
    )]
    pub min_junction_coverage: u64,

    #[arg(
        short = 'o',
        long = "outdir",
        help = "Output directory for the pooled junction table",
        value_name = "DIR",
        default_value = "."
    )]
    pub outdir: PathBuf,
}

impl ArgCheck for Args {
    fn get_junctions(&self) -> &Vec<PathBuf> {
        &self.junctions
    }
}
