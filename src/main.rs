use clap::{self, Parser};
use log::{error, info, Level};
use simple_logger::init_with_level;

use sj_join::cli::Args;
use sj_join::core::join_junctions;
use sj_join::utils::ArgCheck;

fn main() {
    let start = std::time::Instant::now();
    init_with_level(Level::Info).unwrap();

    let args: Args = Args::parse();
    args.check().unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    join_junctions(args).unwrap_or_else(|e| {
        error!("{}", e);
        std::process::exit(1);
    });

    let elapsed = start.elapsed();
    info!("Elapsed time: {:?}", elapsed);
}
