//! Support utilities for the junction pooling tool
//! Alejandro Gonzales-Irribarren, 2025
//!
//! This module contains the argument-validation machinery shared by the
//! CLI layer and small quality-of-life helpers (buffered readers and a
//! pre-configured progress bar) used by the core engine.

use indicatif::{ProgressBar, ProgressStyle};
use thiserror::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

// os
#[cfg(not(windows))]
const TICK_SETTINGS: (&str, u64) = ("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ", 80);
#[cfg(windows)]
const TICK_SETTINGS: (&str, u64) = (r"+-x| ", 200);

/// return a pre-configured progress bar
pub fn get_progress_bar(length: u64, msg: &str) -> ProgressBar {
    let progressbar_style = ProgressStyle::default_spinner()
        .tick_chars(TICK_SETTINGS.0)
        .template(" {spinner} {msg:<30} {wide_bar} ETA {eta_precise} ")
        .expect("no template error");

    let progress_bar = ProgressBar::new(length);

    progress_bar.set_style(progressbar_style);
    progress_bar.enable_steady_tick(Duration::from_millis(TICK_SETTINGS.1));
    progress_bar.set_message(msg.to_owned());

    progress_bar
}

/// open a file for buffered line-by-line reading
pub fn reader<P: AsRef<Path>>(path: P) -> Result<BufReader<File>, CliError> {
    let file = File::open(path.as_ref())?;
    Ok(BufReader::new(file))
}

/// argument checker for the pooling tool
pub trait ArgCheck {
    fn check(&self) -> Result<(), CliError> {
        self.validate_args()
    }

    fn validate_args(&self) -> Result<(), CliError> {
        if self.get_junctions().is_empty() {
            let err = "No junction files provided".to_string();
            return Err(CliError::InvalidInput(err));
        }
        for junction in self.get_junctions() {
            validate(junction)?;
        }

        Ok(())
    }

    fn get_junctions(&self) -> &Vec<PathBuf>;
}

/// error handling for CLI
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// argument validation
pub fn validate(arg: &PathBuf) -> Result<(), CliError> {
    if !arg.exists() {
        return Err(CliError::InvalidInput(format!("{:?} does not exist", arg)));
    }

    if !arg.is_file() {
        return Err(CliError::InvalidInput(format!("{:?} is not a file", arg)));
    }

    match std::fs::metadata(arg) {
        Ok(metadata) if metadata.len() == 0 => {
            Err(CliError::InvalidInput(format!("file {:?} is empty", arg)))
        }
        Ok(_) => Ok(()),
        Err(e) => Err(CliError::IoError(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_validate_missing_file() {
        let path = PathBuf::from("/definitely/not/here.tab");
        assert!(matches!(
            validate(&path),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_empty_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();
        assert!(matches!(
            validate(&path),
            Err(CliError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_validate_ok() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t100\t200\t+\tGT/AG\t0\t3\t1\t10").unwrap();
        let path = file.path().to_path_buf();
        assert!(validate(&path).is_ok());
    }
}
