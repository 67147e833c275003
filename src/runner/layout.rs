//! On-disk layout of run and step directories.
//!
//! ```text
//! <output_dir>/<YYYY-MM-DD_HH-mm-ss>/              run directory
//! <output_dir>/<YYYY-MM-DD_HH-mm-ss>/<NN>_<id>/    step directory
//! ```
//!
//! `NN` is the step's 1-based position in the run order, zero-padded to two
//! digits. Directories that already exist are reused.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// strftime format of run directory names.
pub const RUN_DIRECTORY_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Name of the run directory for a run started at `started`.
pub fn run_directory_name(started: DateTime<Local>) -> String {
    started.format(RUN_DIRECTORY_FORMAT).to_string()
}

/// Name of the directory for the step at 1-based `index`.
pub fn step_directory_name(index: usize, id: &str) -> String {
    format!("{:02}_{}", index, id)
}

/// Create the run directory under `output_dir`.
pub fn create_run_directory(output_dir: &Path, started: DateTime<Local>) -> io::Result<PathBuf> {
    let dir = output_dir.join(run_directory_name(started));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Create the directory for the step at 1-based `index`.
pub fn create_step_directory(run_dir: &Path, index: usize, id: &str) -> io::Result<PathBuf> {
    let dir = run_dir.join(step_directory_name(index, id));
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
