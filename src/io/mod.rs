//! File system access for the report and the model inputs.

pub mod walker;

pub use walker::list_directory;

use crate::errors::{Error, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

/// Create (or truncate) the report file.
pub fn create_report(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        Error::output("cannot open report file", path.display().to_string(), e)
    })?;
    log::debug!("Writing report to {}", path.display());
    Ok(BufWriter::new(file))
}

pub fn write_file(path: &Path, content: &str) -> anyhow::Result<()> {
    fs::write(path, content)?;
    Ok(())
}
