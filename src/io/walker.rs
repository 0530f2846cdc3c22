use crate::errors::{Error, Result};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Regular files directly inside `dir`, in the order the file system lists
/// them. Subdirectories and other non-file entries are skipped.
///
/// `dir` must exist and be a directory.
pub fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let metadata = std::fs::metadata(dir).map_err(|e| Error::read(dir, e))?;
    if !metadata.is_dir() {
        return Err(Error::read(
            dir,
            io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
    {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(dir).to_path_buf();
            Error::read(path, e.into())
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        } else {
            log::debug!("Skipping non-file entry {}", entry.path().display());
        }
    }
    Ok(files)
}
