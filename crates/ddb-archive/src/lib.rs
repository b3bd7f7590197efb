//! # DDB Archive
//!
//! Filesystem helpers for unpacking the emulator distribution:
//! - [`extract`] a `.tar.gz` archive into a directory
//! - [`delete_recursively`] and [`prepare_dir`] to give each run a clean slate
//! - [`single_top_level_dir`] to find the directory the archive unpacked to

use ddb_common::{Error, IoResultExt, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tar::Archive;
use tracing::debug;

/// Unpacks a gzip-compressed tar archive into `dest`.
///
/// `dest` must already exist. Entries that would land outside of `dest`
/// are skipped by the tar reader.
pub fn extract(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;

    let decoder = GzDecoder::new(BufReader::new(file));
    Archive::new(decoder).unpack(dest).with_context(|| {
        format!(
            "Failed to extract {} into {}",
            archive.display(),
            dest.display()
        )
    })?;

    debug!(archive = %archive.display(), dest = %dest.display(), "Archive extracted");
    Ok(())
}

/// Removes `path` and everything below it. Succeeds if it does not exist.
pub fn delete_recursively(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "Directory deleted");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(
            format!("Failed to delete {}", path.display()),
            e,
        )),
    }
}

/// Deletes `path` if present and recreates it empty.
pub fn prepare_dir(path: &Path) -> Result<()> {
    delete_recursively(path)?;
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))
}

/// Returns the only entry of `dir`, which must be a directory.
pub fn single_top_level_dir(dir: &Path) -> Result<PathBuf> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))? {
        let entry = entry.with_context(|| format!("Failed to list {}", dir.display()))?;
        entries.push(entry.path());
    }

    match entries.as_slice() {
        [only] if only.is_dir() => Ok(only.clone()),
        [only] => Err(Error::invalid_archive(
            dir,
            format!("top-level entry {} is not a directory", only.display()),
        )),
        [] => Err(Error::invalid_archive(dir, "archive is empty")),
        many => Err(Error::invalid_archive(
            dir,
            format!("expected one top-level directory, found {} entries", many.len()),
        )),
    }
}
