//! Depth-first removal of a directory subtree.

use std::fs;
use std::io;
use std::path::Path as FsPath;

use objfs_core_store::Error;

/// Remove `dir` and everything below it.
///
/// A missing path is a no-op. Symlinks are removed, never followed, and a
/// path that is not a directory is removed as a single file.
pub fn delete_tree(dir: &FsPath) -> Result<(), Error> {
    let metadata = match fs::symlink_metadata(dir) {
        Ok(metadata) => metadata,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(error) => return Err(Error::io(dir, error)),
    };

    if !metadata.is_dir() {
        log::debug!("Removing {}...", dir.display());
        return fs::remove_file(dir).map_err(|error| Error::io(dir, error));
    }

    log::debug!("Removing tree {}...", dir.display());
    // Children are yielded before their parent, so every directory is empty
    // by the time it is removed.
    for entry in walkdir::WalkDir::new(dir).contents_first(true) {
        let entry = entry.map_err(|error| {
            let path = error.path().unwrap_or(dir).to_path_buf();
            Error::io(path, io::Error::from(error))
        })?;

        let path = entry.path();
        let removed = if entry.file_type().is_dir() {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        };
        removed.map_err(|error| Error::io(path, error))?;
    }

    Ok(())
}

/// Remove a single leaf file if it exists.
pub fn delete_leaf(path: &FsPath) -> Result<bool, Error> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Removed {}", path.display());
            Ok(true)
        }
        Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(error) => Err(Error::io(path, error)),
    }
}
