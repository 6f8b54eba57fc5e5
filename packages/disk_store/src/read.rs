//! Materializing values from the directory tree.

use std::path::Path as FsPath;

use serde_json::Value as JsonValue;

use objfs_core_store::{Error, Object, Path, Value};

use crate::leaf::LeafKind;
use crate::local_disk::DiskStore;
use crate::mapper::{DATA_EXTENSION, FUNCTION_EXTENSION};

/// Computed key: the filesystem directory of the parent node.
pub const FSPATH_KEY: &str = "fspath";

/// Computed key: the logical path recorded in the parent's marker.
pub const PATH_KEY: &str = "path";

impl DiskStore {
    /// Resolve the child `key` of the node at `parent`.
    ///
    /// The first matching representation wins:
    /// 1. `fspath`: the parent's directory, if it exists
    /// 2. an object directory (directory with a readable marker)
    /// 3. a function leaf
    /// 4. a data leaf
    /// 5. `path`: the parent's marker text
    ///
    /// Objects are rebuilt from a fresh directory listing on every call.
    pub fn get(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
        Path::validate_key(key)?;
        let paths = self.mapper().resolve(parent, key);

        if key == FSPATH_KEY {
            return Ok(paths
                .parent_dir
                .is_dir()
                .then(|| Value::Data(JsonValue::String(paths.parent_dir.display().to_string()))));
        }

        if self.is_object_dir(&paths.dir) {
            let object = self.load_dir(parent.child(key), &paths.dir)?;
            return Ok(Some(Value::Object(object)));
        }

        if paths.js_leaf.is_file() {
            return Ok(self.leaves().read(&paths.js_leaf, LeafKind::Function));
        }

        if paths.dat_leaf.is_file() {
            return Ok(self.leaves().read(&paths.dat_leaf, LeafKind::Data));
        }

        if key == PATH_KEY {
            return Ok(self.leaves().read(&paths.parent_marker, LeafKind::Raw));
        }

        Ok(None)
    }

    /// Materialize the object directory at `path` itself.
    ///
    /// Returns `None` if there is no directory with a readable marker there.
    pub fn load(&self, path: &Path) -> Result<Option<Object>, Error> {
        let dir = self.mapper().dir_of(path);
        if !self.is_object_dir(&dir) {
            return Ok(None);
        }
        self.load_dir(path.clone(), &dir).map(Some)
    }

    fn load_dir(&self, path: Path, dir: &FsPath) -> Result<Object, Error> {
        log::debug!("Listing {}...", dir.display());

        let mut object = Object::at(path);
        for entry in walkdir::WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|error| {
                let at = error.path().unwrap_or(dir).to_path_buf();
                Error::io(at, std::io::Error::from(error))
            })?;

            let Some(name) = entry.file_name().to_str() else {
                log::debug!("Skipping non UTF-8 entry {}", entry.path().display());
                continue;
            };

            let (key, value) = if entry.file_type().is_dir() {
                if Path::validate_key(name).is_err() || !self.is_object_dir(entry.path()) {
                    continue;
                }
                let child = self.load_dir(object.path().child(name), entry.path())?;
                (name, Some(Value::Object(child)))
            } else if let Some(key) = leaf_key(name, FUNCTION_EXTENSION) {
                (key, self.leaves().read(entry.path(), LeafKind::Function))
            } else if let Some(key) = leaf_key(name, DATA_EXTENSION) {
                (key, self.leaves().read(entry.path(), LeafKind::Data))
            } else {
                continue;
            };

            if let Some(value) = value {
                object.insert(key, value);
            }
        }

        Ok(object)
    }
}

/// The key a leaf file name stands for, if it has the given extension.
fn leaf_key<'n>(name: &'n str, extension: &str) -> Option<&'n str> {
    let key = name.strip_suffix(extension)?.strip_suffix('.')?;
    Path::validate_key(key).ok().map(|_| key)
}
