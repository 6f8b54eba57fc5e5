//! Persisting values into the directory tree.

use std::fs;

use serde_json::Value as JsonValue;

use objfs_core_store::{Error, Function, Object, Path, PathError, Value};

use crate::delete::{delete_leaf, delete_tree};
use crate::local_disk::DiskStore;
use crate::mapper::ChildPaths;
use crate::read::{FSPATH_KEY, PATH_KEY};

impl DiskStore {
    /// Store `value` as the child `key` of the node at `parent`.
    ///
    /// Whatever represented `key` before is removed first, so a key is only
    /// ever a directory, a `.js` leaf or a `.dat` leaf. `None` and JSON null
    /// delete the key. Data written to the computed keys `path` and `fspath`
    /// is dropped.
    ///
    /// Returns what was stored: an [`Object`] snapshot for mappings, the
    /// value itself for leaves, `None` for deletions.
    pub fn set(
        &self,
        parent: &Path,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        Path::validate_key(key)?;
        if let Some(Value::Object(object)) = &value {
            validate_keys(object)?;
        }

        let paths = self.mapper().resolve(parent, key);
        match value {
            None => self.remove(&paths).map(|_| None),
            Some(value) if value.is_null() => self.remove(&paths).map(|_| None),
            Some(Value::Object(object)) => self
                .set_object(parent.child(key), &paths, object)
                .map(|object| Some(Value::Object(object))),
            Some(Value::Function(function)) => {
                self.set_function(&paths, &function)?;
                Ok(Some(Value::Function(function)))
            }
            Some(Value::Data(_)) if key == PATH_KEY || key == FSPATH_KEY => {
                log::debug!("Ignoring write to computed key {}.{}", parent, key);
                Ok(None)
            }
            Some(Value::Data(data)) => {
                self.set_data(&paths, &data)?;
                Ok(Some(Value::Data(data)))
            }
        }
    }

    fn set_object(&self, path: Path, paths: &ChildPaths, object: Object) -> Result<Object, Error> {
        delete_leaf(&paths.js_leaf)?;
        delete_leaf(&paths.dat_leaf)?;

        let marker = path.to_string();
        if !paths.dir.exists() {
            self.create_object_dir(paths, &marker)?;
        } else if !self.is_object_dir(&paths.dir) {
            self.leaves().write_raw(&paths.marker, &marker)?;
        } else {
            // Replacing a whole mapping: start from an empty directory so no
            // stale children survive.
            delete_tree(&paths.dir)?;
            self.create_object_dir(paths, &marker)?;
        }

        let mut written = Object::at(path);
        for (key, value) in object {
            if key == PATH_KEY || value.is_null() {
                continue;
            }
            let parent = written.path().clone();
            if let Some(stored) = self.set(&parent, &key, Some(value))? {
                written.insert(key, stored);
            }
        }

        Ok(written)
    }

    fn create_object_dir(&self, paths: &ChildPaths, marker: &str) -> Result<(), Error> {
        log::debug!("Creating {}...", paths.dir.display());
        fs::create_dir(&paths.dir).map_err(|error| Error::io(&paths.dir, error))?;
        self.leaves().write_raw(&paths.marker, marker)
    }

    fn set_function(&self, paths: &ChildPaths, function: &Function) -> Result<(), Error> {
        delete_leaf(&paths.dat_leaf)?;
        self.remove_dir(paths)?;
        self.register_function(function);
        self.leaves().write_function(&paths.js_leaf, function)
    }

    fn set_data(&self, paths: &ChildPaths, data: &JsonValue) -> Result<(), Error> {
        delete_leaf(&paths.js_leaf)?;
        self.remove_dir(paths)?;
        self.leaves().write_data(&paths.dat_leaf, data)
    }

    fn remove_dir(&self, paths: &ChildPaths) -> Result<(), Error> {
        if paths.dir.is_dir() {
            delete_tree(&paths.dir)?;
        }
        Ok(())
    }

    /// Delete the first representation found: directory, function leaf,
    /// data leaf.
    fn remove(&self, paths: &ChildPaths) -> Result<(), Error> {
        if paths.dir.is_dir() {
            delete_tree(&paths.dir)
        } else if delete_leaf(&paths.js_leaf)? {
            Ok(())
        } else {
            delete_leaf(&paths.dat_leaf).map(|_| ())
        }
    }
}

/// Reject a mapping with an unusable key anywhere before touching disk.
fn validate_keys(object: &Object) -> Result<(), PathError> {
    for (key, value) in object {
        if key == PATH_KEY {
            continue;
        }
        Path::validate_key(key)?;
        if let Value::Object(child) = value {
            validate_keys(child)?;
        }
    }
    Ok(())
}
