//! Store configuration.

use std::fmt;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

use serde::Deserialize;

use objfs_core_store::Error;

/// Store name used when none is configured.
pub const DEFAULT_NAME: &str = "obj";

/// Permission mode used when none is configured.
pub const DEFAULT_PERMISSIONS: &str = "rw";

/// Everything [`Store::open`](crate::Store::open) needs to know.
///
/// Every field is optional. Options can be built in code or deserialized
/// from JSON:
///
/// ```rust
/// use objfs::Options;
///
/// let options: Options = serde_json::from_str(r#"{
///     "path": "/tmp/objfs",
///     "name": "users",
///     "permissions": "ro",
///     "encryption": { "algorithm": "aes-256-cbc", "key": "secret" }
/// }"#).unwrap();
///
/// assert_eq!(options, Options::new()
///     .path("/tmp/objfs")
///     .name("users")
///     .permissions("ro")
///     .encryption("aes-256-cbc", "secret"));
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Options {
    /// Base directory holding the store directory. Defaults to the home
    /// directory.
    pub path: Option<PathBuf>,
    /// Store name: the store directory name and the root logical path.
    pub name: Option<String>,
    /// Text encoding of leaf contents (`utf8`, `latin1`, `ascii`).
    pub encoding: Option<String>,
    /// Permission mode (`r`, `ro`, `w`, `wo`, `rw`). Checked on access, not
    /// on open.
    pub permissions: Option<String>,
    pub encryption: Option<EncryptionOptions>,
}

/// Leaf encryption settings. Encryption stays off unless both fields are
/// non-empty.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct EncryptionOptions {
    pub algorithm: String,
    pub key: String,
}

impl fmt::Debug for EncryptionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncryptionOptions")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read options from a JSON file.
    pub fn from_json_file(path: &FsPath) -> Result<Self, Error> {
        let text = fs::read_to_string(path).map_err(|error| Error::io(path, error))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|e| Error::Config {
            message: e.to_string(),
        })
    }

    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }

    #[must_use]
    pub fn permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = Some(permissions.into());
        self
    }

    #[must_use]
    pub fn encryption(mut self, algorithm: impl Into<String>, key: impl Into<String>) -> Self {
        self.encryption = Some(EncryptionOptions {
            algorithm: algorithm.into(),
            key: key.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_is_all_defaults() {
        assert_eq!(Options::from_json_str("{}").unwrap(), Options::default());
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Options::from_json_str(r#"{ "nmae": "typo" }"#).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn incomplete_encryption_section_parses() {
        let options = Options::from_json_str(r#"{ "encryption": { "key": "k" } }"#).unwrap();
        let encryption = options.encryption.unwrap();
        assert_eq!(encryption.algorithm, "");
        assert_eq!(encryption.key, "k");
    }

    #[test]
    fn debug_hides_key() {
        let options = Options::new().encryption("aes256", "hunter2");
        let debug = format!("{:?}", options);
        assert!(debug.contains("aes256"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn from_json_file_works() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("objfs.json");
        fs::write(&file, r#"{ "name": "users", "encoding": "latin1" }"#).unwrap();

        let options = Options::from_json_file(&file).unwrap();
        assert_eq!(options, Options::new().name("users").encoding("latin1"));

        let err = Options::from_json_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.is_io());
    }
}
