//! Permission modes and special properties: the front door of a [`Store`].
//!
//! Every read and write goes through the gate before reaching the engine:
//!
//! - the permission mode is parsed on each access, so an unknown mode fails
//!   at the first access rather than at open
//! - reads in a write-only mode are absent
//! - writes in a read-only mode do nothing
//! - nodes outside the store (not the root or below it) are rejected
//! - on the root node the special properties read as computed metadata and
//!   can never be written, whatever the mode

use std::fmt;
use std::str::FromStr;

use serde_json::Value as JsonValue;

use objfs_core_store::{Error, Path, Reader as StoreRead, Value, Writer as StoreWrite};

use crate::store::Store;

/// Keys that the root node computes instead of storing.
pub const SPECIAL_PROPERTIES: [&str; 6] = [
    "path",
    "fspath",
    "name",
    "encoding",
    "permissions",
    "encryption",
];

pub fn is_special(key: &str) -> bool {
    SPECIAL_PROPERTIES.contains(&key)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permissions {
    /// `r` or `ro`
    ReadOnly,
    /// `w` or `wo`
    WriteOnly,
    /// `rw`
    ReadWrite,
}

impl Permissions {
    pub fn can_read(self) -> bool {
        matches!(self, Permissions::ReadOnly | Permissions::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, Permissions::WriteOnly | Permissions::ReadWrite)
    }
}

impl FromStr for Permissions {
    type Err = Error;

    fn from_str(mode: &str) -> Result<Self, Self::Err> {
        match mode {
            "r" | "ro" => Ok(Permissions::ReadOnly),
            "w" | "wo" => Ok(Permissions::WriteOnly),
            "rw" => Ok(Permissions::ReadWrite),
            _ => Err(Error::InvalidPermissions {
                mode: mode.to_string(),
            }),
        }
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Permissions::ReadOnly => "ro",
            Permissions::WriteOnly => "wo",
            Permissions::ReadWrite => "rw",
        })
    }
}

impl Store {
    /// The computed value of a special property of the root node.
    fn special(&self, key: &str) -> Option<Value> {
        let value = match key {
            "path" => JsonValue::String(self.name().to_string()),
            "fspath" => JsonValue::String(self.fspath().display().to_string()),
            "name" => JsonValue::String(self.name().to_string()),
            "encoding" => JsonValue::String(self.encoding().name().to_string()),
            "permissions" => JsonValue::String(self.permission_mode().to_string()),
            "encryption" => JsonValue::Bool(self.encryption_enabled()),
            _ => return None,
        };
        Some(Value::Data(value))
    }

    fn is_root(&self, node: &Path) -> bool {
        node == self.root_path()
    }

    /// Reject nodes that are not the root or below it.
    pub(crate) fn check_inside(&self, node: &Path) -> Result<(), Error> {
        if node.has_prefix(self.root_path()) {
            Ok(())
        } else {
            Err(Error::OutsideStore {
                path: node.to_string(),
                root: self.root_path().to_string(),
            })
        }
    }
}

impl StoreRead for Store {
    fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
        let permissions = self.permissions()?;
        self.check_inside(parent)?;

        if !permissions.can_read() {
            log::debug!("Read of {}.{} denied by mode", parent, key);
            return Ok(None);
        }

        if self.is_root(parent) && is_special(key) {
            return Ok(self.special(key));
        }

        self.engine().get(parent, key)
    }
}

impl StoreWrite for Store {
    fn write(
        &self,
        parent: &Path,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        let permissions = self.permissions()?;
        self.check_inside(parent)?;

        if self.is_root(parent) && is_special(key) {
            return Err(Error::SpecialProperty {
                key: key.to_string(),
            });
        }

        if !permissions.can_write() {
            log::debug!("Write of {}.{} ignored by mode", parent, key);
            return Ok(None);
        }

        self.engine().set(parent, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modes() {
        for (mode, expected) in [
            ("r", Permissions::ReadOnly),
            ("ro", Permissions::ReadOnly),
            ("w", Permissions::WriteOnly),
            ("wo", Permissions::WriteOnly),
            ("rw", Permissions::ReadWrite),
        ] {
            assert_eq!(mode.parse::<Permissions>().unwrap(), expected);
        }
    }

    #[test]
    fn unknown_mode_is_an_error() {
        for mode in ["", "wr", "RW", "rwx"] {
            assert!(matches!(
                mode.parse::<Permissions>(),
                Err(Error::InvalidPermissions { .. })
            ));
        }
    }

    #[test]
    fn capabilities() {
        assert!(Permissions::ReadOnly.can_read());
        assert!(!Permissions::ReadOnly.can_write());
        assert!(!Permissions::WriteOnly.can_read());
        assert!(Permissions::WriteOnly.can_write());
        assert!(Permissions::ReadWrite.can_read());
        assert!(Permissions::ReadWrite.can_write());
    }

    #[test]
    fn special_properties() {
        assert!(is_special("fspath"));
        assert!(is_special("encryption"));
        assert!(!is_special("user"));
        assert!(!is_special("Path"));
    }
}
