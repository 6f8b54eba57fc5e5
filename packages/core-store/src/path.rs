//! Logical paths: ordered key segments from the store root to a node.

use std::fmt;

/// Errors related to key validation and path parsing.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A key cannot be mapped onto a file or directory name.
    #[error("invalid key '{key}': {message}")]
    InvalidKey { key: String, message: String },

    /// The path string is invalid.
    #[error("invalid path: {message}")]
    InvalidPath { message: String },
}

/// Separator used when a logical path is rendered as text.
pub const SEPARATOR: char = '.';

/// A logical path in an objfs store.
///
/// Paths are kept as key segments and only rendered as dotted text for
/// marker files and display. The first segment of every node path is the
/// store name.
///
/// Keys must be non-empty and may not contain `.`, `/`, `\` or NUL. Those
/// restrictions keep the dotted rendering reversible and guarantee that a
/// key maps onto exactly one directory name and one `<key>.js`/`<key>.dat`
/// leaf name.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    pub components: Vec<String>,
}

impl Path {
    /// The logical path of a store root named `name`.
    pub fn root(name: &str) -> Result<Self, PathError> {
        Self::validate_key(name)?;
        Ok(Path {
            components: vec![name.to_string()],
        })
    }

    /// Parse dotted text, validating every key.
    ///
    /// Empty segments are ignored, so leading and trailing dots normalize
    /// away.
    ///
    /// ```rust
    /// use objfs_core_store::Path;
    ///
    /// let path = Path::parse("obj.user.name").unwrap();
    /// assert_eq!(path.len(), 3);
    /// assert_eq!(path.to_string(), "obj.user.name");
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let components: Vec<String> = s
            .split(SEPARATOR)
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        Self::try_from_components(components)
    }

    /// Try to create a path from components, validating each.
    pub fn try_from_components(components: Vec<String>) -> Result<Self, PathError> {
        for component in components.iter() {
            Self::validate_key(component)?;
        }
        Ok(Path { components })
    }

    /// Check that `key` can name a child node or leaf.
    pub fn validate_key(key: &str) -> Result<(), PathError> {
        let invalid = |message: &str| {
            Err(PathError::InvalidKey {
                key: key.to_string(),
                message: message.to_string(),
            })
        };

        if key.is_empty() {
            return invalid("empty key");
        }
        if let Some(c) = key
            .chars()
            .find(|c| matches!(*c, SEPARATOR | '/' | '\\' | '\0'))
        {
            return invalid(&format!("contains reserved character {:?}", c));
        }

        Ok(())
    }

    /// The path of the child named `key`.
    ///
    /// The key is not validated here; engine operations validate keys at
    /// their entry points.
    #[must_use]
    pub fn child(&self, key: &str) -> Path {
        let mut components = self.components.clone();
        components.push(key.to_string());
        Path { components }
    }

    /// The parent path, or `None` for the empty path.
    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.components.split_last()?;
        Some(Path {
            components: rest.to_vec(),
        })
    }

    /// The last key of this path.
    pub fn key(&self) -> Option<&str> {
        self.components.last().map(String::as_str)
    }

    /// Check if this path is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Get the number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Iterate over components.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.components.iter()
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut components = self.components.clone();
        components.extend(other.components.iter().cloned());
        Path { components }
    }

    /// Whether `prefix` is this path or one of its ancestors.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        self.components.starts_with(&prefix.components)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.components.join("."))
    }
}

impl std::str::FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Path::parse(s)
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use objfs_core_store::path;
///
/// let p = path!("obj.users.alice");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
