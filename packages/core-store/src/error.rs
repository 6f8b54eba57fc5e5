//! Error types shared by every objfs layer.
//!
//! Two tiers matter to callers. Configuration errors (unsupported algorithm,
//! unsupported permission mode, writes to special properties) always surface.
//! Soft read failures never reach this type: a missing, undecryptable or
//! malformed leaf reads as absent. Anything else the filesystem reports is
//! passed through as [`Error::Io`].

use std::io;
use std::path::PathBuf;

use objfs_crypto::CryptoError;

use crate::path::PathError;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Path(#[from] PathError),

    #[error("encryption error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("invalid permission mode '{mode}' (valid modes: r, ro, w, wo, rw)")]
    InvalidPermissions { mode: String },

    #[error("cannot set special property '{key}'")]
    SpecialProperty { key: String },

    #[error("unsupported text encoding '{encoding}'")]
    UnsupportedEncoding { encoding: String },

    #[error("text cannot be represented in {encoding}: {message}")]
    Encode { encoding: String, message: String },

    #[error("function has no registered implementation: {function}")]
    UnboundFunction { function: String },

    #[error("node '{path}' is outside the store '{root}'")]
    OutsideStore { path: String, root: String },

    #[error("invalid configuration: {message}")]
    Config { message: String },

    #[error("I/O error at {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}

impl Error {
    /// Wrap an I/O failure with the filesystem path it concerns.
    pub fn io(path: impl Into<PathBuf>, error: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            error,
        }
    }

    /// Whether this error came from the filesystem rather than from objfs
    /// itself.
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io { .. })
    }
}
