//! objfs: a nested mapping persisted as a directory tree.
//!
//! Every nested mapping is a directory holding a `.obj` marker with its
//! dotted logical path, every function is a `<key>.js` file holding its
//! source and every other value is a `<key>.dat` JSON file. With encryption
//! enabled each leaf is stored as an AES-256-CBC envelope.
//!
//! # Crates
//!
//! - `objfs-core-store`: `Path`, `Value`, `Function`, `Error`, the
//!   `Reader`/`Writer` traits
//! - `objfs-crypto`: the leaf cipher and envelope format
//! - `objfs-disk-store`: the directory-tree engine
//! - `objfs` (this crate): options, bootstrap and the permission gate
//!
//! # Example
//!
//! ```rust
//! use objfs::{Options, Store, Value};
//! use serde_json::json;
//!
//! let dir = tempfile::tempdir().unwrap();
//! let store = Store::open(Options::new().path(dir.path()).permissions("rw")).unwrap();
//! let root = store.root();
//!
//! root.set("count", json!(42)).unwrap();
//! assert_eq!(root.get("count").unwrap(), Some(Value::Data(json!(42))));
//! assert_eq!(root.get("name").unwrap(), Some(Value::Data(json!("obj"))));
//!
//! root.delete("count").unwrap();
//! assert_eq!(root.get("count").unwrap(), None);
//! ```

pub mod gate;
mod node;
mod options;
mod store;

pub use gate::{is_special, Permissions, SPECIAL_PROPERTIES};
pub use node::Node;
pub use options::{EncryptionOptions, Options, DEFAULT_NAME, DEFAULT_PERMISSIONS};
pub use store::Store;

pub use objfs_core_store::{
    path, Callable, Error, Function, Object, Path, PathError, Reader, Value, Writer,
};
pub use objfs_crypto::CryptoError;
pub use objfs_disk_store::Encoding;
