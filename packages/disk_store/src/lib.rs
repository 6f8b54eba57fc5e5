//! Directory-tree persistence engine for objfs.
//!
//! A nested mapping is stored as a directory tree under a base directory:
//!
//! ```text
//! <base>/obj/.obj               "obj"
//! <base>/obj/user/.obj          "obj.user"
//! <base>/obj/user/name.dat      "\"Alice\""
//! <base>/obj/greet.js           "() => 'hi'"
//! ```
//!
//! Each key is exactly one of a directory (nested mapping), a `.js` leaf
//! (function source) or a `.dat` leaf (JSON). [`DiskStore::get`] rebuilds
//! values from disk on every call and [`DiskStore::set`] tears down whatever
//! represented a key before writing the new value.

mod delete;
mod encoding;
mod leaf;
mod local_disk;
mod mapper;
mod read;
mod write;

pub use delete::{delete_leaf, delete_tree};
pub use encoding::Encoding;
pub use leaf::{LeafCodec, LeafError, LeafKind};
pub use local_disk::DiskStore;
pub use mapper::{ChildPaths, PathMapper, DATA_EXTENSION, FUNCTION_EXTENSION, MARKER_FILE};
pub use read::{FSPATH_KEY, PATH_KEY};
