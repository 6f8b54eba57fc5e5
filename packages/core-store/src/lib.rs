//! Core objfs: the vocabulary shared by every layer.
//!
//! - `Path`: logical path, an ordered list of keys starting at the store name
//! - `Value`: what a key holds (JSON data, a function, or a nested `Object`)
//! - `Function` / `FunctionRegistry`: function leaves and their implementations
//! - `Reader` / `Writer`: access a child of a node by key
//!
//! # Example
//!
//! ```rust
//! use objfs_core_store::{Error, Path, Reader, Value};
//!
//! fn read_user(store: &dyn Reader) -> Result<Option<Value>, Error> {
//!     store.read(&Path::root("obj")?, "user")
//! }
//! ```

mod error;
mod function;
mod path;
mod traits;
mod value;

pub use error::Error;
pub use function::{Callable, Function, FunctionRegistry};
pub use path::{Path, PathError, SEPARATOR};
pub use traits::{Reader, Store, Writer};
pub use value::{Object, Value};

// Re-export the crypto layer for convenience
pub use objfs_crypto::{Cipher, Codec, CryptoError};
