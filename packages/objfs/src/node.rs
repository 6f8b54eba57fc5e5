use objfs_core_store::{Error, Object, Path, Reader as StoreRead, Value, Writer as StoreWrite};

use crate::store::Store;

/// A handle on one node of a [`Store`], addressed by logical path.
///
/// A handle holds no data. Every `get` goes back to disk and every `set`
/// writes through immediately; both pass the store's permission gate.
#[derive(Clone, Debug)]
pub struct Node<'s> {
    store: &'s Store,
    path: Path,
}

impl<'s> Node<'s> {
    pub(crate) fn new(store: &'s Store, path: Path) -> Self {
        Node { store, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        self.store.read(&self.path, key)
    }

    /// Store `value` under `key`. JSON null deletes the key.
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<Option<Value>, Error> {
        self.store.write(&self.path, key, Some(value.into()))
    }

    pub fn delete(&self, key: &str) -> Result<(), Error> {
        self.store.delete(&self.path, key)
    }

    /// Handle on the child node `key`. Nothing is read or created.
    pub fn child(&self, key: &str) -> Result<Node<'s>, Error> {
        Path::validate_key(key)?;
        Ok(Node::new(self.store, self.path.child(key)))
    }

    /// Materialize this node with everything below it.
    pub fn load(&self) -> Result<Option<Object>, Error> {
        self.store.load(&self.path)
    }
}
