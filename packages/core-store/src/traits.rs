//! Core traits: Reader, Writer.
//!
//! Both address a child by its parent's logical path plus one key, the way a
//! property access on a node would.

use crate::{Error, Path, Value};

/// Read the child `key` of the node at `parent`.
pub trait Reader {
    /// # Returns
    ///
    /// * `Ok(None)` - Nothing is stored under the key, or what is stored
    ///   could not be decoded.
    /// * `Ok(Some(value))` - The materialized value.
    /// * `Err(Error)` - A configuration or filesystem error.
    fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error>;
}

/// Write the child `key` of the node at `parent`.
pub trait Writer {
    /// Store `value` under `key`, replacing whatever representation was there.
    ///
    /// `None` (or JSON null) deletes the key. Returns the stored value as it
    /// now reads back, or `None` when nothing was stored.
    fn write(&self, parent: &Path, key: &str, value: Option<Value>)
        -> Result<Option<Value>, Error>;

    /// Remove every representation of `key`.
    fn delete(&self, parent: &Path, key: &str) -> Result<(), Error> {
        self.write(parent, key, None).map(|_| ())
    }
}

/// Combined read/write.
pub trait Store: Reader + Writer {}
impl<T: Reader + Writer> Store for T {}

// Blanket implementations for references and boxes

impl<T: Reader + ?Sized> Reader for &T {
    fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
        (**self).read(parent, key)
    }
}

impl<T: Writer + ?Sized> Writer for &T {
    fn write(
        &self,
        parent: &Path,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        (**self).write(parent, key, value)
    }
}

impl<T: Reader + ?Sized> Reader for Box<T> {
    fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
        self.as_ref().read(parent, key)
    }
}

impl<T: Writer + ?Sized> Writer for Box<T> {
    fn write(
        &self,
        parent: &Path,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        self.as_ref().write(parent, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    use serde_json::json;

    /// Simple in-memory store for testing.
    struct TestStore {
        data: RefCell<HashMap<Path, Value>>,
    }

    impl TestStore {
        fn new() -> Self {
            Self {
                data: RefCell::new(HashMap::new()),
            }
        }
    }

    impl Reader for TestStore {
        fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
            Ok(self.data.borrow().get(&parent.child(key)).cloned())
        }
    }

    impl Writer for TestStore {
        fn write(
            &self,
            parent: &Path,
            key: &str,
            value: Option<Value>,
        ) -> Result<Option<Value>, Error> {
            let path = parent.child(key);
            match value {
                Some(value) if !value.is_null() => {
                    self.data.borrow_mut().insert(path, value.clone());
                    Ok(Some(value))
                }
                _ => {
                    self.data.borrow_mut().remove(&path);
                    Ok(None)
                }
            }
        }
    }

    #[test]
    fn basic_store_works() {
        let store = TestStore::new();
        let root = crate::path!("obj");

        store
            .write(&root, "name", Some(Value::Data(json!("Alice"))))
            .unwrap();
        assert_eq!(
            store.read(&root, "name").unwrap(),
            Some(Value::Data(json!("Alice")))
        );

        store.delete(&root, "name").unwrap();
        assert_eq!(store.read(&root, "name").unwrap(), None);
    }

    #[test]
    fn object_safety_works() {
        let store = TestStore::new();
        let boxed: Box<dyn Store> = Box::new(store);
        let root = crate::path!("obj");

        boxed
            .write(&root, "test", Some(Value::Data(json!("hello"))))
            .unwrap();
        assert!(boxed.read(&root, "test").unwrap().is_some());
    }
}
