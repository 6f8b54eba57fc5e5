use std::path::{Path as FsPath, PathBuf};

use objfs_core_store::{
    Codec, Error, Function, FunctionRegistry, Path, Reader as StoreRead, Value,
    Writer as StoreWrite,
};

use crate::encoding::Encoding;
use crate::leaf::LeafCodec;
use crate::mapper::PathMapper;

/// The persistence engine: a nested mapping materialized as a directory tree.
///
/// `DiskStore` carries everything an engine operation needs (base directory,
/// text encoding, leaf codec, function registry) and is passed by reference
/// into every read and write.
///
/// # Concurrency
///
/// Operations are synchronous and hold no locks. Writes that replace one
/// representation with another (delete-then-recreate) are not atomic, so two
/// writers sharing a tree, in one process or several, can interleave and
/// leave it inconsistent. Nothing is cached: every read goes back to disk.
pub struct DiskStore {
    base: PathBuf,
    encoding: Encoding,
    codec: Codec,
    functions: FunctionRegistry,
}

impl DiskStore {
    /// An engine rooted at `base`, UTF-8 and unencrypted.
    ///
    /// `base` is used as given; bootstrap (resolving and creating it) is the
    /// caller's job.
    pub fn new(base: PathBuf) -> Self {
        DiskStore {
            base,
            encoding: Encoding::default(),
            codec: Codec::Disabled,
            functions: FunctionRegistry::new(),
        }
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_codec(mut self, codec: Codec) -> Self {
        self.codec = codec;
        self
    }

    pub fn base(&self) -> &FsPath {
        &self.base
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn codec(&self) -> &Codec {
        &self.codec
    }

    pub fn functions(&self) -> &FunctionRegistry {
        &self.functions
    }

    /// Make `function` callable when it is read back from any leaf holding
    /// the same source text.
    pub fn register_function(&self, function: &Function) {
        self.functions.register(function);
    }

    pub fn mapper(&self) -> PathMapper<'_> {
        PathMapper::new(&self.base)
    }

    pub fn leaves(&self) -> LeafCodec<'_> {
        LeafCodec::new(self.encoding, &self.codec, &self.functions)
    }

    /// Whether `dir` is a managed object directory: it exists and holds a
    /// readable marker.
    pub(crate) fn is_object_dir(&self, dir: &FsPath) -> bool {
        dir.is_dir()
            && self
                .leaves()
                .read_raw(&dir.join(crate::mapper::MARKER_FILE))
                .is_some()
    }

    /// Write the marker of the node at `path` if it has none.
    pub fn ensure_marker(&self, path: &Path) -> Result<(), Error> {
        let marker = self.mapper().marker_of(path);
        if self.leaves().read_raw(&marker).is_none() {
            self.leaves().write_raw(&marker, &path.to_string())?;
        }
        Ok(())
    }
}

impl StoreRead for DiskStore {
    fn read(&self, parent: &Path, key: &str) -> Result<Option<Value>, Error> {
        self.get(parent, key)
    }
}

impl StoreWrite for DiskStore {
    fn write(
        &self,
        parent: &Path,
        key: &str,
        value: Option<Value>,
    ) -> Result<Option<Value>, Error> {
        self.set(parent, key, value)
    }
}

#[cfg(test)]
mod disk_store_tests {
    use super::*;
    use std::fs;

    use objfs_core_store::{path, Cipher};
    use serde_json::json;

    struct TestDiskStore {
        // Having this as a member allows the directory to be cleaned up once the test store is
        // dropped.
        _dir: tempfile::TempDir,
        store: DiskStore,
        root: Path,
    }

    impl TestDiskStore {
        fn new() -> TestDiskStore {
            Self::with_codec(Codec::Disabled)
        }

        fn with_codec(codec: Codec) -> TestDiskStore {
            let dir = tempfile::tempdir().unwrap();
            let store = DiskStore::new(dir.path().to_path_buf()).with_codec(codec);
            let root = path!("obj");
            fs::create_dir(store.mapper().dir_of(&root)).unwrap();
            store.ensure_marker(&root).unwrap();
            TestDiskStore {
                _dir: dir,
                store,
                root,
            }
        }

        fn dir(&self) -> PathBuf {
            self.store.mapper().dir_of(&self.root)
        }
    }

    #[test]
    fn ensure_marker_writes_once() {
        let t = TestDiskStore::new();
        let marker = t.dir().join(".obj");
        assert_eq!(fs::read_to_string(&marker).unwrap(), "obj");

        fs::write(&marker, "custom").unwrap();
        t.store.ensure_marker(&t.root).unwrap();
        assert_eq!(fs::read_to_string(&marker).unwrap(), "custom");
    }

    #[test]
    fn trait_roundtrip() {
        let t = TestDiskStore::new();
        let store: &dyn objfs_core_store::Store = &t.store;

        store
            .write(&t.root, "n", Some(Value::Data(json!(1))))
            .unwrap();
        assert_eq!(
            store.read(&t.root, "n").unwrap(),
            Some(Value::Data(json!(1)))
        );
        store.delete(&t.root, "n").unwrap();
        assert_eq!(store.read(&t.root, "n").unwrap(), None);
    }

    #[test]
    fn registered_functions_bind_on_read() {
        let t = TestDiskStore::new();
        fs::write(t.dir().join("greet.js"), "() => 'hi'").unwrap();

        let before = t.store.get(&t.root, "greet").unwrap().unwrap();
        assert!(!before.as_function().unwrap().is_bound());

        t.store
            .register_function(&Function::new("() => 'hi'", |_| json!("hi")));
        let after = t.store.get(&t.root, "greet").unwrap().unwrap();
        assert_eq!(after.as_function().unwrap().call(&[]).unwrap(), json!("hi"));
    }

    #[test]
    fn encrypted_store_roundtrips_objects() {
        let codec = Codec::Enabled(Cipher::new("aes256", "secret", "obj").unwrap());
        let t = TestDiskStore::with_codec(codec);
        assert!(t.store.codec().is_enabled());

        let user = Value::from(json!({ "name": "Alice", "tags": ["a", "b"] }));
        t.store.set(&t.root, "user", Some(user.clone())).unwrap();

        let stored = fs::read_to_string(t.dir().join("user").join("name.dat")).unwrap();
        assert!(!stored.contains("Alice"));
        assert_eq!(
            fs::read_to_string(t.dir().join("user").join(".obj")).unwrap(),
            "obj.user"
        );

        let read = t.store.get(&t.root, "user").unwrap().unwrap();
        assert_eq!(read.to_json(), user.to_json());
    }

    #[test]
    fn latin1_store_writes_single_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskStore::new(dir.path().to_path_buf()).with_encoding(Encoding::Latin1);
        assert_eq!(store.encoding(), Encoding::Latin1);

        store
            .set(&path!(""), "word", Some(Value::Data(json!("caf\u{e9}"))))
            .unwrap();
        assert_eq!(
            fs::read(dir.path().join("word.dat")).unwrap(),
            vec![b'"', b'c', b'a', b'f', 0xe9, b'"']
        );
        assert_eq!(
            store.get(&path!(""), "word").unwrap(),
            Some(Value::Data(json!("caf\u{e9}")))
        );
    }
}
