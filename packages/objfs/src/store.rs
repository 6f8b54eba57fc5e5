use std::fmt;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

use objfs_core_store::{Codec, Error, Function, Object, Path};
use objfs_crypto::Cipher;
use objfs_disk_store::{DiskStore, Encoding};

use crate::gate::Permissions;
use crate::node::Node;
use crate::options::{Options, DEFAULT_NAME, DEFAULT_PERMISSIONS};

/// An opened store: the directory `<base>/<name>` and everything needed to
/// read and write below it.
///
/// Values are addressed by the logical path of a node plus a key, either
/// through the [`Reader`](objfs_core_store::Reader) and
/// [`Writer`](objfs_core_store::Writer) impls or through a [`Node`] handle.
///
/// ```rust
/// use objfs::{Options, Store};
/// use serde_json::json;
///
/// let dir = tempfile::tempdir().unwrap();
/// let store = Store::open(Options::new().path(dir.path())).unwrap();
///
/// store.root().set("user", json!({ "name": "Alice" })).unwrap();
/// let user = store.root().get("user").unwrap().unwrap();
/// assert_eq!(user.to_json(), json!({ "name": "Alice" }));
/// assert!(dir.path().join("obj/user/name.dat").is_file());
/// ```
pub struct Store {
    engine: DiskStore,
    root: Path,
    name: String,
    fspath: PathBuf,
    permissions: String,
}

impl Store {
    /// Open (creating if needed) the store described by `options`.
    ///
    /// Creates the base directory and the store directory when they do not
    /// exist and writes the root marker, both in the store directory and in
    /// the base directory, wherever it is missing. Fails on an
    /// unsupported encoding, an unsupported encryption algorithm or a key
    /// that does not pad to 32 bytes. The permission mode is not checked
    /// here.
    pub fn open(options: Options) -> Result<Store, Error> {
        let base = match options.path {
            Some(path) => {
                fs::create_dir_all(&path).map_err(|error| Error::io(&path, error))?;
                path.canonicalize().map_err(|error| Error::io(&path, error))?
            }
            None => dirs::home_dir().ok_or_else(|| Error::Config {
                message: "no base path given and no home directory found".to_string(),
            })?,
        };

        let name = options.name.unwrap_or_else(|| DEFAULT_NAME.to_string());
        let root = Path::root(&name)?;

        let encoding = match options.encoding.as_deref() {
            Some(encoding) => encoding.parse::<Encoding>()?,
            None => Encoding::default(),
        };

        let codec = match options.encryption {
            Some(encryption) if !encryption.algorithm.is_empty() && !encryption.key.is_empty() => {
                Codec::Enabled(Cipher::new(&encryption.algorithm, &encryption.key, &name)?)
            }
            Some(_) => {
                log::warn!("Encryption needs both an algorithm and a key; leaves are stored in plain text");
                Codec::Disabled
            }
            None => Codec::Disabled,
        };

        let engine = DiskStore::new(base)
            .with_encoding(encoding)
            .with_codec(codec);

        let fspath = engine.mapper().dir_of(&root);
        if !fspath.is_dir() {
            log::debug!("Creating {}...", fspath.display());
            fs::create_dir(&fspath).map_err(|error| Error::io(&fspath, error))?;
        }
        engine.ensure_marker(&root)?;

        // Stores written by other tools also expect the root name in
        // `<base>/.obj`.
        let base_marker = engine.mapper().marker_of(&Path::default());
        if engine.leaves().read_raw(&base_marker).is_none() {
            engine.leaves().write_raw(&base_marker, &name)?;
        }

        Ok(Store {
            engine,
            root,
            name,
            fspath,
            permissions: options
                .permissions
                .unwrap_or_else(|| DEFAULT_PERMISSIONS.to_string()),
        })
    }

    /// Handle on the root node.
    pub fn root(&self) -> Node<'_> {
        Node::new(self, self.root.clone())
    }

    /// Handle on the node at `path`, which must be the root or below it.
    pub fn node(&self, path: Path) -> Result<Node<'_>, Error> {
        self.check_inside(&path)?;
        Ok(Node::new(self, path))
    }

    /// Materialize the node at `path`, subject to the permission mode.
    pub fn load(&self, path: &Path) -> Result<Option<Object>, Error> {
        let permissions = self.permissions()?;
        self.check_inside(path)?;
        if !permissions.can_read() {
            return Ok(None);
        }
        self.engine.load(path)
    }

    /// Make `function` callable whenever a leaf with its source text is read.
    pub fn register_function(&self, function: &Function) {
        self.engine.register_function(function);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The logical path of the root node: the store name.
    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// The store directory, `<base>/<name>`.
    pub fn fspath(&self) -> &FsPath {
        &self.fspath
    }

    pub fn base(&self) -> &FsPath {
        self.engine.base()
    }

    pub fn encoding(&self) -> Encoding {
        self.engine.encoding()
    }

    /// The permission mode as configured, valid or not.
    pub fn permission_mode(&self) -> &str {
        &self.permissions
    }

    /// The parsed permission mode.
    pub fn permissions(&self) -> Result<Permissions, Error> {
        self.permissions.parse()
    }

    pub fn encryption_enabled(&self) -> bool {
        self.engine.codec().is_enabled()
    }

    pub(crate) fn engine(&self) -> &DiskStore {
        &self.engine
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("name", &self.name)
            .field("fspath", &self.fspath)
            .field("encoding", &self.encoding())
            .field("permissions", &self.permissions)
            .field("encryption", &self.encryption_enabled())
            .finish()
    }
}
