//! Mapping from logical paths to filesystem paths.
//!
//! Pure path arithmetic, no I/O. A logical path `a.b` under base `/data`
//! lives in `/data/a/b`; its child `c` may appear as `/data/a/b/c/` (object),
//! `/data/a/b/c.js` (function) or `/data/a/b/c.dat` (data).

use std::path::{Path as FsPath, PathBuf};

use objfs_core_store::Path;

/// Name of the marker file identifying an object directory.
pub const MARKER_FILE: &str = ".obj";

/// Extension of function leaves.
pub const FUNCTION_EXTENSION: &str = "js";

/// Extension of data leaves.
pub const DATA_EXTENSION: &str = "dat";

/// Every filesystem path that could represent one child key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChildPaths {
    /// Directory form (`<parent>/<key>`).
    pub dir: PathBuf,
    /// Function leaf form (`<parent>/<key>.js`).
    pub js_leaf: PathBuf,
    /// Data leaf form (`<parent>/<key>.dat`).
    pub dat_leaf: PathBuf,
    /// Marker of the directory form (`<parent>/<key>/.obj`).
    pub marker: PathBuf,
    /// Directory of the parent node.
    pub parent_dir: PathBuf,
    /// Marker of the parent node (`<parent>/.obj`).
    pub parent_marker: PathBuf,
}

#[derive(Clone, Copy, Debug)]
pub struct PathMapper<'a> {
    base: &'a FsPath,
}

impl<'a> PathMapper<'a> {
    pub fn new(base: &'a FsPath) -> Self {
        PathMapper { base }
    }

    /// Directory of the node at `path`. The empty path is the base itself.
    pub fn dir_of(&self, path: &Path) -> PathBuf {
        let mut dir = self.base.to_path_buf();
        dir.extend(path.iter());
        dir
    }

    /// Marker file of the node at `path`.
    pub fn marker_of(&self, path: &Path) -> PathBuf {
        self.dir_of(path).join(MARKER_FILE)
    }

    pub fn resolve(&self, parent: &Path, key: &str) -> ChildPaths {
        let parent_dir = self.dir_of(parent);
        ChildPaths {
            dir: parent_dir.join(key),
            js_leaf: parent_dir.join(leaf_name(key, FUNCTION_EXTENSION)),
            dat_leaf: parent_dir.join(leaf_name(key, DATA_EXTENSION)),
            marker: parent_dir.join(key).join(MARKER_FILE),
            parent_marker: parent_dir.join(MARKER_FILE),
            parent_dir,
        }
    }
}

fn leaf_name(key: &str, extension: &str) -> String {
    format!("{}.{}", key, extension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objfs_core_store::path;

    #[test]
    fn resolves_children_of_a_node() {
        let base = PathBuf::from("/data");
        let mapper = PathMapper::new(&base);
        let paths = mapper.resolve(&path!("obj.user"), "name");

        assert_eq!(paths.dir, PathBuf::from("/data/obj/user/name"));
        assert_eq!(paths.js_leaf, PathBuf::from("/data/obj/user/name.js"));
        assert_eq!(paths.dat_leaf, PathBuf::from("/data/obj/user/name.dat"));
        assert_eq!(paths.marker, PathBuf::from("/data/obj/user/name/.obj"));
        assert_eq!(paths.parent_dir, PathBuf::from("/data/obj/user"));
        assert_eq!(paths.parent_marker, PathBuf::from("/data/obj/user/.obj"));
    }

    #[test]
    fn resolves_children_of_the_empty_path() {
        let base = PathBuf::from("/data");
        let mapper = PathMapper::new(&base);
        let paths = mapper.resolve(&path!(""), "obj");

        assert_eq!(paths.dir, PathBuf::from("/data/obj"));
        assert_eq!(paths.parent_dir, base);
        assert_eq!(paths.parent_marker, PathBuf::from("/data/.obj"));
    }

    #[test]
    fn dir_and_marker_of_a_node() {
        let base = PathBuf::from("/data");
        let mapper = PathMapper::new(&base);
        assert_eq!(mapper.dir_of(&path!("")), base);
        assert_eq!(mapper.dir_of(&path!("obj.a.b")), PathBuf::from("/data/obj/a/b"));
        assert_eq!(
            mapper.marker_of(&path!("obj")),
            PathBuf::from("/data/obj/.obj")
        );
    }
}
