//! # Virtual Filesystem
//!
//! An in-memory tree of directories and small files.
//!
//! It anchors mount points for [`MountFileSystemAccessor`], stands in for a
//! real filesystem in tests, and backs discovery caches that only need to
//! present a handful of synthetic entries.
//!
//! Setting an entry creates any missing parent directories, like
//! `mkdir -p`. Keys are the exact component strings.
//!
//! [`MountFileSystemAccessor`]: crate::MountFileSystemAccessor

use std::io::Cursor;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use indexmap::IndexMap;
use indexmap::map::Entry;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::{
    AccessorDescriptor, AccessorError, FileInfo, FileSystemAccessor, FileType, OSPath, ReadSeek,
    Scope,
};

/// An in-memory directory or file.
#[derive(Debug, Clone)]
pub struct VirtualFileInfo {
    path: OSPath,
    is_dir: bool,
    contents: Arc<[u8]>,
    size: u64,
    mtime: SystemTime,
    data: Map<String, Value>,
}

impl VirtualFileInfo {
    /// A file holding `contents`.
    pub fn file(path: OSPath, contents: impl Into<Vec<u8>>) -> Self {
        let contents: Vec<u8> = contents.into();
        let contents: Arc<[u8]> = contents.into();
        Self {
            path,
            is_dir: false,
            size: contents.len() as u64,
            contents,
            mtime: UNIX_EPOCH,
            data: Map::new(),
        }
    }

    /// A directory.
    pub fn directory(path: OSPath) -> Self {
        Self {
            path,
            is_dir: true,
            contents: Arc::from(Vec::<u8>::new()),
            size: 0,
            mtime: UNIX_EPOCH,
            data: Map::new(),
        }
    }

    /// Override the reported size, e.g. for placeholder device entries.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Attach a metadata field.
    pub fn with_data(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data.insert(key.into(), value);
        self
    }

    /// Set the modification time.
    pub fn with_mtime(mut self, mtime: SystemTime) -> Self {
        self.mtime = mtime;
        self
    }

    /// The file contents. Empty for directories.
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl FileInfo for VirtualFileInfo {
    fn name(&self) -> String {
        self.path.basename().to_string()
    }

    fn os_path(&self) -> &OSPath {
        &self.path
    }

    fn file_type(&self) -> FileType {
        if self.is_dir {
            FileType::Directory
        } else {
            FileType::File
        }
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn mtime(&self) -> SystemTime {
        self.mtime
    }

    fn data(&self) -> Map<String, Value> {
        self.data.clone()
    }
}

#[derive(Debug, Clone)]
struct VirtualNode {
    info: VirtualFileInfo,
    children: IndexMap<String, VirtualNode>,
}

impl VirtualNode {
    fn directory(path: OSPath) -> Self {
        Self {
            info: VirtualFileInfo::directory(path),
            children: IndexMap::new(),
        }
    }

    fn find(&self, components: &[String]) -> Option<&VirtualNode> {
        let mut node = self;
        for c in components {
            node = node.children.get(c)?;
        }
        Some(node)
    }
}

/// Accessor over an in-memory tree.
///
/// Instances returned by `new_instance` share the tree with their
/// prototype, so entries set after registration are visible to every
/// query.
///
/// # Example
///
/// ```rust
/// use vfs_accessors::{FileSystemAccessor, OSPath, PathType, VirtualFileInfo,
///     VirtualFilesystemAccessor};
///
/// let root = OSPath::empty(PathType::Linux);
/// let vfs = VirtualFilesystemAccessor::new(root.clone());
/// vfs.set_virtual_file_info(VirtualFileInfo::file(root.append(["etc", "hosts"]), "127.0.0.1"))
///     .unwrap();
///
/// let names: Vec<String> = vfs.read_dir("/etc").unwrap().iter().map(|i| i.name()).collect();
/// assert_eq!(names, ["hosts"]);
/// ```
#[derive(Clone)]
pub struct VirtualFilesystemAccessor {
    root_path: OSPath,
    root: Arc<RwLock<VirtualNode>>,
}

impl VirtualFilesystemAccessor {
    /// An empty tree whose paths use `root_path`'s syntax.
    pub fn new(root_path: OSPath) -> Self {
        let root_path = root_path.clear();
        Self {
            root: Arc::new(RwLock::new(VirtualNode::directory(root_path.clone()))),
            root_path,
        }
    }

    /// The root of the tree.
    pub fn root_path(&self) -> &OSPath {
        &self.root_path
    }

    /// Create a directory and any missing parents.
    pub fn set_virtual_directory(&self, path: &OSPath) -> Result<(), AccessorError> {
        self.set_virtual_file_info(VirtualFileInfo::directory(path.clone()))
    }

    /// Insert or replace an entry, creating missing parent directories.
    ///
    /// Replacing a directory with a directory keeps its children; replacing
    /// it with a file drops them.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotADirectory`] if a parent is a file
    pub fn set_virtual_file_info(&self, info: VirtualFileInfo) -> Result<(), AccessorError> {
        let components = info.path.components().to_vec();
        let mut root = self.root.write();

        let Some((leaf, parents)) = components.split_last() else {
            if !info.is_dir {
                root.children.clear();
            }
            root.info = info;
            return Ok(());
        };

        let mut node = &mut *root;
        let mut current = self.root_path.clone();
        for c in parents {
            if !node.info.is_dir {
                return Err(AccessorError::NotADirectory {
                    path: current.to_string(),
                });
            }
            current = current.append([c]);
            node = node
                .children
                .entry(c.clone())
                .or_insert_with(|| VirtualNode::directory(current.clone()));
        }

        if !node.info.is_dir {
            return Err(AccessorError::NotADirectory {
                path: current.to_string(),
            });
        }

        match node.children.entry(leaf.clone()) {
            Entry::Occupied(mut existing) => {
                let existing = existing.get_mut();
                if !info.is_dir {
                    existing.children.clear();
                }
                existing.info = info;
            }
            Entry::Vacant(slot) => {
                slot.insert(VirtualNode {
                    info,
                    children: IndexMap::new(),
                });
            }
        }
        Ok(())
    }
}

impl FileSystemAccessor for VirtualFilesystemAccessor {
    fn new_instance(&self, _scope: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        Ok(Arc::new(self.clone()))
    }

    fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
        self.root_path.parse_path(path)
    }

    fn read_dir_with_os_path(
        &self,
        path: &OSPath,
    ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        let root = self.root.read();
        let node = root
            .find(path.components())
            .ok_or_else(|| AccessorError::NotFound {
                path: path.to_string(),
            })?;
        if !node.info.is_dir {
            return Err(AccessorError::NotADirectory {
                path: path.to_string(),
            });
        }
        Ok(node
            .children
            .values()
            .map(|child| Box::new(child.info.clone()) as Box<dyn FileInfo>)
            .collect())
    }

    fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
        let root = self.root.read();
        let node = root
            .find(path.components())
            .ok_or_else(|| AccessorError::NotFound {
                path: path.to_string(),
            })?;
        if node.info.is_dir {
            return Err(AccessorError::NotAFile {
                path: path.to_string(),
            });
        }
        Ok(Box::new(Cursor::new(Arc::clone(&node.info.contents))))
    }

    fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
        let root = self.root.read();
        let node = root
            .find(path.components())
            .ok_or_else(|| AccessorError::NotFound {
                path: path.to_string(),
            })?;
        Ok(Box::new(node.info.clone()))
    }

    fn describe(&self) -> AccessorDescriptor {
        AccessorDescriptor::new("vfs", "An in-memory virtual filesystem")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessorExt, PathType};
    use pretty_assertions::assert_eq;
    use std::io::{Read, Seek, SeekFrom};

    fn root() -> OSPath {
        OSPath::empty(PathType::Linux)
    }

    fn names(infos: &[Box<dyn FileInfo>]) -> Vec<String> {
        infos.iter().map(|i| i.name()).collect()
    }

    #[test]
    fn set_creates_parents() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_file_info(VirtualFileInfo::file(root().append(["a", "b", "c.txt"]), "x"))
            .unwrap();

        let a = vfs.lstat("/a").unwrap();
        assert!(a.is_dir());
        assert_eq!(a.full_path(), "/a");
        assert_eq!(names(&vfs.read_dir("/a/b").unwrap()), ["c.txt"]);
    }

    #[test]
    fn listing_keeps_insertion_order() {
        let vfs = VirtualFilesystemAccessor::new(root());
        for name in ["zeta", "alpha", "mid"] {
            vfs.set_virtual_directory(&root().append([name])).unwrap();
        }
        assert_eq!(names(&vfs.read_dir("/").unwrap()), ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn open_reads_and_seeks() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_file_info(VirtualFileInfo::file(root().append(["f"]), "hello world"))
            .unwrap();

        let mut stream = vfs.open("/f").unwrap();
        stream.seek(SeekFrom::Start(6)).unwrap();
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, "world");
    }

    #[test]
    fn kind_errors() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_file_info(VirtualFileInfo::file(root().append(["dir", "f"]), ""))
            .unwrap();

        assert!(matches!(
            vfs.open("/dir").err().unwrap(),
            AccessorError::NotAFile { .. }
        ));
        assert!(matches!(
            vfs.read_dir("/dir/f").err().unwrap(),
            AccessorError::NotADirectory { .. }
        ));
        assert!(vfs.lstat("/missing").err().unwrap().is_not_found());
        assert!(!vfs.exists("/missing").unwrap());
    }

    #[test]
    fn file_in_the_way_is_an_error() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_file_info(VirtualFileInfo::file(root().append(["f"]), ""))
            .unwrap();
        let err = vfs
            .set_virtual_directory(&root().append(["f", "sub"]))
            .unwrap_err();
        assert!(matches!(err, AccessorError::NotADirectory { ref path } if path == "/f"));
    }

    #[test]
    fn replacing_directory_keeps_children() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_directory(&root().append(["d", "child"])).unwrap();
        vfs.set_virtual_file_info(
            VirtualFileInfo::directory(root().append(["d"])).with_data("label", "mount".into()),
        )
        .unwrap();

        let d = vfs.lstat("/d").unwrap();
        assert_eq!(d.data()["label"], "mount");
        assert_eq!(names(&vfs.read_dir("/d").unwrap()), ["child"]);
    }

    #[test]
    fn replacing_directory_with_file_drops_children() {
        let vfs = VirtualFilesystemAccessor::new(root());
        vfs.set_virtual_directory(&root().append(["d", "child"])).unwrap();
        vfs.set_virtual_file_info(VirtualFileInfo::file(root().append(["d"]), "data"))
            .unwrap();

        assert!(!vfs.lstat("/d").unwrap().is_dir());
        assert!(vfs.lstat("/d/child").unwrap_err().is_not_found());
        let err = vfs.read_dir("/d").unwrap_err();
        assert!(matches!(err, AccessorError::NotADirectory { .. }));
        assert_eq!(vfs.read_all("/d").unwrap(), b"data");
    }

    #[test]
    fn size_and_metadata_builders() {
        let info = VirtualFileInfo::file(root().append(["dev"]), "")
            .with_size(4096)
            .with_mtime(UNIX_EPOCH + std::time::Duration::from_secs(10));
        assert_eq!(info.size(), 4096);
        assert_eq!(info.mod_time(), UNIX_EPOCH + std::time::Duration::from_secs(10));
        assert!(!info.is_dir());
    }

    #[test]
    fn instances_share_the_tree() {
        let vfs = VirtualFilesystemAccessor::new(root());
        let instance = vfs.new_instance(&Scope::default()).unwrap();
        vfs.set_virtual_directory(&root().append(["late"])).unwrap();
        assert!(instance.lstat("/late").unwrap().is_dir());
    }
}
