//! # Mount Filesystem
//!
//! Unions several accessors into one tree.
//!
//! ## Overview
//!
//! A [`MountFileSystemAccessor`] is built over a root accessor (usually a
//! [`VirtualFilesystemAccessor`]) and grafts other accessors onto it:
//!
//! ```text
//! /                 root accessor (A)
//! └── usr           ── mount: B at /
//!     └── bin       (pass-through to B:/bin)
//!         └── deep  ── mount: C at /data
//! ```
//!
//! ## Resolution
//!
//! A path is walked from the root one component at a time for as long as
//! the tree has a node for the next component. The node where the walk
//! stops names the accessor, and the request goes to
//! `node.prefix + remaining components`. The deepest mount covering a
//! path always wins.
//!
//! Resolution never fails. Errors come only from the backend accessor and
//! are returned unchanged.
//!
//! ## Listings
//!
//! Entries returned by a backend are rewritten from backend coordinates into
//! union coordinates. When the listed directory is itself a node of the
//! tree, each child mount the backend did not already report is added by
//! stat-ing the child mount's own root, so mount points show up as ordinary
//! directories. A child mount that fails to stat is left out of the listing.
//!
//! [`VirtualFilesystemAccessor`]: crate::VirtualFilesystemAccessor

use std::collections::HashSet;
use std::sync::Arc;
use std::time::SystemTime;

use serde_json::{Map, Value};

use crate::{
    AccessorDescriptor, AccessorError, FileInfo, FileSystemAccessor, FileType, OSPath,
    Permissions, ReadSeek, Scope,
};

#[derive(Clone)]
struct MountNode {
    name: String,
    /// Position in the union tree.
    path: OSPath,
    /// Path to request from `accessor`.
    prefix: OSPath,
    accessor: Arc<dyn FileSystemAccessor>,
    /// Index of the nearest mount point at or above this node.
    last_mount_point: usize,
    children: Vec<usize>,
}

/// Index arena; the root is always node 0.
#[derive(Clone)]
struct MountTree {
    nodes: Vec<MountNode>,
}

struct Resolved {
    node: usize,
    backend_path: OSPath,
    exact: bool,
}

impl MountTree {
    fn child(&self, parent: usize, name: &str) -> Option<usize> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&idx| self.nodes[idx].name == name)
    }

    fn make_child(&mut self, parent: usize, name: &str) -> usize {
        let idx = self.nodes.len();
        let p = &self.nodes[parent];
        let node = MountNode {
            name: name.to_string(),
            path: p.path.append([name]),
            prefix: p.prefix.append([name]),
            accessor: Arc::clone(&p.accessor),
            last_mount_point: p.last_mount_point,
            children: Vec::new(),
        };
        self.nodes.push(node);
        self.nodes[parent].children.push(idx);
        idx
    }

    fn is_mount_point(&self, idx: usize) -> bool {
        self.nodes[idx].last_mount_point == idx
    }

    /// Re-derive pass-through descendants of `idx` after it became a mount.
    fn propagate(&mut self, idx: usize) {
        let children = self.nodes[idx].children.clone();
        for child in children {
            if self.is_mount_point(child) {
                continue;
            }
            let parent = &self.nodes[idx];
            let name = self.nodes[child].name.clone();
            let prefix = parent.prefix.append([&name]);
            let accessor = Arc::clone(&parent.accessor);
            let last_mount_point = parent.last_mount_point;

            let node = &mut self.nodes[child];
            node.prefix = prefix;
            node.accessor = accessor;
            node.last_mount_point = last_mount_point;
            self.propagate(child);
        }
    }

    fn resolve(&self, path: &OSPath) -> Resolved {
        let components = path.components();
        let mut node = 0;
        for (i, c) in components.iter().enumerate() {
            match self.child(node, c) {
                Some(child) => node = child,
                None => {
                    return Resolved {
                        node,
                        backend_path: self.nodes[node].prefix.append(&components[i..]),
                        exact: false,
                    };
                }
            }
        }
        Resolved {
            node,
            backend_path: self.nodes[node].prefix.clone(),
            exact: true,
        }
    }
}

/// The result of resolving a union path.
#[derive(Clone)]
pub struct MountResolution {
    /// Union path of the mount point serving the request.
    pub mount_point: OSPath,
    /// Path handed to the backend.
    pub backend_path: OSPath,
    /// Backend accessor.
    pub accessor: Arc<dyn FileSystemAccessor>,
}

/// A union of accessors mounted into one tree.
///
/// Cloning is cheap; clones share the tree until one of them adds a
/// mapping.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use vfs_accessors::{FileSystemAccessor, MountFileSystemAccessor, OSPath, PathType,
///     VirtualFileInfo, VirtualFilesystemAccessor};
///
/// let root = OSPath::empty(PathType::Linux);
/// let base = VirtualFilesystemAccessor::new(root.clone());
/// base.set_virtual_directory(&root.append(["mnt"])).unwrap();
///
/// let data = VirtualFilesystemAccessor::new(root.clone());
/// data.set_virtual_file_info(VirtualFileInfo::file(root.append(["report.txt"]), "ok")).unwrap();
///
/// let mut mount = MountFileSystemAccessor::new(root.clone(), Arc::new(base));
/// mount.add_mapping(root.clone(), root.append(["mnt"]), Arc::new(data));
///
/// let info = mount.lstat("/mnt/report.txt").unwrap();
/// assert_eq!(info.full_path(), "/mnt/report.txt");
/// ```
#[derive(Clone)]
pub struct MountFileSystemAccessor {
    root_path: OSPath,
    tree: Arc<MountTree>,
}

impl MountFileSystemAccessor {
    /// A union with only `root` mounted at `root_path`.
    pub fn new(root_path: OSPath, root: Arc<dyn FileSystemAccessor>) -> Self {
        let root_path = root_path.clear();
        let node = MountNode {
            name: String::new(),
            path: root_path.clone(),
            prefix: root_path.clone(),
            accessor: root,
            last_mount_point: 0,
            children: Vec::new(),
        };
        Self {
            root_path,
            tree: Arc::new(MountTree { nodes: vec![node] }),
        }
    }

    /// Mount `source_path` of `source_accessor` at `target_path`.
    ///
    /// Missing nodes along `target_path` are created as pass-throughs to the
    /// nearest mount above them. The target should already exist in the
    /// containing accessor so the mount point appears in listings.
    pub fn add_mapping(
        &mut self,
        source_path: OSPath,
        target_path: OSPath,
        source_accessor: Arc<dyn FileSystemAccessor>,
    ) {
        tracing::debug!(
            source = %source_path,
            target = %target_path,
            "installing mount point"
        );

        let tree = Arc::make_mut(&mut self.tree);
        let mut node = 0;
        for c in target_path.components() {
            node = match tree.child(node, c) {
                Some(child) => child,
                None => tree.make_child(node, c),
            };
        }

        let mount = &mut tree.nodes[node];
        mount.prefix = source_path;
        mount.accessor = source_accessor;
        mount.last_mount_point = node;
        tree.propagate(node);
    }

    /// Find the accessor and backend path serving `path`.
    pub fn resolve(&self, path: &OSPath) -> MountResolution {
        let resolved = self.tree.resolve(path);
        let node = &self.tree.nodes[resolved.node];
        MountResolution {
            mount_point: self.tree.nodes[node.last_mount_point].path.clone(),
            backend_path: resolved.backend_path,
            accessor: Arc::clone(&node.accessor),
        }
    }

    /// Union paths of every explicit mount point, root first.
    pub fn mount_points(&self) -> Vec<OSPath> {
        (0..self.tree.nodes.len())
            .filter(|&idx| self.tree.is_mount_point(idx))
            .map(|idx| self.tree.nodes[idx].path.clone())
            .collect()
    }

    fn wrap(&self, node: usize, info: Box<dyn FileInfo>) -> Box<dyn FileInfo> {
        let node = &self.tree.nodes[node];
        let relative = info.os_path().trim(&node.prefix);
        let path = node.path.append(relative.components());
        Box::new(MountFileInfo { inner: info, path })
    }
}

impl FileSystemAccessor for MountFileSystemAccessor {
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
        let resolved = self.tree.resolve(path);
        let node = &self.tree.nodes[resolved.node];
        tracing::trace!(
            path = %path,
            backend_path = %resolved.backend_path,
            "resolved listing"
        );

        let children = node.accessor.read_dir_with_os_path(&resolved.backend_path)?;
        let mut seen = HashSet::with_capacity(children.len());
        let mut result = Vec::with_capacity(children.len() + node.children.len());
        for child in children {
            let wrapped = self.wrap(resolved.node, child);
            seen.insert(wrapped.name());
            result.push(wrapped);
        }

        if !resolved.exact {
            return Ok(result);
        }

        for &idx in &node.children {
            let mount = &self.tree.nodes[idx];
            if seen.contains(&mount.name) {
                continue;
            }
            match mount.accessor.lstat_with_os_path(&mount.prefix) {
                Ok(info) => {
                    seen.insert(mount.name.clone());
                    result.push(Box::new(MountFileInfo {
                        inner: info,
                        path: mount.path.clone(),
                    }));
                }
                Err(error) => {
                    tracing::debug!(
                        mount = %mount.path,
                        %error,
                        "skipping child mount that failed to stat"
                    );
                }
            }
        }

        Ok(result)
    }

    fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
        let resolved = self.tree.resolve(path);
        let node = &self.tree.nodes[resolved.node];
        tracing::trace!(path = %path, backend_path = %resolved.backend_path, "resolved open");
        node.accessor.open_with_os_path(&resolved.backend_path)
    }

    fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
        let resolved = self.tree.resolve(path);
        let node = &self.tree.nodes[resolved.node];
        let info = node.accessor.lstat_with_os_path(&resolved.backend_path)?;
        Ok(self.wrap(resolved.node, info))
    }

    /// Asks the backend serving `path`, with the backend path.
    fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
        let resolved = self.tree.resolve(path);
        let node = &self.tree.nodes[resolved.node];
        node.accessor
            .get_underlying_api_filename(&resolved.backend_path)
    }

    fn describe(&self) -> AccessorDescriptor {
        AccessorDescriptor::new("mount", "A union of mounted accessors")
    }
}

/// A backend entry rewritten into union coordinates.
///
/// Only the name and path change; everything else comes from the backend.
#[derive(Debug)]
pub struct MountFileInfo {
    inner: Box<dyn FileInfo>,
    path: OSPath,
}

impl MountFileInfo {
    /// The backend's own entry.
    pub fn inner(&self) -> &dyn FileInfo {
        self.inner.as_ref()
    }
}

impl FileInfo for MountFileInfo {
    fn name(&self) -> String {
        match self.path.basename() {
            "" => self.inner.name(),
            name => name.to_string(),
        }
    }

    fn os_path(&self) -> &OSPath {
        &self.path
    }

    fn file_type(&self) -> FileType {
        self.inner.file_type()
    }

    fn size(&self) -> u64 {
        self.inner.size()
    }

    fn permissions(&self) -> Permissions {
        self.inner.permissions()
    }

    fn mtime(&self) -> SystemTime {
        self.inner.mtime()
    }

    fn atime(&self) -> SystemTime {
        self.inner.atime()
    }

    fn ctime(&self) -> SystemTime {
        self.inner.ctime()
    }

    fn btime(&self) -> SystemTime {
        self.inner.btime()
    }

    fn data(&self) -> Map<String, Value> {
        self.inner.data()
    }

    fn is_link(&self) -> bool {
        self.inner.is_link()
    }

    fn get_link(&self) -> Result<OSPath, AccessorError> {
        self.inner.get_link()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathType, VirtualFileInfo, VirtualFilesystemAccessor};
    use pretty_assertions::assert_eq;

    fn root() -> OSPath {
        OSPath::empty(PathType::Linux)
    }

    fn linux(path: &str) -> OSPath {
        OSPath::parse(PathType::Linux, path).unwrap()
    }

    fn tree(entries: &[&str]) -> Arc<VirtualFilesystemAccessor> {
        let vfs = VirtualFilesystemAccessor::new(root());
        for entry in entries {
            if let Some(dir) = entry.strip_suffix('/') {
                vfs.set_virtual_directory(&linux(dir)).unwrap();
            } else {
                vfs.set_virtual_file_info(VirtualFileInfo::file(linux(entry), *entry))
                    .unwrap();
            }
        }
        Arc::new(vfs)
    }

    fn names(infos: &[Box<dyn FileInfo>]) -> Vec<String> {
        let mut names: Vec<String> = infos.iter().map(|i| i.name()).collect();
        names.sort();
        names
    }

    #[test]
    fn longest_prefix_wins() {
        let mut mount = MountFileSystemAccessor::new(root(), tree(&["/usr/"]));
        mount.add_mapping(root(), linux("/usr"), tree(&[]));
        mount.add_mapping(linux("/data"), linux("/usr/bin/deep"), tree(&[]));

        let deep = mount.resolve(&linux("/usr/bin/deep/x/y"));
        assert_eq!(deep.mount_point, linux("/usr/bin/deep"));
        assert_eq!(deep.backend_path, linux("/data/x/y"));

        let usr = mount.resolve(&linux("/usr/other"));
        assert_eq!(usr.mount_point, linux("/usr"));
        assert_eq!(usr.backend_path, linux("/other"));

        let root_res = mount.resolve(&linux("/etc/passwd"));
        assert_eq!(root_res.mount_point, root());
        assert_eq!(root_res.backend_path, linux("/etc/passwd"));
    }

    #[test]
    fn shallower_mount_added_later_reaches_pass_through_nodes() {
        let mut mount = MountFileSystemAccessor::new(root(), tree(&[]));
        mount.add_mapping(linux("/data"), linux("/usr/bin/deep"), tree(&[]));
        mount.add_mapping(linux("/b"), linux("/usr"), tree(&[]));

        let bin = mount.resolve(&linux("/usr/bin/ls"));
        assert_eq!(bin.mount_point, linux("/usr"));
        assert_eq!(bin.backend_path, linux("/b/bin/ls"));

        let deep = mount.resolve(&linux("/usr/bin/deep/x"));
        assert_eq!(deep.backend_path, linux("/data/x"));
    }

    #[test]
    fn entries_are_rewritten_into_union_coordinates() {
        let backend = tree(&["/srv/www/index.html"]);
        let mut mount = MountFileSystemAccessor::new(root(), tree(&["/web/"]));
        mount.add_mapping(linux("/srv/www"), linux("/web"), backend);

        let listing = mount.read_dir("/web").unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].full_path(), "/web/index.html");
        assert_eq!(listing[0].name(), "index.html");

        let info = mount.lstat("/web/index.html").unwrap();
        assert_eq!(info.full_path(), "/web/index.html");
        assert_eq!(info.size(), "/srv/www/index.html".len() as u64);
    }

    #[test]
    fn listing_merges_child_mounts_once() {
        // The root already reports "mnt"; "extra" exists only as a mount.
        let mut mount = MountFileSystemAccessor::new(root(), tree(&["/mnt/", "/etc/"]));
        mount.add_mapping(root(), linux("/mnt"), tree(&["/a"]));
        mount.add_mapping(root(), linux("/extra"), tree(&["/b"]));

        let listing = mount.read_dir("/").unwrap();
        assert_eq!(names(&listing), ["etc", "extra", "mnt"]);

        let extra = listing.iter().find(|i| i.name() == "extra").unwrap();
        assert!(extra.is_dir());
        assert_eq!(extra.full_path(), "/extra");
    }

    #[test]
    fn failed_child_mount_is_skipped() {
        let mut mount = MountFileSystemAccessor::new(root(), tree(&["/etc/"]));
        mount.add_mapping(linux("/missing"), linux("/gone"), tree(&[]));

        let listing = mount.read_dir("/").unwrap();
        assert_eq!(names(&listing), ["etc"]);
    }

    #[test]
    fn backend_errors_pass_through() {
        let mut mount = MountFileSystemAccessor::new(root(), tree(&[]));
        mount.add_mapping(root(), linux("/mnt"), tree(&["/file"]));

        assert!(mount.read_dir("/mnt/nope").err().unwrap().is_not_found());
        assert!(matches!(
            mount.read_dir("/mnt/file").err().unwrap(),
            AccessorError::NotADirectory { ref path } if path == "/file"
        ));
    }

    #[test]
    fn clones_are_copy_on_write() {
        let mut first = MountFileSystemAccessor::new(root(), tree(&[]));
        let snapshot = first.clone();
        first.add_mapping(root(), linux("/mnt"), tree(&[]));

        assert_eq!(first.mount_points(), [root(), linux("/mnt")]);
        assert_eq!(snapshot.mount_points(), [root()]);
    }

    /// A tree whose entries live under `/host` on the real disk.
    struct HostTree(Arc<VirtualFilesystemAccessor>);

    impl FileSystemAccessor for HostTree {
        fn new_instance(&self, _: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
            Ok(Arc::new(HostTree(Arc::clone(&self.0))))
        }

        fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
            self.0.parse_path(path)
        }

        fn read_dir_with_os_path(
            &self,
            path: &OSPath,
        ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
            self.0.read_dir_with_os_path(path)
        }

        fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
            self.0.open_with_os_path(path)
        }

        fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
            self.0.lstat_with_os_path(path)
        }

        fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
            Ok(format!("/host{path}"))
        }
    }

    #[test]
    fn underlying_filename_comes_from_the_serving_backend() {
        let mut mount = MountFileSystemAccessor::new(root(), tree(&["/mnt/"]));
        mount.add_mapping(linux("/data"), linux("/mnt"), Arc::new(HostTree(tree(&[]))));

        assert_eq!(
            mount
                .get_underlying_api_filename(&linux("/mnt/logs/syslog"))
                .unwrap(),
            "/host/data/logs/syslog"
        );
        assert!(matches!(
            mount.get_underlying_api_filename(&linux("/etc/passwd")).unwrap_err(),
            AccessorError::NotRawFileSystem { ref accessor } if accessor == "vfs"
        ));
    }
}
