//! # vfs-accessors
//!
//! A uniform path and accessor layer over **heterogeneous filesystem
//! backends**: OS filesystems, registries, archives, raw devices and
//! in-memory trees, addressed the same way and composable into union mounts.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use vfs_accessors::{AccessorExt, FileSystemAccessor, MountFileSystemAccessor, OSPath,
//!     PathType, VirtualFileInfo, VirtualFilesystemAccessor};
//!
//! let root = OSPath::empty(PathType::Linux);
//! let base = VirtualFilesystemAccessor::new(root.clone());
//! base.set_virtual_directory(&root.append(["mnt"])).unwrap();
//!
//! let image = VirtualFilesystemAccessor::new(root.clone());
//! image
//!     .set_virtual_file_info(VirtualFileInfo::file(root.append(["hosts"]), "127.0.0.1 localhost"))
//!     .unwrap();
//!
//! let mut union = MountFileSystemAccessor::new(root.clone(), Arc::new(base));
//! union.add_mapping(root.clone(), root.append(["mnt"]), Arc::new(image));
//!
//! assert_eq!(union.read_to_string("/mnt/hosts").unwrap(), "127.0.0.1 localhost");
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`OSPath`] | Component list bound to a path syntax, plus an optional [`PathSpec`] |
//! | [`PathManipulator`] | Parses and serializes one path syntax |
//! | [`PathSpec`] | JSON path descriptor naming a delegate accessor and path |
//! | [`FileSystemAccessor`] | Read-only backend capability: list, open, stat |
//! | [`FileInfo`] | Metadata for one entry returned by an accessor |
//! | [`DeviceManager`] | Name → accessor registry, copyable per query |
//! | [`Scope`] | Per-query context accessors are bound to |
//! | [`VirtualFilesystemAccessor`] | In-memory tree of synthetic entries |
//! | [`MountFileSystemAccessor`] | Union of accessors, longest prefix wins |
//! | [`AccessorError`] | Error type with context |
//!
//! ---
//!
//! ## Path Syntaxes
//!
//! | [`PathType`] | Example |
//! |--------------|---------|
//! | `generic` | `/bin/"a/b"` |
//! | `linux` | `/usr/bin/ls` |
//! | `windows` | `C:\Windows\System32` |
//! | `ntfs` | `\\.\C:\$MFT` |
//! | `registry` | `HKLM\Software\Microsoft` |
//! | `pathspec` | `{"DelegateAccessor":"file","DelegatePath":"/x.zip","Path":"a"}` |
//! | `zip` | `{"DelegateAccessor":"file","DelegatePath":"/x.zip","Path":"/a/C%3A"}` |
//!
//! Malformed PathSpec JSON or legacy URLs are rejected, but traversal
//! segments never survive parsing: `..` never climbs above the root, so a
//! parsed [`OSPath`] never contains `.` or `..` components.
//!
//! ---
//!
//! ## Registry and Scopes
//!
//! Accessors are registered by name in a [`DeviceManager`] and bound to a
//! [`Scope`] on lookup via [`FileSystemAccessor::new_instance`]. A scope may
//! carry its own registry, typically a [`copy`](DeviceManager::copy) of the
//! [`global`] one rewired by [`apply_remapping`], so remappings stay local
//! to one query.
//!
//! ---
//!
//! ## Error Handling
//!
//! All operations return `Result<T, AccessorError>`:
//!
//! ```rust
//! use vfs_accessors::AccessorError;
//!
//! let err = AccessorError::UnknownAccessor { name: "ntfs".into() };
//! assert_eq!(err.to_string(), "unknown accessor: ntfs");
//! ```
//!
//! ---
//!
//! ## Thread Safety
//!
//! Accessors are `Send + Sync` and methods take `&self`. Registries and the
//! in-memory tree use interior locking; the mount tree is immutable once
//! shared and copied on write.

mod device_manager;
mod error;
mod ext;
mod layer;
pub mod manipulators;
mod mount;
mod ospath;
mod pathspec;
mod prefix;
mod remapping;
mod scope;
mod traits;
mod types;
mod vfs;

// Public re-exports - error types
pub use error::AccessorError;

// Public re-exports - core types
pub use ospath::OSPath;
pub use pathspec::PathSpec;
pub use types::{AccessorDescriptor, FileType, PathType, Permissions};

// Public re-exports - path syntaxes
pub use manipulators::{
    GenericPathManipulator, LinuxPathManipulator, PathManipulator, PathSpecManipulator,
    RegistryPathManipulator, WindowsNtfsManipulator, WindowsPathManipulator, ZipPathManipulator,
};

// Public re-exports - accessor traits
pub use traits::{FileInfo, FileInfoRecord, FileSystemAccessor, ForwardOnly, ReadSeek};

// Public re-exports - registry
pub use device_manager::{
    AccessorConfig, DeniedAccessor, DeviceManager, canonical_name, get_accessor,
    get_canonical_filename, get_underlying_api_filename, global, register,
};
pub use scope::Scope;

// Public re-exports - accessors
pub use mount::{MountFileInfo, MountFileSystemAccessor, MountResolution};
pub use vfs::{VirtualFileInfo, VirtualFilesystemAccessor};

// Public re-exports - remapping
pub use remapping::{
    MountPoint, Remapping, RemappingConfig, apply_remapping, install_mount_points,
};

// Public re-exports - infrastructure
pub use ext::AccessorExt;
pub use layer::{DescribeLayer, DescribedAccessor, Layer, LayerExt};
pub use prefix::PrefixPolicy;
