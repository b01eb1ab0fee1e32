//! # Layer Trait
//!
//! Tower-style wrapping for accessors.
//!
//! ## Overview
//!
//! A [`Layer`] wraps an accessor to change or add behaviour without
//! touching the accessor itself:
//!
//! ```text
//! Accessor ──▶ Layer::layer() ──▶ Wrapped Accessor
//! ```
//!
//! [`DescribeLayer`] is the layer the registry uses most: it attaches an
//! [`AccessorDescriptor`] to any accessor, for example the mount accessor
//! installed by remapping.
//!
//! ## Fluent Composition
//!
//! [`LayerExt`] adds `.layer()` to every accessor:
//!
//! ```rust
//! use vfs_accessors::{AccessorDescriptor, DescribeLayer, FileSystemAccessor, LayerExt,
//!     OSPath, PathType, VirtualFilesystemAccessor};
//!
//! let described = VirtualFilesystemAccessor::new(OSPath::empty(PathType::Linux))
//!     .layer(DescribeLayer::new(AccessorDescriptor::new("scratch", "Scratch space")));
//! assert_eq!(described.describe().name, "scratch");
//! ```

use std::sync::Arc;

use crate::{
    AccessorDescriptor, AccessorError, FileInfo, FileSystemAccessor, OSPath, ReadSeek, Scope,
};

/// A layer that wraps an accessor.
///
/// `layer(self, accessor)` consumes both the layer and the accessor.
pub trait Layer<A> {
    /// The wrapped accessor type.
    type Accessor;

    /// Wrap `accessor`.
    fn layer(self, accessor: A) -> Self::Accessor;
}

/// Extension trait providing `.layer()` on every accessor.
pub trait LayerExt: FileSystemAccessor + Sized {
    /// Apply a layer to this accessor.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Accessor {
        layer.layer(self)
    }
}

impl<A: FileSystemAccessor> LayerExt for A {}

/// Attaches a fixed [`AccessorDescriptor`] to an accessor.
#[derive(Debug, Clone)]
pub struct DescribeLayer {
    descriptor: AccessorDescriptor,
}

impl DescribeLayer {
    /// A layer reporting `descriptor`.
    pub fn new(descriptor: AccessorDescriptor) -> Self {
        Self { descriptor }
    }
}

impl<A: FileSystemAccessor + 'static> Layer<A> for DescribeLayer {
    type Accessor = DescribedAccessor;

    fn layer(self, accessor: A) -> DescribedAccessor {
        DescribedAccessor {
            inner: Arc::new(accessor),
            descriptor: self.descriptor,
        }
    }
}

/// An accessor with an attached descriptor.
///
/// Scope binding keeps the descriptor: `new_instance` wraps the inner
/// accessor's instance again.
#[derive(Clone)]
pub struct DescribedAccessor {
    inner: Arc<dyn FileSystemAccessor>,
    descriptor: AccessorDescriptor,
}

impl DescribedAccessor {
    /// Attach `descriptor` to an already shared accessor.
    pub fn new(inner: Arc<dyn FileSystemAccessor>, descriptor: AccessorDescriptor) -> Self {
        Self { inner, descriptor }
    }
}

impl FileSystemAccessor for DescribedAccessor {
    fn new_instance(&self, scope: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        let inner = self.inner.new_instance(scope)?;
        Ok(Arc::new(DescribedAccessor {
            inner,
            descriptor: self.descriptor.clone(),
        }))
    }

    fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
        self.inner.parse_path(path)
    }

    fn read_dir_with_os_path(
        &self,
        path: &OSPath,
    ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        self.inner.read_dir_with_os_path(path)
    }

    fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
        self.inner.open_with_os_path(path)
    }

    fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
        self.inner.lstat_with_os_path(path)
    }

    fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
        self.inner.get_underlying_api_filename(path)
    }

    fn get_canonical_filename(&self, path: &OSPath) -> String {
        self.inner.get_canonical_filename(path)
    }

    fn describe(&self) -> AccessorDescriptor {
        self.descriptor.clone()
    }
}
