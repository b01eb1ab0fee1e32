//! The accessor capability contract.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek, SeekFrom};
use std::sync::Arc;

use crate::{AccessorDescriptor, AccessorError, FileInfo, OSPath, Scope};

/// A readable, seekable byte stream returned by [`FileSystemAccessor::open`].
///
/// The stream is closed when dropped.
///
/// Some streams implement `Seek` but can not really be rewound, for example
/// a decompressor that restarts from the beginning on every backwards seek.
/// They report it through [`is_seekable`](Self::is_seekable) so callers can
/// decide before reading whether to buffer.
pub trait ReadSeek: Read + Seek + Send {
    /// Returns `true` if seeking backwards is cheap and reliable.
    fn is_seekable(&self) -> bool {
        true
    }
}

impl<T: AsRef<[u8]> + Send> ReadSeek for Cursor<T> {}

impl ReadSeek for File {}

impl<R: ReadSeek> ReadSeek for BufReader<R> {
    fn is_seekable(&self) -> bool {
        self.get_ref().is_seekable()
    }
}

impl<R: ReadSeek + ?Sized> ReadSeek for Box<R> {
    fn is_seekable(&self) -> bool {
        (**self).is_seekable()
    }
}

/// Wraps a stream that only supports reading forward.
///
/// Reads and seeks pass through; [`is_seekable`](ReadSeek::is_seekable)
/// reports `false`.
#[derive(Debug)]
pub struct ForwardOnly<R>(pub R);

impl<R: Read> Read for ForwardOnly<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Seek> Seek for ForwardOnly<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.0.seek(pos)
    }
}

impl<R: Read + Seek + Send> ReadSeek for ForwardOnly<R> {
    fn is_seekable(&self) -> bool {
        false
    }
}

/// A filesystem-like store addressed by [`OSPath`].
///
/// The registry holds accessors as *prototypes*. A query gets its own
/// instance from [`new_instance`](Self::new_instance), which may hold
/// per-query caches or consult the [`Scope`] for configuration.
///
/// The `*_with_os_path` methods are authoritative. The string variants
/// parse with [`parse_path`](Self::parse_path) and delegate; backends only
/// override them when they can do something cheaper.
///
/// # Thread Safety
///
/// Accessors are shared between concurrently running queries, so they must
/// be `Send + Sync`. Methods take `&self`.
///
/// # Object Safety
///
/// This trait is object-safe; the registry stores `Arc<dyn FileSystemAccessor>`.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use vfs_accessors::{
///     AccessorError, FileInfo, FileSystemAccessor, OSPath, PathType, ReadSeek, Scope,
/// };
///
/// struct Empty;
///
/// impl FileSystemAccessor for Empty {
///     fn new_instance(&self, _: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
///         Ok(Arc::new(Empty))
///     }
///     fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
///         OSPath::parse(PathType::Linux, path)
///     }
///     fn read_dir_with_os_path(&self, _: &OSPath) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
///         Ok(Vec::new())
///     }
///     fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
///         Err(AccessorError::NotFound { path: path.to_string() })
///     }
///     fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
///         Err(AccessorError::NotFound { path: path.to_string() })
///     }
/// }
///
/// assert!(Empty.read_dir("/").unwrap().is_empty());
/// ```
pub trait FileSystemAccessor: Send + Sync {
    /// Bind this prototype to a query scope.
    ///
    /// May enforce access checks; the error propagates to the caller of
    /// `get_accessor` unchanged.
    fn new_instance(&self, scope: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError>;

    /// Parse a serialized path with this accessor's path syntax.
    fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError>;

    /// List a directory.
    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        let path = self.parse_path(path)?;
        self.read_dir_with_os_path(&path)
    }

    /// List a directory.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotFound`] if the path does not exist
    /// - [`AccessorError::NotADirectory`] if the path is not a directory
    fn read_dir_with_os_path(&self, path: &OSPath)
    -> Result<Vec<Box<dyn FileInfo>>, AccessorError>;

    /// Open a file for reading.
    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>, AccessorError> {
        let path = self.parse_path(path)?;
        self.open_with_os_path(&path)
    }

    /// Open a file for reading.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotFound`] if the path does not exist
    /// - [`AccessorError::NotAFile`] if the path is a directory
    fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError>;

    /// Stat a path without following a final symlink.
    fn lstat(&self, path: &str) -> Result<Box<dyn FileInfo>, AccessorError> {
        let path = self.parse_path(path)?;
        self.lstat_with_os_path(&path)
    }

    /// Stat a path without following a final symlink.
    fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError>;

    /// The name the OS knows `path` by, for callers that want to hand the
    /// file to an OS API directly.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotRawFileSystem`] unless the accessor maps paths
    ///   onto real files
    fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
        let _ = path;
        Err(AccessorError::NotRawFileSystem {
            accessor: self.describe().name,
        })
    }

    /// The form of `path` used for comparisons.
    ///
    /// Case-insensitive stores return a folded or on-disk spelling so that
    /// two spellings of one file compare equal. Defaults to the serialized
    /// path.
    fn get_canonical_filename(&self, path: &OSPath) -> String {
        path.to_string()
    }

    /// Describe this accessor. Undescribed accessors return an empty
    /// descriptor; the registry fills in the name it was registered under.
    fn describe(&self) -> AccessorDescriptor {
        AccessorDescriptor::default()
    }
}

impl<T: FileSystemAccessor + ?Sized> FileSystemAccessor for Arc<T> {
    fn new_instance(&self, scope: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        (**self).new_instance(scope)
    }

    fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
        (**self).parse_path(path)
    }

    fn read_dir(&self, path: &str) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        (**self).read_dir(path)
    }

    fn read_dir_with_os_path(
        &self,
        path: &OSPath,
    ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        (**self).read_dir_with_os_path(path)
    }

    fn open(&self, path: &str) -> Result<Box<dyn ReadSeek>, AccessorError> {
        (**self).open(path)
    }

    fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
        (**self).open_with_os_path(path)
    }

    fn lstat(&self, path: &str) -> Result<Box<dyn FileInfo>, AccessorError> {
        (**self).lstat(path)
    }

    fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
        (**self).lstat_with_os_path(path)
    }

    fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
        (**self).get_underlying_api_filename(path)
    }

    fn get_canonical_filename(&self, path: &OSPath) -> String {
        (**self).get_canonical_filename(path)
    }

    fn describe(&self) -> AccessorDescriptor {
        (**self).describe()
    }
}
