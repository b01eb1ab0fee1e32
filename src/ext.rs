//! # Extension Traits
//!
//! Convenience methods for accessors.
//!
//! ## Overview
//!
//! [`AccessorExt`] provides commonly needed helpers that are not part of the
//! capability contract. They are default methods with a blanket
//! implementation, so every accessor, including `dyn FileSystemAccessor`,
//! gets them for free.
//!
//! | Method | Description |
//! |--------|-------------|
//! | [`exists`](AccessorExt::exists) | Check if a path exists |
//! | [`is_dir`](AccessorExt::is_dir) | Check if a path is a directory |
//! | [`read_all`](AccessorExt::read_all) | Read a whole file |
//! | [`read_to_string`](AccessorExt::read_to_string) | Read a whole UTF-8 file |
//! | [`read_json`](AccessorExt::read_json) | Read and deserialize a JSON file |

use std::io::Read;

use serde::de::DeserializeOwned;

use crate::{AccessorError, FileSystemAccessor};

/// Extension methods for any accessor.
///
/// # Example
///
/// ```rust
/// use vfs_accessors::{AccessorError, AccessorExt, FileSystemAccessor};
///
/// fn load_config(accessor: &dyn FileSystemAccessor) -> Result<Option<String>, AccessorError> {
///     if !accessor.exists("/etc/app.conf")? {
///         return Ok(None);
///     }
///     accessor.read_to_string("/etc/app.conf").map(Some)
/// }
/// ```
pub trait AccessorExt: FileSystemAccessor {
    /// Check if a path exists.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    /// Returns `Err` only for other failures, such as a denied accessor.
    fn exists(&self, path: &str) -> Result<bool, AccessorError> {
        match self.lstat(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Check if a path is a directory.
    ///
    /// Returns `Ok(false)` if the path doesn't exist (not an error).
    fn is_dir(&self, path: &str) -> Result<bool, AccessorError> {
        match self.lstat(path) {
            Ok(info) => Ok(info.is_dir()),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Read an entire file.
    fn read_all(&self, path: &str) -> Result<Vec<u8>, AccessorError> {
        let mut stream = self.open(path)?;
        let mut buf = Vec::new();
        stream
            .read_to_end(&mut buf)
            .map_err(|source| AccessorError::Io {
                operation: "read",
                path: path.to_string(),
                source,
            })?;
        Ok(buf)
    }

    /// Read an entire file as UTF-8.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::Deserialization`] if the file isn't valid UTF-8
    fn read_to_string(&self, path: &str) -> Result<String, AccessorError> {
        let bytes = self.read_all(path)?;
        String::from_utf8(bytes)
            .map_err(|e| AccessorError::Deserialization(format!("{path}: {e}")))
    }

    /// Read a file and deserialize it as JSON.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotFound`] if the file doesn't exist
    /// - [`AccessorError::Deserialization`] if JSON parsing failed
    fn read_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AccessorError> {
        let bytes = self.read_all(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AccessorError::Deserialization(format!("{path}: {e}")))
    }
}

impl<A: FileSystemAccessor + ?Sized> AccessorExt for A {}
