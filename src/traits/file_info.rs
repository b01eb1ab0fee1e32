//! Directory entries and stat results.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::types::system_time_serde;
use crate::{AccessorError, FileType, OSPath, Permissions};

/// A single directory entry or stat result.
///
/// Timestamps a backend does not track report the Unix epoch.
pub trait FileInfo: Send + Sync + fmt::Debug {
    /// Base name of the entry.
    fn name(&self) -> String;

    /// Location of the entry in the accessor's namespace.
    fn os_path(&self) -> &OSPath;

    /// Serialized form of [`os_path`](Self::os_path).
    fn full_path(&self) -> String {
        self.os_path().to_string()
    }

    /// Entry type.
    fn file_type(&self) -> FileType;

    /// Size in bytes. Zero for directories.
    fn size(&self) -> u64;

    /// Permission bits.
    fn permissions(&self) -> Permissions {
        match self.file_type() {
            FileType::Directory => Permissions::default_dir(),
            _ => Permissions::default_file(),
        }
    }

    /// Modification time.
    fn mtime(&self) -> SystemTime {
        UNIX_EPOCH
    }

    /// Same as [`mtime`](Self::mtime).
    fn mod_time(&self) -> SystemTime {
        self.mtime()
    }

    /// Access time.
    fn atime(&self) -> SystemTime {
        UNIX_EPOCH
    }

    /// Inode change time.
    fn ctime(&self) -> SystemTime {
        UNIX_EPOCH
    }

    /// Birth time.
    fn btime(&self) -> SystemTime {
        UNIX_EPOCH
    }

    /// Free-form backend metadata.
    fn data(&self) -> Map<String, Value> {
        Map::new()
    }

    /// Returns `true` for directories.
    fn is_dir(&self) -> bool {
        self.file_type() == FileType::Directory
    }

    /// Returns `true` for symbolic links.
    fn is_link(&self) -> bool {
        self.file_type() == FileType::Symlink
    }

    /// Target of a symbolic link.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::NotALink`] if the entry is not a link
    fn get_link(&self) -> Result<OSPath, AccessorError> {
        Err(AccessorError::NotALink {
            path: self.full_path(),
        })
    }

    /// `ls -l` style mode string, e.g. `drwxr-xr-x`.
    fn mode(&self) -> String {
        mode_string(self.file_type(), self.permissions())
    }
}

fn mode_string(file_type: FileType, permissions: Permissions) -> String {
    let mut out = String::with_capacity(10);
    out.push(match file_type {
        FileType::Directory => 'd',
        FileType::Symlink => 'L',
        FileType::File => '-',
    });
    let mode = permissions.mode();
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// A serializable snapshot of a [`FileInfo`].
///
/// Used when listings leave the accessor layer, for example as query rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileInfoRecord {
    /// Base name.
    pub name: String,
    /// Serialized path.
    pub full_path: String,
    /// Size in bytes.
    pub size: u64,
    /// Mode string.
    pub mode: String,
    /// Directory flag.
    pub is_dir: bool,
    /// Symlink flag.
    pub is_link: bool,
    /// Modification time.
    #[serde(with = "system_time_serde")]
    pub mtime: SystemTime,
    /// Access time.
    #[serde(with = "system_time_serde")]
    pub atime: SystemTime,
    /// Change time.
    #[serde(with = "system_time_serde")]
    pub ctime: SystemTime,
    /// Birth time.
    #[serde(with = "system_time_serde")]
    pub btime: SystemTime,
    /// Backend metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub data: Map<String, Value>,
}

impl<T: FileInfo + ?Sized> From<&T> for FileInfoRecord {
    fn from(info: &T) -> Self {
        Self {
            name: info.name(),
            full_path: info.full_path(),
            size: info.size(),
            mode: info.mode(),
            is_dir: info.is_dir(),
            is_link: info.is_link(),
            mtime: info.mtime(),
            atime: info.atime(),
            ctime: info.ctime(),
            btime: info.btime(),
            data: info.data(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_strings() {
        assert_eq!(
            mode_string(FileType::Directory, Permissions::default_dir()),
            "drwxr-xr-x"
        );
        assert_eq!(
            mode_string(FileType::File, Permissions::from_mode(0o640)),
            "-rw-r-----"
        );
    }

    #[test]
    fn file_info_is_object_safe() {
        fn _check(_: &dyn FileInfo) {}
    }
}
