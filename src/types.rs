//! Core types shared by accessors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AccessorError;

/// Type of a filesystem entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Symbolic link.
    Symlink,
}

/// Unix-style permissions stored as a mode bitmask.
///
/// Uses the standard Unix permission bits (rwxrwxrwx).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permissions(u32);

impl Permissions {
    /// Create permissions from a Unix mode (e.g., 0o755).
    #[inline]
    pub const fn from_mode(mode: u32) -> Self {
        Self(mode & 0o7777)
    }

    /// Get the raw mode value.
    #[inline]
    pub const fn mode(&self) -> u32 {
        self.0
    }

    /// Returns `true` if these permissions deny writing.
    #[inline]
    pub const fn readonly(&self) -> bool {
        (self.0 & 0o222) == 0
    }

    /// Default permissions for a file (0o644 = rw-r--r--).
    #[inline]
    pub const fn default_file() -> Self {
        Self(0o644)
    }

    /// Default permissions for a directory (0o755 = rwxr-xr-x).
    #[inline]
    pub const fn default_dir() -> Self {
        Self(0o755)
    }
}

impl Default for Permissions {
    fn default() -> Self {
        Self::default_file()
    }
}

/// Describes an accessor for listings and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorDescriptor {
    /// The scheme name the accessor is registered under.
    pub name: String,
    /// Human readable description.
    pub description: String,
    /// Name of the scope variable that configures this accessor, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_var: Option<String>,
}

impl AccessorDescriptor {
    /// Create a descriptor with a name and description.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            scope_var: None,
        }
    }
}

/// The path syntaxes an [`OSPath`](crate::OSPath) can be bound to.
///
/// Configuration selects a syntax by its lowercase name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathType {
    /// Accepts `/` and `\`, serializes with `/`.
    #[default]
    Generic,
    /// POSIX paths.
    Linux,
    /// Windows drive and device paths.
    Windows,
    /// Raw NTFS device paths.
    Ntfs,
    /// Windows registry keys.
    Registry,
    /// Opaque, non-hierarchical PathSpec.
    #[serde(rename = "pathspec")]
    PathSpec,
    /// Paths inside a collector zip.
    Zip,
}

impl PathType {
    /// The configuration name of this syntax.
    pub fn as_str(&self) -> &'static str {
        match self {
            PathType::Generic => "generic",
            PathType::Linux => "linux",
            PathType::Windows => "windows",
            PathType::Ntfs => "ntfs",
            PathType::Registry => "registry",
            PathType::PathSpec => "pathspec",
            PathType::Zip => "zip",
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PathType {
    type Err = AccessorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "" | "generic" => Ok(PathType::Generic),
            "linux" => Ok(PathType::Linux),
            "windows" => Ok(PathType::Windows),
            "ntfs" => Ok(PathType::Ntfs),
            "registry" => Ok(PathType::Registry),
            "pathspec" => Ok(PathType::PathSpec),
            "zip" => Ok(PathType::Zip),
            other => Err(AccessorError::Deserialization(format!(
                "unknown path type: {other}"
            ))),
        }
    }
}

/// Serde support for SystemTime as `(secs, nanos)` since the epoch.
pub(crate) mod system_time_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    pub fn serialize<S>(time: &SystemTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let duration = time.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        (duration.as_secs(), duration.subsec_nanos()).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SystemTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (secs, nanos): (u64, u32) = Deserialize::deserialize(deserializer)?;
        Ok(UNIX_EPOCH + Duration::new(secs, nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_equality() {
        assert_eq!(FileType::File, FileType::File);
        assert_ne!(FileType::File, FileType::Directory);
    }

    #[test]
    fn permissions_from_mode_masks_extra_bits() {
        let p = Permissions::from_mode(0o100755);
        assert_eq!(p.mode(), 0o755);
    }

    #[test]
    fn permissions_readonly() {
        assert!(Permissions::from_mode(0o444).readonly());
        assert!(!Permissions::from_mode(0o644).readonly());
    }

    #[test]
    fn permissions_defaults() {
        assert_eq!(Permissions::default_file().mode(), 0o644);
        assert_eq!(Permissions::default_dir().mode(), 0o755);
    }

    #[test]
    fn path_type_from_str() {
        assert_eq!("".parse::<PathType>().unwrap(), PathType::Generic);
        assert_eq!("Windows".parse::<PathType>().unwrap(), PathType::Windows);
        assert_eq!("pathspec".parse::<PathType>().unwrap(), PathType::PathSpec);
        assert!("ext4".parse::<PathType>().is_err());
    }

    #[test]
    fn path_type_serde_names() {
        let t: PathType = serde_json::from_str("\"ntfs\"").unwrap();
        assert_eq!(t, PathType::Ntfs);
        assert_eq!(
            serde_json::to_string(&PathType::PathSpec).unwrap(),
            "\"pathspec\""
        );
    }

    #[test]
    fn descriptor_omits_missing_scope_var() {
        let desc = AccessorDescriptor::new("vfs", "In memory tree");
        let json = serde_json::to_string(&desc).unwrap();
        assert_eq!(json, r#"{"name":"vfs","description":"In memory tree"}"#);
    }

    #[test]
    fn types_are_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FileType>();
        assert_send_sync::<Permissions>();
        assert_send_sync::<AccessorDescriptor>();
        assert_send_sync::<PathType>();
    }
}
