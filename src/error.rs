//! Error types for the accessor framework.

/// Accessor error type with contextual variants.
///
/// Paths are carried in their serialized form so errors stay meaningful no
/// matter which path syntax produced them. Errors raised by a delegate
/// accessor travel through the mount and delegation layers untouched.
///
/// # Examples
///
/// ```rust
/// use vfs_accessors::AccessorError;
///
/// let err = AccessorError::NotFound { path: "/missing".into() };
/// assert_eq!(err.to_string(), "not found: /missing");
/// assert!(err.is_not_found());
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AccessorError {
    // Path/File Errors
    /// Path does not exist.
    #[error("not found: {path}")]
    NotFound {
        /// The path that was not found.
        path: String,
    },

    /// Expected a file but found something else.
    #[error("not a file: {path}")]
    NotAFile {
        /// The path that is not a file.
        path: String,
    },

    /// Expected a directory but found something else.
    #[error("not a directory: {path}")]
    NotADirectory {
        /// The path that is not a directory.
        path: String,
    },

    /// The entry is not a symbolic link.
    #[error("not a link: {path}")]
    NotALink {
        /// The path that is not a link.
        path: String,
    },

    // Registry Errors
    /// No accessor is registered under this scheme.
    #[error("unknown accessor: {name}")]
    UnknownAccessor {
        /// The scheme that was looked up.
        name: String,
    },

    /// The accessor exists but was disabled by configuration.
    #[error("{operation}: accessor {accessor} denied by configuration")]
    Denied {
        /// The denied scheme.
        accessor: String,
        /// The operation that was attempted.
        operation: &'static str,
    },

    // Permission/Access Errors
    /// Access denied by a path prefix policy.
    #[error("access denied: {path} ({reason})")]
    AccessDenied {
        /// The path where access was denied.
        path: String,
        /// The reason for denial.
        reason: String,
    },

    // Parse Errors
    /// A JSON PathSpec could not be parsed.
    #[error("invalid pathspec {input}: {source}")]
    InvalidPathSpec {
        /// The offending input.
        input: String,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A legacy URL pathspec could not be parsed.
    #[error("invalid url {input}: {source}")]
    InvalidUrl {
        /// The offending input.
        input: String,
        /// The underlying URL error.
        #[source]
        source: url::ParseError,
    },

    // Configuration Errors
    /// A remapping directive is malformed.
    #[error("invalid remapping: {details}")]
    InvalidRemapping {
        /// What is wrong with the directive.
        details: String,
    },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    // Backend/Operation Errors
    /// The accessor does not map its paths onto files the OS can open
    /// directly.
    #[error("not a raw filesystem: accessor {accessor}")]
    NotRawFileSystem {
        /// The accessor that was asked.
        accessor: String,
    },

    /// Operation is not supported by this accessor.
    #[error("operation not supported: {operation}")]
    NotSupported {
        /// The unsupported operation.
        operation: &'static str,
    },

    /// I/O error with context.
    #[error("{operation} failed for {path}: {source}")]
    Io {
        /// The operation that failed.
        operation: &'static str,
        /// The path involved in the operation.
        path: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl AccessorError {
    /// Returns `true` if this error means the path does not exist.
    ///
    /// Every backend reports absence through [`AccessorError::NotFound`] (or an
    /// I/O error of kind `NotFound`), so callers can check existence the same
    /// way regardless of which accessor served the request.
    pub fn is_not_found(&self) -> bool {
        match self {
            AccessorError::NotFound { .. } => true,
            AccessorError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

impl From<std::io::Error> for AccessorError {
    fn from(error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => AccessorError::NotFound {
                path: String::new(),
            },
            std::io::ErrorKind::PermissionDenied => AccessorError::AccessDenied {
                path: String::new(),
                reason: error.to_string(),
            },
            _ => AccessorError::Io {
                operation: "io",
                path: String::new(),
                source: error,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = AccessorError::NotFound {
            path: "/missing".into(),
        };
        assert_eq!(err.to_string(), "not found: /missing");
    }

    #[test]
    fn unknown_and_denied_are_distinct() {
        let unknown = AccessorError::UnknownAccessor {
            name: "ntfs".into(),
        };
        let denied = AccessorError::Denied {
            accessor: "ntfs".into(),
            operation: "open",
        };
        assert_eq!(unknown.to_string(), "unknown accessor: ntfs");
        assert_eq!(
            denied.to_string(),
            "open: accessor ntfs denied by configuration"
        );
        assert!(!unknown.is_not_found());
        assert!(!denied.is_not_found());
    }

    #[test]
    fn from_io_not_found() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err = AccessorError::from(io_err);
        assert!(matches!(err, AccessorError::NotFound { .. }));
        assert!(err.is_not_found());
    }

    #[test]
    fn from_io_permission_denied() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err = AccessorError::from(io_err);
        assert!(matches!(err, AccessorError::AccessDenied { .. }));
    }

    #[test]
    fn from_io_other() {
        let io_err = std::io::Error::other("test");
        let err = AccessorError::from(io_err);
        assert!(matches!(err, AccessorError::Io { .. }));
        assert!(!err.is_not_found());
    }

    #[test]
    fn io_not_found_counts_as_not_found() {
        let err = AccessorError::Io {
            operation: "open",
            path: "/x".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.is_not_found());
    }
}
