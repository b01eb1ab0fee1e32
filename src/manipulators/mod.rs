//! # Path Manipulators
//!
//! Pure functions that turn a serialized path into components and back,
//! one implementation per path syntax.
//!
//! ## Syntaxes
//!
//! | Manipulator | Serialized | Components |
//! |-------------|------------|------------|
//! | [`GenericPathManipulator`] | `/bin/"a/b"` | `["bin", "a/b"]` |
//! | [`LinuxPathManipulator`] | `/usr/bin/ls` | `["usr", "bin", "ls"]` |
//! | [`WindowsPathManipulator`] | `C:\Windows` | `["C:", "Windows"]` |
//! | [`WindowsNtfsManipulator`] | `\\.\C:\Windows` | `["\\.\C:", "Windows"]` |
//! | [`RegistryPathManipulator`] | `HKLM\Software` | `["HKEY_LOCAL_MACHINE", "Software"]` |
//! | [`PathSpecManipulator`] | `{"Path":"x",...}` | `["x"]` |
//! | [`ZipPathManipulator`] | `{"Path":"/a/C%3A",...}` | `["a", "C:"]` |
//!
//! ## Traversal
//!
//! `.` and empty segments are dropped; `..` consumes the previous component
//! but never climbs above the root (and never removes a Windows drive or
//! device). No component produced by a manipulator is ever `.` or `..`.
//!
//! ## Quoting
//!
//! Windows, registry and generic syntaxes accept a component wrapped in
//! double quotes. Inside the quotes separators are literal and `""` is an
//! escaped quote. Components that need it are quoted again on join.
//!
//! ## PathSpec Input
//!
//! Every manipulator accepts a JSON [`PathSpec`] in place of a plain path.
//! The PathSpec rides along on the [`OSPath`](crate::OSPath) and is written
//! back on join when it carries delegate information.

use std::fmt;
use std::sync::Arc;

use crate::{AccessorError, PathSpec, PathType};

mod generic;
mod linux;
mod pathspec;
mod registry;
mod split;
mod windows;

pub use generic::GenericPathManipulator;
pub use linux::LinuxPathManipulator;
pub use pathspec::{PathSpecManipulator, ZipPathManipulator};
pub use registry::RegistryPathManipulator;
pub use windows::{WindowsNtfsManipulator, WindowsPathManipulator};

/// Converts between serialized paths and component lists.
///
/// Implementors supply [`split`](Self::split) and [`join`](Self::join) for
/// plain paths; the provided methods layer PathSpec handling on top.
///
/// # Thread Safety
///
/// Manipulators are stateless and shared between many paths, so they must
/// be `Send + Sync`.
pub trait PathManipulator: Send + Sync + fmt::Debug {
    /// The syntax this manipulator implements.
    fn path_type(&self) -> PathType;

    /// Split a plain serialized path into components.
    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError>;

    /// Join components into a plain serialized path.
    fn join(&self, components: &[String]) -> String;

    /// Compare two components under this syntax's case rules.
    fn component_eq(&self, a: &str, b: &str) -> bool {
        a == b
    }

    /// Parse a serialized path that may also be a JSON PathSpec.
    fn parse(&self, path: &str) -> Result<(Vec<String>, Option<PathSpec>), AccessorError> {
        if path.starts_with('{') {
            let spec = PathSpec::parse(path)?;
            let components = self.split(&spec.path)?;
            return Ok((components, Some(spec)));
        }
        Ok((self.split(path)?, None))
    }

    /// Serialize components, re-emitting a delegating PathSpec if present.
    fn serialize(&self, components: &[String], pathspec: Option<&PathSpec>) -> String {
        let joined = self.join(components);
        match pathspec {
            Some(spec) if spec.has_delegate() => {
                let mut spec = spec.clone();
                spec.path = joined;
                spec.to_string()
            }
            _ => joined,
        }
    }

    /// The PathSpec view of a path.
    fn as_path_spec(&self, components: &[String], pathspec: Option<&PathSpec>) -> PathSpec {
        let mut spec = pathspec.cloned().unwrap_or_default();
        spec.path = self.join(components);
        spec
    }
}

impl PathType {
    /// The manipulator implementing this syntax.
    pub fn manipulator(&self) -> Arc<dyn PathManipulator> {
        match self {
            PathType::Generic => Arc::new(GenericPathManipulator),
            PathType::Linux => Arc::new(LinuxPathManipulator),
            PathType::Windows => Arc::new(WindowsPathManipulator),
            PathType::Ntfs => Arc::new(WindowsNtfsManipulator),
            PathType::Registry => Arc::new(RegistryPathManipulator),
            PathType::PathSpec => Arc::new(PathSpecManipulator),
            PathType::Zip => Arc::new(ZipPathManipulator),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manipulator_reports_its_type() {
        for path_type in [
            PathType::Generic,
            PathType::Linux,
            PathType::Windows,
            PathType::Ntfs,
            PathType::Registry,
            PathType::PathSpec,
            PathType::Zip,
        ] {
            assert_eq!(path_type.manipulator().path_type(), path_type);
        }
    }

    #[test]
    fn manipulator_is_object_safe() {
        fn _check(_: &dyn PathManipulator) {}
    }

    #[test]
    fn plain_pathspec_is_not_reemitted() {
        let m = LinuxPathManipulator;
        let (components, spec) = m.parse(r#"{"Path":"/bin/ls"}"#).unwrap();
        assert_eq!(m.serialize(&components, spec.as_ref()), "/bin/ls");
    }

    #[test]
    fn delegating_pathspec_is_reemitted() {
        let m = LinuxPathManipulator;
        let (components, spec) = m
            .parse(r#"{"DelegateAccessor":"file","DelegatePath":"/x.zip","Path":"/a/../b/c"}"#)
            .unwrap();
        assert_eq!(components, vec!["b".to_string(), "c".to_string()]);
        assert_eq!(
            m.serialize(&components, spec.as_ref()),
            r#"{"DelegateAccessor":"file","DelegatePath":"/x.zip","Path":"/b/c"}"#
        );
    }
}
