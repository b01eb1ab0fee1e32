//! POSIX paths.

use super::PathManipulator;
use super::split::resolve_traversal;
use crate::{AccessorError, PathType};

/// `/` separated paths. Backslashes are ordinary filename characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxPathManipulator;

impl PathManipulator for LinuxPathManipulator {
    fn path_type(&self) -> PathType {
        PathType::Linux
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        let segments = path.split('/').map(str::to_string).collect();
        Ok(resolve_traversal(segments, 0))
    }

    fn join(&self, components: &[String]) -> String {
        format!("/{}", components.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn linux_round_trips() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("/bin/ls", &["bin", "ls"], "/bin/ls"),
            ("bin////ls", &["bin", "ls"], "/bin/ls"),
            ("/bin/ls////", &["bin", "ls"], "/bin/ls"),
            ("/bin/file\\1.txt", &["bin", "file\\1.txt"], "/bin/file\\1.txt"),
            ("/bin/../../../.././../../ls", &["ls"], "/ls"),
            ("/usr/./lib/../bin", &["usr", "bin"], "/usr/bin"),
            ("/", &[], "/"),
        ];

        let m = LinuxPathManipulator;
        for (serialized, components, expected) in cases {
            let split = m.split(serialized).unwrap();
            assert_eq!(split, components.to_vec(), "{serialized}");
            assert_eq!(m.join(&split), *expected);
        }
    }

    #[test]
    fn linux_is_case_sensitive() {
        assert!(!LinuxPathManipulator.component_eq("Bin", "bin"));
    }
}
