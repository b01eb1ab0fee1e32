//! Generic paths: either slash is a separator, quoting supported.

use super::PathManipulator;
use super::split::{is_any_slash, maybe_quote, resolve_traversal, split_quoted};
use crate::{AccessorError, PathType};

/// Best-guess syntax for paths of unknown origin.
///
/// Both `/` and `\` separate components. Serializes with a leading `/`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericPathManipulator;

impl PathManipulator for GenericPathManipulator {
    fn path_type(&self) -> PathType {
        PathType::Generic
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        Ok(resolve_traversal(split_quoted(path, is_any_slash), 0))
    }

    fn join(&self, components: &[String]) -> String {
        let mut result = String::new();
        for c in components {
            result.push('/');
            result.push_str(&maybe_quote(c, is_any_slash));
        }
        if result.is_empty() {
            result.push('/');
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generic_round_trips() {
        let cases: &[(&str, &[&str], &str)] = &[
            ("/bin/file\\1.txt", &["bin", "file", "1.txt"], "/bin/file/1.txt"),
            (
                "/bin/file\"1\".txt",
                &["bin", "file\"1\".txt"],
                r#"/bin/"file""1"".txt""#,
            ),
            (
                r#"/bin/"file""1"".txt""#,
                &["bin", "file\"1\".txt"],
                r#"/bin/"file""1"".txt""#,
            ),
            ("/bin/\"file\\1.txt\"", &["bin", "file\\1.txt"], "/bin/\"file\\1.txt\""),
            ("", &[], "/"),
        ];

        let m = GenericPathManipulator;
        for (serialized, components, expected) in cases {
            let split = m.split(serialized).unwrap();
            assert_eq!(split, components.to_vec(), "{serialized}");
            assert_eq!(m.join(&split), *expected);
        }
    }
}
