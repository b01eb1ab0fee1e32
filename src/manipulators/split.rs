//! Splitting and quoting helpers shared by the manipulators.

use std::borrow::Cow;

/// Split `path` on any separator, honouring double-quoted components.
///
/// A quote only opens a quoted component at the start of a component. Inside
/// quotes `""` is a literal quote. Empty segments are dropped; `.` and `..`
/// are returned for [`resolve_traversal`] to deal with.
pub(crate) fn split_quoted(path: &str, is_separator: impl Fn(char) -> bool) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut started = false;
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quote {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quote = false;
                }
            } else {
                current.push(c);
            }
            continue;
        }

        if is_separator(c) {
            if !current.is_empty() {
                result.push(std::mem::take(&mut current));
            }
            started = false;
            continue;
        }

        if c == '"' && !started {
            in_quote = true;
            started = true;
            continue;
        }

        started = true;
        current.push(c);
    }

    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Drop `.` segments and let `..` consume the previous component.
///
/// The first `floor` components are never consumed, so `..` can not climb
/// above the root or remove a drive.
pub(crate) fn resolve_traversal(segments: Vec<String>, floor: usize) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment.as_str() {
            "" | "." => {}
            ".." => {
                if result.len() > floor {
                    result.pop();
                }
            }
            _ => result.push(segment),
        }
    }
    result
}

/// Quote a component if it contains a separator or a quote.
pub(crate) fn maybe_quote(component: &str, is_separator: impl Fn(char) -> bool) -> Cow<'_, str> {
    if component.chars().any(|c| c == '"' || is_separator(c)) {
        Cow::Owned(format!("\"{}\"", component.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(component)
    }
}

pub(crate) fn is_any_slash(c: char) -> bool {
    c == '/' || c == '\\'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn quoted_component_keeps_separators() {
        assert_eq!(
            split_quoted(r#"a\"http://x/y"\b"#, is_any_slash),
            strings(&["a", "http://x/y", "b"])
        );
    }

    #[test]
    fn doubled_quote_is_literal() {
        assert_eq!(
            split_quoted(r#"/bin/"file""1"".txt""#, is_any_slash),
            strings(&["bin", "file\"1\".txt"])
        );
    }

    #[test]
    fn quote_inside_component_is_literal() {
        assert_eq!(
            split_quoted("/bin/file\"1\".txt", is_any_slash),
            strings(&["bin", "file\"1\".txt"])
        );
    }

    #[test]
    fn traversal_never_leaves_dot_segments() {
        let inputs = [
            "../../a/./b/../../../c/..",
            "./././..",
            "a/\"..\"/b",
            "..\\..\\x\\.\\y",
        ];
        for input in inputs {
            let resolved = resolve_traversal(split_quoted(input, is_any_slash), 0);
            assert!(
                resolved.iter().all(|c| c != "." && c != ".." && !c.is_empty()),
                "{input} -> {resolved:?}"
            );
        }
    }

    #[test]
    fn traversal_respects_floor() {
        assert_eq!(
            resolve_traversal(strings(&["C:", "a", "..", "..", "..", "b"]), 1),
            strings(&["C:", "b"])
        );
    }

    #[test]
    fn maybe_quote_only_when_needed() {
        assert_eq!(maybe_quote("plain", is_any_slash), "plain");
        assert_eq!(maybe_quote("a/b", is_any_slash), "\"a/b\"");
        assert_eq!(maybe_quote("a\"b", is_any_slash), "\"a\"\"b\"");
    }
}
