//! Windows registry key paths.

use super::PathManipulator;
use super::split::{is_any_slash, maybe_quote, resolve_traversal, split_quoted};
use crate::{AccessorError, PathType};

const HIVE_ALIASES: &[(&str, &str)] = &[
    ("HKLM", "HKEY_LOCAL_MACHINE"),
    ("HKCU", "HKEY_CURRENT_USER"),
    ("HKU", "HKEY_USERS"),
    ("HKCR", "HKEY_CLASSES_ROOT"),
    ("HKCC", "HKEY_CURRENT_CONFIG"),
];

fn expand_hive(component: &str) -> Option<&'static str> {
    HIVE_ALIASES
        .iter()
        .find(|(short, _)| short.eq_ignore_ascii_case(component))
        .map(|(_, long)| *long)
}

/// Registry paths like `HKEY_LOCAL_MACHINE\Software\"http://x/y"`.
///
/// Hive short names are expanded on parse. Value names may contain either
/// slash and are quoted on join.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegistryPathManipulator;

impl PathManipulator for RegistryPathManipulator {
    fn path_type(&self) -> PathType {
        PathType::Registry
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        let mut segments = split_quoted(path, is_any_slash);
        if let Some(first) = segments.first_mut() {
            if let Some(long) = expand_hive(first) {
                *first = long.to_string();
            }
        }
        let floor = usize::from(
            segments
                .first()
                .is_some_and(|first| first.starts_with("HKEY_")),
        );
        Ok(resolve_traversal(segments, floor))
    }

    fn join(&self, components: &[String]) -> String {
        components
            .iter()
            .map(|c| maybe_quote(c, is_any_slash))
            .collect::<Vec<_>>()
            .join("\\")
    }

    fn component_eq(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}
