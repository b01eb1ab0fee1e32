//! Windows drive and device paths.

use std::sync::LazyLock;

use regex::Regex;

use super::PathManipulator;
use super::split::{is_any_slash, maybe_quote, resolve_traversal, split_quoted};
use crate::{AccessorError, PathType};

static VSS_DEVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\\\\[?.]\\GLOBALROOT\\Device\\[^\\/]+)([\\/].*)?$")
        .expect("VSS device pattern compiles")
});

static DRIVE_DEVICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\\\\[?.]\\[a-zA-Z]:)([\\/].*)?$")
        .expect("drive device pattern compiles")
});

static DRIVE_LETTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z]:$").expect("drive letter pattern compiles")
});

/// Split a Windows path, keeping a leading device token whole. `..` never
/// removes a leading drive or device.
fn split_windows(path: &str) -> Vec<String> {
    for pattern in [&*VSS_DEVICE, &*DRIVE_DEVICE] {
        if let Some(captures) = pattern.captures(path) {
            let device = captures.get(1).map_or("", |m| m.as_str()).to_string();
            let rest = captures.get(2).map_or("", |m| m.as_str());
            let mut segments = vec![device];
            segments.extend(split_quoted(rest, is_any_slash));
            return resolve_traversal(segments, 1);
        }
    }

    let segments = split_quoted(path, is_any_slash);
    let has_drive = segments
        .first()
        .is_some_and(|first| DRIVE_LETTER.is_match(first));
    resolve_traversal(segments, usize::from(has_drive))
}

fn is_drive_or_device(component: &str) -> bool {
    DRIVE_LETTER.is_match(component)
        || VSS_DEVICE.is_match(component)
        || DRIVE_DEVICE.is_match(component)
}

fn join_windows(components: &[String]) -> String {
    let mut parts = Vec::with_capacity(components.len());
    for (i, c) in components.iter().enumerate() {
        if i == 0 && is_drive_or_device(c) {
            parts.push(c.clone());
        } else {
            parts.push(maybe_quote(c, is_any_slash).into_owned());
        }
    }
    parts.join("\\")
}

/// `C:\Windows` style paths as seen by the Win32 API.
///
/// Accepts either slash on input and always serializes with `\`.
/// Components compare case-insensitively.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPathManipulator;

impl PathManipulator for WindowsPathManipulator {
    fn path_type(&self) -> PathType {
        PathType::Windows
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        Ok(split_windows(path))
    }

    fn join(&self, components: &[String]) -> String {
        join_windows(components)
    }

    fn component_eq(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}

/// Raw NTFS device paths such as `\\.\C:\Windows`.
///
/// Device tokens are preserved whole. A bare drive letter `C:` is promoted
/// to its device form `\\.\C:`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsNtfsManipulator;

impl PathManipulator for WindowsNtfsManipulator {
    fn path_type(&self) -> PathType {
        PathType::Ntfs
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        let mut components = split_windows(path);
        if let Some(first) = components.first_mut() {
            if DRIVE_LETTER.is_match(first) {
                *first = format!("\\\\.\\{}", first.to_ascii_uppercase());
            }
        }
        Ok(components)
    }

    fn join(&self, components: &[String]) -> String {
        join_windows(components)
    }

    fn component_eq(&self, a: &str, b: &str) -> bool {
        a.eq_ignore_ascii_case(b)
    }
}
