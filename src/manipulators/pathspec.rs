//! Opaque PathSpec paths and paths inside collector zip files.

use super::PathManipulator;
use super::split::resolve_traversal;
use crate::{AccessorError, PathSpec, PathType};

/// Keeps the PathSpec `Path` as a single opaque component.
///
/// Used by accessors whose data is not hierarchical, where the path is an
/// identifier rather than a location.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathSpecManipulator;

impl PathManipulator for PathSpecManipulator {
    fn path_type(&self) -> PathType {
        PathType::PathSpec
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        if path.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![path.to_string()])
    }

    fn join(&self, components: &[String]) -> String {
        components.join("/")
    }

    fn serialize(&self, components: &[String], pathspec: Option<&PathSpec>) -> String {
        match pathspec {
            Some(spec) => self.as_path_spec(components, Some(spec)).to_string(),
            None => self.join(components),
        }
    }
}

/// Paths inside a collector zip file.
///
/// Zip member names are url-encoded per component so that device names
/// like `\\.\C:` survive as a single member component.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPathManipulator;

impl PathManipulator for ZipPathManipulator {
    fn path_type(&self) -> PathType {
        PathType::Zip
    }

    fn split(&self, path: &str) -> Result<Vec<String>, AccessorError> {
        let segments = path
            .split('/')
            .map(|segment| match urlencoding::decode(segment) {
                Ok(decoded) => decoded.into_owned(),
                Err(_) => segment.to_string(),
            })
            .collect();
        Ok(resolve_traversal(segments, 0))
    }

    fn join(&self, components: &[String]) -> String {
        let mut result = String::new();
        for c in components {
            result.push('/');
            result.push_str(&urlencoding::encode(c));
        }
        if result.is_empty() {
            result.push('/');
        }
        result
    }

    fn serialize(&self, components: &[String], pathspec: Option<&PathSpec>) -> String {
        match pathspec {
            Some(spec) => self.as_path_spec(components, Some(spec)).to_string(),
            None => self.join(components),
        }
    }
}
