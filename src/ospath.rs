//! # OSPath
//!
//! A path as a list of components bound to a path syntax.
//!
//! Operating systems take a single string, but the same logical path has a
//! different string on each OS. An `OSPath` keeps the components and only
//! serializes when a string is needed:
//!
//! ```text
//! \\.\C:\Windows\System32  ->  ["\\.\C:", "Windows", "System32"]
//! C:\Windows\System32      ->  ["C:", "Windows", "System32"]
//! /usr/bin/ls              ->  ["usr", "bin", "ls"]
//! ```
//!
//! Every derivation (`append`, `dirname`, `trim`, ...) returns a new value;
//! an `OSPath` is never changed once built, so it can be shared freely
//! between concurrently running queries.
//!
//! No component is ever `.` or `..`, so a prefix check on components can
//! not be escaped by traversal.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Add;
use std::sync::Arc;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::manipulators::PathManipulator;
use crate::{AccessorError, FileSystemAccessor, PathSpec, PathType, Scope};

/// A parsed path: components, the syntax that serializes them, and an
/// optional [`PathSpec`] carrying delegation information.
///
/// # Example
///
/// ```rust
/// use vfs_accessors::{OSPath, PathType};
///
/// let path = OSPath::parse(PathType::Windows, r"C:\Windows\System32\..\..\ls").unwrap();
/// assert_eq!(path.components(), ["C:", "ls"]);
/// assert_eq!(path.to_string(), r"C:\ls");
///
/// let child = path.append(["notepad.exe"]);
/// assert_eq!(child.basename(), "notepad.exe");
/// assert_eq!(child.dirname(), path);
/// ```
#[derive(Clone)]
pub struct OSPath {
    components: Vec<String>,
    manipulator: Arc<dyn PathManipulator>,
    pathspec: Option<PathSpec>,
}

impl OSPath {
    /// Parse `path` with the syntax named by `path_type`.
    pub fn parse(path_type: PathType, path: &str) -> Result<Self, AccessorError> {
        Self::parse_with(path_type.manipulator(), path)
    }

    /// Parse `path` with an explicit manipulator.
    pub fn parse_with(
        manipulator: Arc<dyn PathManipulator>,
        path: &str,
    ) -> Result<Self, AccessorError> {
        let (components, pathspec) = manipulator.parse(path)?;
        Ok(Self {
            components,
            manipulator,
            pathspec,
        })
    }

    /// An empty path (the root) of the given syntax.
    pub fn empty(path_type: PathType) -> Self {
        Self {
            components: Vec::new(),
            manipulator: path_type.manipulator(),
            pathspec: None,
        }
    }

    /// Parse another path with this path's syntax.
    pub fn parse_path(&self, path: &str) -> Result<Self, AccessorError> {
        Self::parse_with(Arc::clone(&self.manipulator), path)
    }

    /// The components, root first.
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// The syntax this path serializes with.
    pub fn manipulator(&self) -> &Arc<dyn PathManipulator> {
        &self.manipulator
    }

    /// The syntax this path serializes with.
    pub fn path_type(&self) -> PathType {
        self.manipulator.path_type()
    }

    /// Returns `true` for the root.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    fn derive(&self, components: Vec<String>) -> Self {
        Self {
            components,
            manipulator: Arc::clone(&self.manipulator),
            pathspec: self.pathspec.clone(),
        }
    }

    /// A new path with `children` appended.
    ///
    /// Children are taken as single components; empty, `.` and `..`
    /// children are dropped. A child may contain the syntax's separator.
    /// Generic, Windows and registry paths quote such a component when
    /// serialized, so it re-parses as one component. Linux paths have no
    /// quoting: `append(["a/b"])` serializes as `/a/b` and re-parses as two.
    pub fn append<I, S>(&self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut components = self.components.clone();
        components.extend(
            children
                .into_iter()
                .map(|c| c.as_ref().to_string())
                .filter(|c| !matches!(c.as_str(), "" | "." | "..")),
        );
        self.derive(components)
    }

    /// The parent path. The root is its own parent.
    pub fn dirname(&self) -> Self {
        let mut components = self.components.clone();
        components.pop();
        self.derive(components)
    }

    /// The last component, or `""` for the root.
    pub fn basename(&self) -> &str {
        self.components.last().map_or("", String::as_str)
    }

    /// The root of this path, keeping syntax and PathSpec.
    pub fn clear(&self) -> Self {
        self.derive(Vec::new())
    }

    /// Remove the leading components shared with `prefix`.
    ///
    /// Compares with the syntax's case rules. If the first component already
    /// differs the path is returned unchanged.
    pub fn trim_components<S: AsRef<str>>(&self, prefix: &[S]) -> Self {
        let common = self
            .components
            .iter()
            .zip(prefix)
            .take_while(|(a, b)| self.manipulator.component_eq(a, b.as_ref()))
            .count();
        self.derive(self.components[common..].to_vec())
    }

    /// Remove the leading components shared with `prefix`.
    pub fn trim(&self, prefix: &OSPath) -> Self {
        self.trim_components(&prefix.components)
    }

    /// Returns `true` if `prefix` is a component-wise prefix of this path.
    pub fn starts_with(&self, prefix: &OSPath) -> bool {
        prefix.components.len() <= self.components.len()
            && self
                .components
                .iter()
                .zip(&prefix.components)
                .all(|(a, b)| self.manipulator.component_eq(a, b))
    }

    /// The PathSpec view of this path: the attached PathSpec (if any) with
    /// `Path` set to the joined components.
    pub fn path_spec(&self) -> PathSpec {
        self.manipulator
            .as_path_spec(&self.components, self.pathspec.as_ref())
    }

    /// A new path carrying `spec`; components are re-parsed from its `Path`.
    pub fn with_path_spec(&self, spec: PathSpec) -> Result<Self, AccessorError> {
        let components = self.manipulator.split(&spec.path)?;
        Ok(Self {
            components,
            manipulator: Arc::clone(&self.manipulator),
            pathspec: Some(spec),
        })
    }

    /// The components joined without any PathSpec wrapping.
    pub fn path(&self) -> String {
        self.manipulator.join(&self.components)
    }

    /// Scheme of the delegate accessor, or `""`.
    pub fn delegate_accessor(&self) -> &str {
        self.pathspec
            .as_ref()
            .map_or("", |spec| spec.delegate_accessor.as_str())
    }

    /// Serialized delegate path, or `""`.
    pub fn delegate_path(&self) -> String {
        self.pathspec
            .as_ref()
            .map(PathSpec::get_delegate_path)
            .unwrap_or_default()
    }

    /// Resolve the delegate accessor through the scope's registry and parse
    /// the delegate path with it.
    pub fn delegate(
        &self,
        scope: &Scope,
    ) -> Result<(Arc<dyn FileSystemAccessor>, OSPath), AccessorError> {
        let accessor = crate::get_accessor(self.delegate_accessor(), scope)?;
        let path = accessor.parse_path(&self.delegate_path())?;
        Ok((accessor, path))
    }

    /// Readable rendering of the delegation chain, innermost delegate first:
    /// `/images/disk.dd -> \\.\C: -> /data.zip`.
    ///
    /// One way only; the result is not meant to be parsed.
    pub fn human_string(&self, scope: &Scope) -> String {
        let has_delegate = self.pathspec.as_ref().is_some_and(PathSpec::has_delegate);
        if !has_delegate {
            return self.to_string();
        }
        match self.delegate(scope) {
            Ok((_, delegate)) => format!("{} -> {}", delegate.human_string(scope), self.path()),
            Err(_) => format!("{} -> {}", self.delegate_path(), self.path()),
        }
    }

    /// Type name used by query languages, e.g. `OSPath(Windows)`.
    pub fn describe_type(&self) -> String {
        format!("OSPath({:?})", self.path_type())
    }

    /// Match the serialized form against a regex.
    pub fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(&self.to_string())
    }
}

impl fmt::Display for OSPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            &self
                .manipulator
                .serialize(&self.components, self.pathspec.as_ref()),
        )
    }
}

impl fmt::Debug for OSPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OSPath")
            .field("type", &self.path_type())
            .field("components", &self.components)
            .field("pathspec", &self.pathspec)
            .finish()
    }
}

impl PartialEq for OSPath {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components && self.to_string() == other.to_string()
    }
}

impl Eq for OSPath {}

impl Hash for OSPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
        self.to_string().hash(state);
    }
}

impl PartialOrd for OSPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OSPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string()
            .cmp(&other.to_string())
            .then_with(|| self.components.cmp(&other.components))
    }
}

impl Add<&str> for &OSPath {
    type Output = OSPath;

    fn add(self, rhs: &str) -> OSPath {
        self.append([rhs])
    }
}

impl Add<&OSPath> for &OSPath {
    type Output = OSPath;

    fn add(self, rhs: &OSPath) -> OSPath {
        self.append(&rhs.components)
    }
}

impl Add<Vec<String>> for &OSPath {
    type Output = OSPath;

    fn add(self, rhs: Vec<String>) -> OSPath {
        self.append(rhs)
    }
}

impl Serialize for OSPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
