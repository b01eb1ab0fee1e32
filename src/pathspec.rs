//! # PathSpec
//!
//! A recursive, serializable descriptor that lets one accessor source its
//! bytes from another accessor's path.
//!
//! ```text
//! {"DelegateAccessor":"ntfs","DelegatePath":"\\\\.\\C:\\data.zip","Path":"/docs/a.txt"}
//!        └── open \\.\C:\data.zip with "ntfs", then look for /docs/a.txt inside it
//! ```
//!
//! Levels nest through `Delegate`, so "zip inside NTFS inside a raw image"
//! is a single string. The JSON field names are a stable wire format.
//!
//! The legacy URL form `accessor://delegate/path#path` is still parsed, and
//! a PathSpec that came from a URL is written back as a URL so old
//! pathspecs survive a round trip unchanged.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::AccessorError;

/// Delegation descriptor: use `delegate_accessor` on `delegate_path`, then
/// look inside the result for `path`.
///
/// `delegate` and `delegate_path` are two encodings of the same
/// information. When both are present `delegate` wins, see
/// [`get_delegate_path`](PathSpec::get_delegate_path).
///
/// # Examples
///
/// ```rust
/// use vfs_accessors::PathSpec;
///
/// let spec: PathSpec =
///     r#"{"Path":"a","Delegate":{"Path":"b","DelegateAccessor":"file"}}"#.parse().unwrap();
/// assert_eq!(spec.get_delegate_path(), r#"{"DelegateAccessor":"file","Path":"b"}"#);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSpec {
    /// Scheme of the accessor that resolves the delegate path.
    #[serde(
        rename = "DelegateAccessor",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub delegate_accessor: String,

    /// Pre-serialized delegate path.
    #[serde(
        rename = "DelegatePath",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub delegate_path: String,

    /// Structured delegate; authoritative over `delegate_path`.
    #[serde(rename = "Delegate", default, skip_serializing_if = "Option::is_none")]
    pub delegate: Option<Box<PathSpec>>,

    /// Path inside the delegate.
    #[serde(rename = "Path", default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    #[serde(skip)]
    url_encoded: bool,
}

impl PathSpec {
    /// A PathSpec with only a `Path`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Set the delegate accessor scheme.
    pub fn with_delegate_accessor(mut self, accessor: impl Into<String>) -> Self {
        self.delegate_accessor = accessor.into();
        self
    }

    /// Set the pre-serialized delegate path.
    pub fn with_delegate_path(mut self, path: impl Into<String>) -> Self {
        self.delegate_path = path.into();
        self
    }

    /// Nest a structured delegate.
    pub fn with_delegate(mut self, delegate: PathSpec) -> Self {
        self.delegate = Some(Box::new(delegate));
        self
    }

    /// Parse a serialized PathSpec.
    ///
    /// - empty input gives an empty PathSpec
    /// - input starting with `{` is JSON; malformed JSON is an error
    /// - a one letter URL scheme is a Windows drive, kept as `DelegatePath`
    /// - any other URL is the legacy `accessor://path#fragment` form
    /// - input without a scheme is kept whole as `DelegatePath`
    pub fn parse(input: &str) -> Result<Self, AccessorError> {
        if input.is_empty() {
            return Ok(Self::default());
        }

        if input.starts_with('{') {
            return serde_json::from_str(input).map_err(|source| AccessorError::InvalidPathSpec {
                input: input.to_string(),
                source,
            });
        }

        match Url::parse(input) {
            Ok(url) if url.scheme().len() == 1 => Ok(Self::default().with_delegate_path(input)),
            Ok(url) => Ok(Self {
                delegate_accessor: url.scheme().to_string(),
                delegate_path: unescape(url.path()),
                delegate: None,
                path: url.fragment().map(unescape).unwrap_or_default(),
                url_encoded: true,
            }),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                Ok(Self::default().with_delegate_path(input))
            }
            Err(source) => Err(AccessorError::InvalidUrl {
                input: input.to_string(),
                source,
            }),
        }
    }

    /// The delegate path, preferring the structured `delegate` when set.
    pub fn get_delegate_path(&self) -> String {
        match &self.delegate {
            Some(delegate) => delegate.to_string(),
            None => self.delegate_path.clone(),
        }
    }

    /// Returns `true` if this PathSpec names any delegation at all.
    pub fn has_delegate(&self) -> bool {
        !self.delegate_accessor.is_empty()
            || !self.delegate_path.is_empty()
            || self.delegate.is_some()
    }

    /// Returns `true` if this PathSpec was parsed from the legacy URL form.
    pub fn is_url_encoded(&self) -> bool {
        self.url_encoded
    }

    fn write_url(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let delegate_path = self.get_delegate_path();
        if !self.delegate_accessor.is_empty() {
            write!(f, "{}:", self.delegate_accessor)?;
            if delegate_path.starts_with('/') {
                f.write_str("//")?;
            }
        }
        f.write_str(&escape(&delegate_path, PATH_SAFE))?;
        if !self.path.is_empty() {
            write!(f, "#{}", escape(&self.path, FRAGMENT_SAFE))?;
        }
        Ok(())
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Nested delegates have no URL form.
        if self.url_encoded && self.delegate.is_none() {
            return self.write_url(f);
        }
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

impl FromStr for PathSpec {
    type Err = AccessorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

const PATH_SAFE: &str = "/-._~:@!$&'()*+,;=";
const FRAGMENT_SAFE: &str = "/-._~:@!$&'()*+,;=?";

fn escape(input: &str, safe: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut buf = [0u8; 4];
    for c in input.chars() {
        if c.is_ascii_alphanumeric() || safe.contains(c) {
            out.push(c);
        } else {
            out.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    out
}

fn unescape(input: &str) -> String {
    match urlencoding::decode(input) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => input.to_string(),
    }
}
