//! Component-wise allow/deny prefix checks.

use crate::{AccessorError, OSPath};

/// Allow and deny lists of path prefixes.
///
/// Backends consult a policy before touching storage. Checks compare whole
/// components with the path syntax's case rules, so `/usr` does not cover
/// `/usrlocal`. An OSPath never holds `.` or `..`, so a check can not be
/// sidestepped with traversal.
///
/// Deny wins over allow. An empty allow list allows everything not denied.
///
/// # Example
///
/// ```rust
/// use vfs_accessors::{OSPath, PathType, PrefixPolicy};
///
/// let p = |s: &str| OSPath::parse(PathType::Linux, s).unwrap();
/// let policy = PrefixPolicy::default().allow(p("/var/log")).deny(p("/var/log/secret"));
///
/// assert!(policy.check(&p("/var/log/syslog")).is_ok());
/// assert!(policy.check(&p("/var/log/secret/../secret/key")).is_err());
/// assert!(policy.check(&p("/etc/shadow")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PrefixPolicy {
    allow: Vec<OSPath>,
    deny: Vec<OSPath>,
}

impl PrefixPolicy {
    /// Add an allowed prefix.
    pub fn allow(mut self, prefix: OSPath) -> Self {
        self.allow.push(prefix);
        self
    }

    /// Add a denied prefix.
    pub fn deny(mut self, prefix: OSPath) -> Self {
        self.deny.push(prefix);
        self
    }

    /// Returns `true` if `path` may be accessed.
    pub fn is_allowed(&self, path: &OSPath) -> bool {
        if self.deny.iter().any(|prefix| path.starts_with(prefix)) {
            return false;
        }
        self.allow.is_empty() || self.allow.iter().any(|prefix| path.starts_with(prefix))
    }

    /// Check `path`, returning [`AccessorError::AccessDenied`] if refused.
    pub fn check(&self, path: &OSPath) -> Result<(), AccessorError> {
        if self.is_allowed(path) {
            return Ok(());
        }
        Err(AccessorError::AccessDenied {
            path: path.to_string(),
            reason: "outside the permitted prefixes".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PathType;

    fn linux(s: &str) -> OSPath {
        OSPath::parse(PathType::Linux, s).unwrap()
    }

    #[test]
    fn empty_policy_allows_everything() {
        assert!(PrefixPolicy::default().is_allowed(&linux("/etc/shadow")));
    }

    #[test]
    fn traversal_can_not_escape_allowed_prefix() {
        let policy = PrefixPolicy::default().allow(linux("/srv/data"));
        assert!(!policy.is_allowed(&linux("/srv/data/../../etc/passwd")));
        assert!(policy.is_allowed(&linux("/srv/data/./x/../y")));
    }

    #[test]
    fn prefix_matches_whole_components() {
        let policy = PrefixPolicy::default().deny(linux("/usr"));
        assert!(policy.is_allowed(&linux("/usrlocal")));
        assert!(!policy.is_allowed(&linux("/usr/bin")));
    }

    #[test]
    fn windows_prefixes_ignore_case() {
        let w = |s: &str| OSPath::parse(PathType::Windows, s).unwrap();
        let policy = PrefixPolicy::default().deny(w(r"C:\Windows\System32\config"));
        let err = policy.check(&w(r"c:\WINDOWS\system32\CONFIG\SAM")).unwrap_err();
        assert!(matches!(err, AccessorError::AccessDenied { .. }));
    }
}
