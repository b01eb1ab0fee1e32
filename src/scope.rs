//! Per-query scope handed to [`FileSystemAccessor::new_instance`].
//!
//! [`FileSystemAccessor::new_instance`]: crate::FileSystemAccessor::new_instance

use serde_json::{Map, Value};

use crate::DeviceManager;

/// The context one query runs in.
///
/// Carries free-form variables accessors may read for configuration, and
/// optionally a scope-local [`DeviceManager`] that overrides the global
/// registry for this query only.
///
/// # Example
///
/// ```rust
/// use vfs_accessors::Scope;
///
/// let scope = Scope::new("collect").with_var("SSH_CONFIG", serde_json::json!({"port": 22}));
/// assert_eq!(scope.var("SSH_CONFIG").and_then(|v| v["port"].as_u64()), Some(22));
/// ```
#[derive(Clone, Default)]
pub struct Scope {
    name: String,
    vars: Map<String, Value>,
    device_manager: Option<DeviceManager>,
}

impl Scope {
    /// Create an empty scope.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set a variable.
    pub fn with_var(mut self, key: impl Into<String>, value: Value) -> Self {
        self.vars.insert(key.into(), value);
        self
    }

    /// Attach a scope-local registry.
    pub fn with_device_manager(mut self, manager: DeviceManager) -> Self {
        self.device_manager = Some(manager);
        self
    }

    /// Scope name, used in log fields.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a variable.
    pub fn var(&self, key: &str) -> Option<&Value> {
        self.vars.get(key)
    }

    /// The scope-local registry, if one is attached.
    pub fn device_manager(&self) -> Option<&DeviceManager> {
        self.device_manager.as_ref()
    }
}

impl std::fmt::Debug for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scope")
            .field("name", &self.name)
            .field("vars", &self.vars)
            .field("device_manager", &self.device_manager.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_var_is_none() {
        assert!(Scope::new("q").var("nope").is_none());
    }

    #[test]
    fn scope_without_manager_uses_global() {
        assert!(Scope::default().device_manager().is_none());
        let scope = Scope::new("q").with_device_manager(DeviceManager::new());
        assert!(scope.device_manager().is_some());
    }
}
