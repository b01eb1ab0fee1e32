//! # DeviceManager
//!
//! The registry mapping scheme names to accessor prototypes.
//!
//! ```text
//! "file" ──▶ prototype ──new_instance(scope)──▶ per-query instance
//! "ntfs" ──▶ prototype
//! "auto" ──▶ MountFileSystemAccessor (installed by remapping)
//! ```
//!
//! There is one process-wide registry ([`global`]). A query that needs its
//! own view takes a [`copy`](DeviceManager::copy), changes it freely and
//! attaches it to its [`Scope`]; the global registry and other queries never
//! see those changes.
//!
//! Aliases are resolved here and nowhere else: an empty scheme means
//! `auto` and the legacy `reg` means `registry`.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::{
    AccessorDescriptor, AccessorError, FileInfo, FileSystemAccessor, OSPath, PathType, ReadSeek,
    Scope,
};

/// Resolve scheme aliases to the canonical registered name.
pub fn canonical_name(name: &str) -> &str {
    match name {
        "" => "auto",
        "reg" => "registry",
        other => other,
    }
}

#[derive(Clone)]
struct RegistryEntry {
    prototype: Arc<dyn FileSystemAccessor>,
    descriptor: AccessorDescriptor,
}

/// A lockable map from scheme name to accessor prototype.
///
/// Cloning a `DeviceManager` gives another handle to the *same* map. Use
/// [`copy`](Self::copy) for an independent snapshot.
#[derive(Clone, Default)]
pub struct DeviceManager {
    registry: Arc<Mutex<HashMap<String, RegistryEntry>>>,
}

impl DeviceManager {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `accessor` under `name`. The last registration wins.
    ///
    /// Aliases are resolved first, so registering under `reg` stores the
    /// entry as `registry`.
    pub fn register(
        &self,
        name: impl Into<String>,
        accessor: Arc<dyn FileSystemAccessor>,
        description: impl Into<String>,
    ) {
        let name = name.into();
        let name = canonical_name(&name).to_string();
        let descriptor = AccessorDescriptor {
            name: name.clone(),
            description: description.into(),
            scope_var: accessor.describe().scope_var,
        };
        tracing::debug!(accessor = %name, "registering accessor");
        self.registry.lock().insert(
            name,
            RegistryEntry {
                prototype: accessor,
                descriptor,
            },
        );
    }

    /// Register an accessor under the name and description it describes
    /// itself with.
    pub fn register_described(&self, accessor: Arc<dyn FileSystemAccessor>) {
        let descriptor = accessor.describe();
        self.register(descriptor.name, accessor, descriptor.description);
    }

    /// Look up `name` and bind the prototype to `scope`.
    ///
    /// # Errors
    ///
    /// - [`AccessorError::UnknownAccessor`] if nothing is registered
    /// - whatever the prototype's `new_instance` returns
    pub fn get_accessor(
        &self,
        name: &str,
        scope: &Scope,
    ) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        let prototype = self.prototype(name)?;
        tracing::trace!(accessor = %name, scope = %scope.name(), "binding accessor");
        prototype.new_instance(scope)
    }

    /// Look up the registered prototype without binding it.
    pub fn prototype(&self, name: &str) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        let canonical = canonical_name(name);
        let entry = self.registry.lock().get(canonical).cloned();
        match entry {
            Some(entry) => Ok(entry.prototype),
            None => {
                tracing::debug!(accessor = %canonical, "unknown accessor");
                Err(AccessorError::UnknownAccessor {
                    name: canonical.to_string(),
                })
            }
        }
    }

    /// Returns `true` if `name` (after alias resolution) is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.registry.lock().contains_key(canonical_name(name))
    }

    /// Descriptors of every registered accessor, sorted by name.
    pub fn describe_all(&self) -> Vec<AccessorDescriptor> {
        let mut result: Vec<AccessorDescriptor> = self
            .registry
            .lock()
            .values()
            .map(|entry| entry.descriptor.clone())
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        result
    }

    /// An independent snapshot of this registry.
    pub fn copy(&self) -> DeviceManager {
        let snapshot = self.registry.lock().clone();
        tracing::debug!(accessors = snapshot.len(), "copying device manager");
        DeviceManager {
            registry: Arc::new(Mutex::new(snapshot)),
        }
    }

    /// Remove every registration.
    pub fn clear(&self) {
        tracing::debug!("clearing device manager");
        self.registry.lock().clear();
    }

    /// Build a registry from `base` filtered by an allow/deny configuration.
    ///
    /// With a non-empty allow list only those schemes are carried over.
    /// Every denied scheme is then registered as a [`DeniedAccessor`] so
    /// that using it fails with [`AccessorError::Denied`] rather than
    /// [`AccessorError::UnknownAccessor`].
    pub fn from_config(base: &DeviceManager, config: &AccessorConfig) -> DeviceManager {
        let result = base.copy();

        if !config.allowed_accessors.is_empty() {
            result.clear();
            for name in &config.allowed_accessors {
                let canonical = canonical_name(name);
                let entry = base.registry.lock().get(canonical).cloned();
                match entry {
                    Some(entry) => {
                        result.registry.lock().insert(canonical.to_string(), entry);
                    }
                    None => {
                        tracing::debug!(accessor = %canonical, "allowed accessor is not registered");
                    }
                }
            }
        }

        for name in &config.denied_accessors {
            let canonical = canonical_name(name);
            result.register(
                canonical,
                Arc::new(DeniedAccessor::new(canonical)),
                "Denied by configuration",
            );
        }

        result
    }
}

/// Allow/deny configuration for building a scope's registry.
///
/// ```yaml
/// allowed_accessors: [file, ntfs]
/// denied_accessors: [raw_reg]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessorConfig {
    /// Schemes to keep. Empty keeps everything.
    #[serde(default)]
    pub allowed_accessors: Vec<String>,
    /// Schemes to replace with a [`DeniedAccessor`].
    #[serde(default)]
    pub denied_accessors: Vec<String>,
}

/// Stand-in registered for a deny-listed scheme.
///
/// Binding succeeds; every operation fails with [`AccessorError::Denied`].
#[derive(Debug, Clone)]
pub struct DeniedAccessor {
    name: String,
}

impl DeniedAccessor {
    /// A stub for the scheme `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn denied(&self, operation: &'static str) -> AccessorError {
        AccessorError::Denied {
            accessor: self.name.clone(),
            operation,
        }
    }
}

impl FileSystemAccessor for DeniedAccessor {
    fn new_instance(&self, _scope: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
        Ok(Arc::new(self.clone()))
    }

    fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
        OSPath::parse(PathType::Generic, path)
    }

    fn read_dir_with_os_path(
        &self,
        _path: &OSPath,
    ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
        Err(self.denied("read_dir"))
    }

    fn open_with_os_path(&self, _path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
        Err(self.denied("open"))
    }

    fn lstat_with_os_path(&self, _path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
        Err(self.denied("lstat"))
    }

    fn describe(&self) -> AccessorDescriptor {
        AccessorDescriptor::new(self.name.clone(), "Denied by configuration")
    }
}

static GLOBAL: LazyLock<DeviceManager> = LazyLock::new(DeviceManager::new);

/// The process-wide registry. Starts empty; hosts register their backends
/// at start-up.
pub fn global() -> &'static DeviceManager {
    &GLOBAL
}

/// Register an accessor in the process-wide registry.
pub fn register(
    name: impl Into<String>,
    accessor: Arc<dyn FileSystemAccessor>,
    description: impl Into<String>,
) {
    global().register(name, accessor, description);
}

/// Resolve `name` against the scope's registry, or the global one if the
/// scope has none.
pub fn get_accessor(
    name: &str,
    scope: &Scope,
) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
    match scope.device_manager() {
        Some(manager) => manager.get_accessor(name, scope),
        None => global().get_accessor(name, scope),
    }
}

/// Ask the accessor `name` for the OS filename behind `path`.
///
/// # Errors
///
/// - [`AccessorError::UnknownAccessor`] if `name` is not registered
/// - [`AccessorError::NotRawFileSystem`] if the accessor has no OS files
pub fn get_underlying_api_filename(
    name: &str,
    scope: &Scope,
    path: &OSPath,
) -> Result<String, AccessorError> {
    get_accessor(name, scope)?.get_underlying_api_filename(path)
}

/// The canonical spelling of `path` according to the accessor `name`.
///
/// Falls back to the serialized path when the accessor can not be
/// resolved.
pub fn get_canonical_filename(name: &str, scope: &Scope, path: &OSPath) -> String {
    match get_accessor(name, scope) {
        Ok(accessor) => accessor.get_canonical_filename(path),
        Err(error) => {
            tracing::debug!(accessor = %name, %error, "canonical filename falls back to path");
            path.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VirtualFilesystemAccessor;
    use pretty_assertions::assert_eq;

    fn vfs() -> Arc<dyn FileSystemAccessor> {
        Arc::new(VirtualFilesystemAccessor::new(OSPath::empty(PathType::Linux)))
    }

    #[test]
    fn unknown_scheme() {
        let manager = DeviceManager::new();
        let err = manager.get_accessor("ntfs", &Scope::default()).err().unwrap();
        assert!(matches!(err, AccessorError::UnknownAccessor { ref name } if name == "ntfs"));
    }

    #[test]
    fn aliases_resolve_once() {
        let manager = DeviceManager::new();
        manager.register("auto", vfs(), "auto");
        manager.register("registry", vfs(), "registry");
        assert!(manager.get_accessor("", &Scope::default()).is_ok());
        assert!(manager.get_accessor("reg", &Scope::default()).is_ok());
        assert!(manager.contains("reg"));
    }

    #[test]
    fn aliases_resolve_on_registration() {
        let manager = DeviceManager::new();
        manager.register("reg", vfs(), "legacy name");
        manager.register("", vfs(), "empty name");

        assert!(manager.get_accessor("reg", &Scope::default()).is_ok());
        assert!(manager.get_accessor("registry", &Scope::default()).is_ok());
        assert!(manager.get_accessor("auto", &Scope::default()).is_ok());

        let names: Vec<String> = manager.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["auto", "registry"]);
    }

    #[test]
    fn last_registration_wins() {
        let manager = DeviceManager::new();
        manager.register("file", vfs(), "first");
        manager.register("file", vfs(), "second");
        let all = manager.describe_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].description, "second");
    }

    #[test]
    fn copy_is_isolated_both_ways() {
        let original = DeviceManager::new();
        original.register("file", vfs(), "file");

        let copy = original.copy();
        copy.register("zip", vfs(), "zip");
        copy.clear();
        copy.register("data", vfs(), "data");

        assert!(original.contains("file"));
        assert!(!original.contains("zip"));
        assert!(!original.contains("data"));

        original.register("ntfs", vfs(), "ntfs");
        assert!(!copy.contains("ntfs"));
        assert!(!copy.contains("file"));
    }

    #[test]
    fn clone_shares_the_map() {
        let manager = DeviceManager::new();
        let handle = manager.clone();
        handle.register("file", vfs(), "file");
        assert!(manager.contains("file"));
    }

    #[test]
    fn describe_all_is_sorted() {
        let manager = DeviceManager::new();
        for name in ["zip", "file", "ntfs"] {
            manager.register(name, vfs(), name);
        }
        let names: Vec<String> = manager.describe_all().into_iter().map(|d| d.name).collect();
        assert_eq!(names, ["file", "ntfs", "zip"]);
    }

    #[test]
    fn allow_list_keeps_only_allowed() {
        let base = DeviceManager::new();
        for name in ["file", "ntfs", "registry"] {
            base.register(name, vfs(), name);
        }
        let config = AccessorConfig {
            allowed_accessors: vec!["file".into(), "reg".into()],
            denied_accessors: vec![],
        };
        let manager = DeviceManager::from_config(&base, &config);
        assert!(manager.contains("file"));
        assert!(manager.contains("registry"));
        assert!(!manager.contains("ntfs"));
        assert!(base.contains("ntfs"));
    }

    #[test]
    fn denied_differs_from_unknown() {
        let base = DeviceManager::new();
        base.register("ntfs", vfs(), "ntfs");
        let config = AccessorConfig {
            allowed_accessors: vec![],
            denied_accessors: vec!["ntfs".into()],
        };
        let manager = DeviceManager::from_config(&base, &config);
        let scope = Scope::default();

        let denied = manager.get_accessor("ntfs", &scope).unwrap();
        let err = denied.read_dir("/").err().unwrap();
        assert!(matches!(
            err,
            AccessorError::Denied { ref accessor, operation: "read_dir" } if accessor == "ntfs"
        ));
        assert!(denied.open("/x").is_err());
        assert!(denied.lstat("/x").is_err());

        let unknown = manager.get_accessor("zip", &scope).err().unwrap();
        assert!(matches!(unknown, AccessorError::UnknownAccessor { .. }));
    }

    #[test]
    fn config_from_yaml() {
        let config: AccessorConfig =
            serde_yaml::from_str("denied_accessors: [raw_reg]\n").unwrap();
        assert!(config.allowed_accessors.is_empty());
        assert_eq!(config.denied_accessors, ["raw_reg"]);
    }

    #[test]
    fn scope_manager_overrides_global() {
        let local = DeviceManager::new();
        local.register("scoped_only", vfs(), "scoped");
        let scope = Scope::new("q").with_device_manager(local);
        assert!(get_accessor("scoped_only", &scope).is_ok());
        assert!(get_accessor("scoped_only", &Scope::default()).is_err());
    }

    /// Stores names case-insensitively and maps them onto `/srv`.
    struct FoldingStore;

    impl FileSystemAccessor for FoldingStore {
        fn new_instance(&self, _: &Scope) -> Result<Arc<dyn FileSystemAccessor>, AccessorError> {
            Ok(Arc::new(FoldingStore))
        }

        fn parse_path(&self, path: &str) -> Result<OSPath, AccessorError> {
            OSPath::parse(PathType::Windows, path)
        }

        fn read_dir_with_os_path(
            &self,
            _: &OSPath,
        ) -> Result<Vec<Box<dyn FileInfo>>, AccessorError> {
            Ok(Vec::new())
        }

        fn open_with_os_path(&self, path: &OSPath) -> Result<Box<dyn ReadSeek>, AccessorError> {
            Err(AccessorError::NotFound {
                path: path.to_string(),
            })
        }

        fn lstat_with_os_path(&self, path: &OSPath) -> Result<Box<dyn FileInfo>, AccessorError> {
            Err(AccessorError::NotFound {
                path: path.to_string(),
            })
        }

        fn get_underlying_api_filename(&self, path: &OSPath) -> Result<String, AccessorError> {
            Ok(format!("/srv/{}", path.components().join("/")))
        }

        fn get_canonical_filename(&self, path: &OSPath) -> String {
            path.to_string().to_lowercase()
        }
    }

    #[test]
    fn optional_capabilities_through_the_registry() {
        let manager = DeviceManager::new();
        manager.register("store", Arc::new(FoldingStore), "Folding store");
        manager.register("plain", vfs(), "Plain tree");
        let scope = Scope::default().with_device_manager(manager);
        let path = OSPath::parse(PathType::Windows, r"C:\Users\Alice").unwrap();

        assert_eq!(
            get_underlying_api_filename("store", &scope, &path).unwrap(),
            "/srv/C:/Users/Alice"
        );
        assert_eq!(get_canonical_filename("store", &scope, &path), r"c:\users\alice");

        let err = get_underlying_api_filename("plain", &scope, &path).unwrap_err();
        assert!(matches!(err, AccessorError::NotRawFileSystem { ref accessor } if accessor == "vfs"));
        let err = get_underlying_api_filename("missing", &scope, &path).unwrap_err();
        assert!(matches!(err, AccessorError::UnknownAccessor { .. }));

        assert_eq!(get_canonical_filename("plain", &scope, &path), r"C:\Users\Alice");
        assert_eq!(get_canonical_filename("missing", &scope, &path), r"C:\Users\Alice");
    }
}
