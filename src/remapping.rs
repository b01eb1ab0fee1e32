//! # Remapping
//!
//! Rewires a scope's registry so queries written for one machine run
//! against data collected from another.
//!
//! ```yaml
//! remappings:
//!   - type: mount
//!     from:
//!       accessor: file
//!       prefix: /mnt/image/
//!     on:
//!       accessor: auto
//!       prefix: C:\
//!       path_type: windows
//!   - type: shadow
//!     from:
//!       accessor: zip
//!     on:
//!       accessor: file
//! ```
//!
//! A `mount` directive reads like "mount `file:/mnt/image` on `auto:C:\`":
//! opening `C:\Windows` with `auto` reads `/mnt/image/Windows` through
//! `file`. All `mount` directives naming the same `on.accessor` are
//! installed into one [`MountFileSystemAccessor`] built over an empty
//! virtual root.
//!
//! A `shadow` directive registers the `from` accessor under the `on` name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    AccessorDescriptor, AccessorError, DescribeLayer, DescribedAccessor, DeviceManager, LayerExt,
    MountFileSystemAccessor, OSPath, PathType, Scope, VirtualFilesystemAccessor, device_manager,
};

/// One end of a remapping directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountPoint {
    /// Accessor scheme.
    #[serde(default)]
    pub accessor: String,
    /// Path within the accessor.
    #[serde(default)]
    pub prefix: String,
    /// Syntax of `prefix`; generic when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_type: Option<PathType>,
}

impl MountPoint {
    fn parse_prefix(&self) -> Result<OSPath, AccessorError> {
        OSPath::parse(self.path_type.unwrap_or_default(), &self.prefix)
    }
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.accessor, self.prefix)
    }
}

/// A single remapping directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Remapping {
    /// Mount `from` at `on.prefix` inside the `on.accessor` union.
    Mount {
        /// Source accessor and path.
        #[serde(default)]
        from: Option<MountPoint>,
        /// Target accessor and path.
        #[serde(default)]
        on: Option<MountPoint>,
        /// Scope variables the source accessor is bound with.
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        vars: Map<String, Value>,
    },
    /// Register the `from` accessor under the `on` name.
    Shadow {
        /// Accessor to expose.
        #[serde(default)]
        from: Option<MountPoint>,
        /// Name to expose it under.
        #[serde(default)]
        on: Option<MountPoint>,
    },
}

/// A list of remapping directives, as loaded from configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemappingConfig {
    /// Directives, applied in order.
    #[serde(default)]
    pub remappings: Vec<Remapping>,
}

impl RemappingConfig {
    /// Parse a JSON configuration.
    pub fn from_json(input: &str) -> Result<Self, AccessorError> {
        serde_json::from_str(input).map_err(|e| AccessorError::Deserialization(e.to_string()))
    }

    /// Parse a YAML configuration.
    pub fn from_yaml(input: &str) -> Result<Self, AccessorError> {
        serde_yaml::from_str(input).map_err(|e| AccessorError::Deserialization(e.to_string()))
    }
}

fn endpoints<'a>(
    kind: &str,
    from: &'a Option<MountPoint>,
    on: &'a Option<MountPoint>,
) -> Result<(&'a MountPoint, &'a MountPoint), AccessorError> {
    match (from, on) {
        (Some(from), Some(on)) => Ok((from, on)),
        _ => Err(AccessorError::InvalidRemapping {
            details: format!(
                "invalid {kind} mapping: both from and on mount points must be specified"
            ),
        }),
    }
}

/// Build one mount accessor from `directives` and register it in `manager`
/// under `on_accessor` (default `auto`).
///
/// Source accessors are resolved from the global registry and bound to
/// `scope` plus each directive's `vars`. Non-mount directives are ignored.
///
/// # Errors
///
/// - [`AccessorError::InvalidRemapping`] if a directive lacks `from` or
///   `on`, or if the directives name different `path_type`s
/// - any error resolving or binding a source accessor
pub fn install_mount_points(
    manager: &DeviceManager,
    scope: &Scope,
    directives: &[Remapping],
    on_accessor: &str,
) -> Result<(), AccessorError> {
    let on_accessor = if on_accessor.is_empty() {
        "auto"
    } else {
        on_accessor
    };

    let mounts = directives
        .iter()
        .filter_map(|directive| match directive {
            Remapping::Mount { from, on, vars } => Some((from, on, vars)),
            Remapping::Shadow { .. } => None,
        })
        .map(|(from, on, vars)| endpoints("mount", from, on).map(|(f, o)| (f, o, vars)))
        .collect::<Result<Vec<_>, _>>()?;

    if mounts.is_empty() {
        return Ok(());
    }

    let mut path_types = mounts.iter().filter_map(|(_, on, _)| on.path_type);
    let on_path_type = path_types.next().unwrap_or_default();
    if let Some(other) = path_types.find(|path_type| *path_type != on_path_type) {
        return Err(AccessorError::InvalidRemapping {
            details: format!(
                "mount directives for {on_accessor} disagree on path_type: {on_path_type} and {other}"
            ),
        });
    }

    let root_path = OSPath::empty(on_path_type);
    let root_fs = VirtualFilesystemAccessor::new(root_path.clone());
    let mut mount_fs = MountFileSystemAccessor::new(root_path.clone(), Arc::new(root_fs.clone()));

    let mut summary = Vec::with_capacity(mounts.len());
    for (from, on, vars) in mounts {
        let from_accessor = if from.accessor.is_empty() {
            "file"
        } else {
            from.accessor.as_str()
        };

        let mut bound_scope = scope.clone();
        for (key, value) in vars {
            bound_scope = bound_scope.with_var(key.clone(), value.clone());
        }
        let from_fs = device_manager::global().get_accessor(from_accessor, &bound_scope)?;

        let on_path = root_path.parse_path(&on.prefix)?;
        root_fs.set_virtual_directory(&on_path)?;
        let from_path = from.parse_prefix()?;

        tracing::debug!(
            from = %from,
            on = %on_path,
            accessor = %on_accessor,
            "installing remapped mount"
        );
        summary.push(format!("{from_accessor}:{} on {}", from.prefix, on.prefix));
        mount_fs.add_mapping(from_path, on_path, from_fs);
    }

    let descriptor = AccessorDescriptor::new(
        on_accessor,
        format!("Remapping {}", summary.join(", ")),
    );
    manager.register_described(Arc::new(mount_fs.layer(DescribeLayer::new(descriptor))));
    Ok(())
}

/// Apply every directive in `config` to `manager`.
///
/// `manager` is normally a [`copy`](DeviceManager::copy) attached to the
/// query's scope, so the global registry stays untouched.
///
/// # Errors
///
/// - [`AccessorError::InvalidRemapping`] if a directive lacks `from` or
///   `on`, or if the mounts onto one accessor disagree on `path_type`
/// - any error resolving or binding a source accessor
pub fn apply_remapping(
    manager: &DeviceManager,
    scope: &Scope,
    config: &RemappingConfig,
) -> Result<(), AccessorError> {
    let _span = tracing::debug_span!("apply_remapping", scope = %scope.name()).entered();
    let remapped_scope = scope.clone().with_device_manager(manager.clone());
    let mut mounts: BTreeMap<String, Vec<Remapping>> = BTreeMap::new();

    for directive in &config.remappings {
        match directive {
            Remapping::Shadow { from, on } => {
                let (from, on) = endpoints("shadow", from, on)?;
                let from_fs = device_manager::global().get_accessor(&from.accessor, scope)?;
                let shadow = from_fs.new_instance(&remapped_scope)?;
                tracing::debug!(from = %from.accessor, on = %on.accessor, "shadowing accessor");
                manager.register_described(Arc::new(DescribedAccessor::new(
                    shadow,
                    AccessorDescriptor::new(on.accessor.clone(), "Shadowed"),
                )));
            }
            Remapping::Mount { from, on, .. } => {
                let (_, on) = endpoints("mount", from, on)?;
                mounts
                    .entry(on.accessor.clone())
                    .or_default()
                    .push(directive.clone());
            }
        }
    }

    for (on_accessor, directives) in &mounts {
        install_mount_points(manager, scope, directives, on_accessor)?;
    }
    Ok(())
}
