//! Builds a small union mount and a remapped scope, then walks them.
//!
//! ```text
//! cargo run --example mount_tree
//! ```

use std::sync::Arc;

use vfs_accessors::{
    AccessorError, AccessorExt, DeviceManager, FileSystemAccessor, MountFileSystemAccessor,
    OSPath, PathType, RemappingConfig, Scope, VirtualFileInfo, VirtualFilesystemAccessor,
    apply_remapping, get_accessor, register,
};

fn image() -> Result<VirtualFilesystemAccessor, AccessorError> {
    let root = OSPath::empty(PathType::Linux);
    let vfs = VirtualFilesystemAccessor::new(root.clone());
    for (path, contents) in [
        ("/Windows/System32/drivers/etc/hosts", "127.0.0.1 localhost\n"),
        ("/Users/alice/NTUSER.DAT", "regf"),
        ("/pagefile.sys", ""),
    ] {
        let path = root.parse_path(path)?;
        vfs.set_virtual_file_info(VirtualFileInfo::file(path, contents))?;
    }
    Ok(vfs)
}

fn walk(accessor: &dyn FileSystemAccessor, path: &OSPath, depth: usize) -> Result<(), AccessorError> {
    for info in accessor.read_dir_with_os_path(path)? {
        println!(
            "{:indent$}{} {:>6} {}",
            "",
            info.mode(),
            info.size(),
            info.name(),
            indent = depth * 2
        );
        if info.is_dir() {
            walk(accessor, info.os_path(), depth + 1)?;
        }
    }
    Ok(())
}

fn main() -> Result<(), AccessorError> {
    // A hand-built union: an image mounted under /mnt/image.
    let root = OSPath::empty(PathType::Linux);
    let base = VirtualFilesystemAccessor::new(root.clone());
    base.set_virtual_directory(&root.append(["mnt", "image"]))?;

    let mut union = MountFileSystemAccessor::new(root.clone(), Arc::new(base));
    union.add_mapping(root.clone(), root.append(["mnt", "image"]), Arc::new(image()?));

    println!("== union mount");
    walk(&union, &root, 0)?;
    for mount_point in union.mount_points() {
        println!("mount point: {mount_point}");
    }

    // The same image remapped onto a Windows drive for one query.
    register("image", Arc::new(image()?), "Acquired disk image");
    let config = RemappingConfig::from_yaml(
        r#"
remappings:
  - type: mount
    from:
      accessor: image
      prefix: /
    on:
      accessor: auto
      prefix: 'C:\'
      path_type: windows
"#,
    )?;

    let manager = vfs_accessors::global().copy();
    apply_remapping(&manager, &Scope::default(), &config)?;
    let scope = Scope::new("demo").with_device_manager(manager.clone());

    println!("== remapped scope");
    for descriptor in manager.describe_all() {
        println!("{:<8} {}", descriptor.name, descriptor.description);
    }

    let auto = get_accessor("auto", &scope)?;
    let hosts = auto.read_to_string(r"C:\Windows\System32\drivers\etc\hosts")?;
    print!("hosts: {hosts}");

    let info = auto.lstat(r"C:\Windows\..\Users\alice\NTUSER.DAT")?;
    println!("{} ({} bytes)", info.full_path(), info.size());

    let isolated = DeviceManager::new();
    match isolated.get_accessor("auto", &scope) {
        Ok(_) => println!("unexpected: auto registered in an empty registry"),
        Err(e) => println!("empty registry: {e}"),
    }

    Ok(())
}
