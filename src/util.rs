use crate::error::{Result, scripting};
use crate::paths::{PATH_HOME, PATH_RUNTIME};

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Running as root makes every file the installer creates root-owned
pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail
    unsafe { libc::geteuid() == 0 }
}

/// Short random identifier for temporary directory names
pub fn random_id() -> String {
    std::iter::repeat_with(fastrand::alphanumeric)
        .take(8)
        .collect::<String>()
        .to_lowercase()
}

/// Copy the content of `src` into `dest`, overwriting files that already exist
/// and keeping whatever else `dest` contains.
pub fn merge_folders(src: &Path, dest: &Path) -> Result<()> {
    tracing::debug!("Merging {} into {}", src.display(), dest.display());

    let walk_path = walkdir::WalkDir::new(src).min_depth(1).follow_links(false);

    for entry in walk_path {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(src)?;
        let new_path = dest.join(rel_path);

        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&new_path)?;
        } else if entry.file_type().is_symlink() {
            let symlink_src = std::fs::read_link(entry.path())?;
            if new_path.symlink_metadata().is_ok() {
                std::fs::remove_file(&new_path)?;
            }
            std::os::unix::fs::symlink(symlink_src, new_path)?;
        } else {
            if let Some(parent) = new_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            if new_path.exists() {
                std::fs::remove_file(&new_path)?;
            }

            std::fs::copy(entry.path(), new_path)?;
        }
    }

    Ok(())
}

/// Move a file or directory. Falls back to copy + delete across filesystems.
pub fn move_path(src: &Path, dest: &Path) -> Result<()> {
    if std::fs::rename(src, dest).is_ok() {
        return Ok(());
    }
    if src.is_dir() {
        std::fs::create_dir_all(dest)?;
        merge_folders(src, dest)?;
        std::fs::remove_dir_all(src)?;
    } else {
        std::fs::copy(src, dest)?;
        std::fs::remove_file(src)?;
    }
    Ok(())
}

/// Delete a folder, refusing to touch the home directory
pub fn remove_folder(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }
    let same_as_home = match (path.canonicalize(), PATH_HOME.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => path == PATH_HOME.as_path(),
    };
    if same_as_home {
        return scripting("Refusing to erase the home directory!");
    }
    tracing::debug!("Removing folder {}", path.display());
    std::fs::remove_dir_all(path)?;
    Ok(())
}

pub fn is_executable(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// chmod +x for user, group and others
pub fn make_executable(path: &Path) -> Result<()> {
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o111);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

/// Resolve an executable name the way a shell would: paths are taken as is,
/// bare names are looked up in PATH.
pub fn find_executable(exec_name: &str) -> Option<PathBuf> {
    if exec_name.is_empty() {
        return None;
    }
    if exec_name.contains('/') {
        let path = PathBuf::from(exec_name);
        return is_executable(&path).then_some(path);
    }
    let search_path = std::env::var_os("PATH")?;
    std::env::split_paths(&search_path)
        .map(|dir| dir.join(exec_name))
        .find(|candidate| is_executable(candidate))
}

/// Look for a helper tool in the bundled runtime first, then on the system
pub fn find_runtime_tool(relative: &str, name: &str) -> Option<PathBuf> {
    let bundled = PATH_RUNTIME.join(relative);
    if is_executable(&bundled) {
        return Some(bundled);
    }
    find_executable(name)
}

/// Find `path` on disk ignoring the case of every component that doesn't
/// match exactly. Discs burnt for Windows rarely agree on case.
pub fn fix_path_case(path: &Path) -> Option<PathBuf> {
    if path.exists() || !path.is_absolute() {
        return Some(path.to_path_buf());
    }
    let mut current = PathBuf::from("/");
    for component in path.components().skip(1) {
        let wanted = component.as_os_str().to_string_lossy().to_lowercase();
        let exact = current.join(component);
        if exact.exists() {
            current = exact;
            continue;
        }
        let entries = std::fs::read_dir(&current).ok()?;
        let found = entries
            .flatten()
            .find(|e| e.file_name().to_string_lossy().to_lowercase() == wanted)?;
        current = found.path();
    }
    Some(current)
}

/// Whether a directory is missing or empty
pub fn path_is_empty(path: &Path) -> bool {
    match std::fs::read_dir(path) {
        Ok(mut entries) => entries.next().is_none(),
        Err(_) => true,
    }
}

/// Mount points of optical discs and disc images
pub fn mounted_discs() -> Vec<PathBuf> {
    match std::fs::read_to_string("/proc/mounts") {
        Ok(content) => parse_mounts(&content),
        Err(e) => {
            tracing::debug!("Can't read /proc/mounts: {}", e);
            Vec::new()
        }
    }
}

fn parse_mounts(content: &str) -> Vec<PathBuf> {
    content
        .lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            // Spaces in mount points are escaped as \040
            let mount_point = fields.next()?.replace("\\040", " ");
            let fstype = fields.next()?;

            let is_disc = device.starts_with("/dev/sr")
                || device.starts_with("/dev/cdrom")
                || matches!(fstype, "iso9660" | "udf")
                || ["/media/", "/run/media/", "/mnt/"].iter().any(|p| mount_point.starts_with(p));
            is_disc.then(|| PathBuf::from(mount_point))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_folders_overwrites_and_keeps_existing() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        std::fs::create_dir_all(src.join("data")).unwrap();
        std::fs::create_dir_all(&dest).unwrap();
        std::fs::write(src.join("data/level.pak"), "new").unwrap();
        std::fs::write(src.join("readme.txt"), "hello").unwrap();
        std::fs::create_dir_all(dest.join("data")).unwrap();
        std::fs::write(dest.join("data/level.pak"), "old").unwrap();
        std::fs::write(dest.join("data/save.dat"), "keep").unwrap();

        merge_folders(&src, &dest).unwrap();

        assert_eq!(std::fs::read_to_string(dest.join("data/level.pak")).unwrap(), "new");
        assert_eq!(std::fs::read_to_string(dest.join("data/save.dat")).unwrap(), "keep");
        assert_eq!(std::fs::read_to_string(dest.join("readme.txt")).unwrap(), "hello");
    }

    #[test]
    fn make_executable_sets_exec_bits() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("setup.sh");
        std::fs::write(&script, "#!/bin/sh\n").unwrap();
        assert!(!is_executable(&script));
        make_executable(&script).unwrap();
        assert!(is_executable(&script));
        assert_eq!(find_executable(script.to_str().unwrap()), Some(script));
    }

    #[test]
    fn fix_path_case_finds_differently_cased_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("SETUP")).unwrap();
        std::fs::write(dir.path().join("SETUP/Install.EXE"), "").unwrap();

        let fixed = fix_path_case(&dir.path().join("setup/install.exe")).unwrap();
        assert_eq!(fixed, dir.path().join("SETUP/Install.EXE"));
        assert!(fix_path_case(&dir.path().join("setup/missing.exe")).is_none());
    }

    #[test]
    fn fix_path_case_leaves_relative_paths_alone() {
        let relative = Path::new("setup/INSTALL.EXE");
        assert_eq!(fix_path_case(relative), Some(relative.to_path_buf()));
    }

    #[test]
    fn random_id_is_eight_lowercase_chars() {
        let id = random_id();
        assert_eq!(id.len(), 8);
        assert_eq!(id, id.to_lowercase());
    }

    #[test]
    fn remove_folder_ignores_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        remove_folder(&dir.path().join("nope")).unwrap();
    }

    #[test]
    fn parse_mounts_keeps_discs_and_images() {
        let mounts = "\
/dev/nvme0n1p2 / ext4 rw,relatime 0 0
/dev/sr0 /run/media/user/GAME\\040DISC iso9660 ro 0 0
/dev/loop3 /tmp/image udf ro 0 0
/dev/loop7 /snap/core22/1380 squashfs ro,nodev 0 0
/dev/sdb1 /mnt/usb vfat rw 0 0
proc /proc proc rw 0 0
";
        assert_eq!(
            parse_mounts(mounts),
            vec![
                PathBuf::from("/run/media/user/GAME DISC"),
                PathBuf::from("/tmp/image"),
                PathBuf::from("/mnt/usb"),
            ]
        );
    }
}
