//! Extraction backends
//!
//! zip and 7z archives are unpacked in-process. Everything else goes
//! through the bundled runtime tools or their system counterparts.

use crate::error::{ExtractError, Result};
use crate::util::{find_executable, find_runtime_tool};

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::Path;
use std::process::{Command, Stdio};

use super::pure::Extractor;

/// Unpack `archive` into `dest`, which must exist
pub fn run_extractor(extractor: &Extractor, archive: &Path, dest: &Path) -> Result<()> {
    match extractor {
        Extractor::Tgz => extract_tar(archive, dest, Some("-z")),
        Extractor::Txz => extract_tar(archive, dest, Some("-J")),
        Extractor::Bz2 => extract_tar(archive, dest, Some("-j")),
        Extractor::Tar => extract_tar(archive, dest, None),
        Extractor::Gzip => decompress_gz(archive, dest),
        Extractor::Exe => extract_exe(archive, dest),
        Extractor::Innoextract => extract_gog(archive, dest),
        Extractor::SevenZip(kind) => extract_7zip_family(archive, dest, kind.as_deref()),
    }
}

fn check_status(tool: &'static str, archive: &Path, status: std::process::ExitStatus) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    Err(ExtractError::ToolFailed {
        tool,
        path: archive.display().to_string(),
        code: status.code(),
    }
    .into())
}

fn extract_tar(archive: &Path, dest: &Path, compression: Option<&str>) -> Result<()> {
    let tar = find_executable("tar").ok_or(ExtractError::MissingTool("tar"))?;
    let mut cmd = Command::new(tar);
    cmd.arg("-x");
    if let Some(flag) = compression {
        cmd.arg(flag);
    }
    cmd.arg("-f").arg(archive).arg("-C").arg(dest);
    let status = cmd.status()?;
    check_status("tar", archive, status)
}

/// A `.gz` holds one file, named after the archive minus its extension
fn decompress_gz(archive: &Path, dest: &Path) -> Result<()> {
    let gzip = find_executable("gzip").ok_or(ExtractError::MissingTool("gzip"))?;
    let name = archive
        .file_stem()
        .ok_or_else(|| ExtractError::Failed(format!("invalid gzip path {}", archive.display())))?;
    let out = File::create(dest.join(name))?;

    let status = Command::new(gzip)
        .arg("-dc")
        .arg(archive)
        .stdout(Stdio::from(out))
        .status()?;
    check_status("gzip", archive, status)
}

fn innoextract_path() -> Option<std::path::PathBuf> {
    find_runtime_tool("innoextract/innoextract", "innoextract")
}

/// Whether the executable is an Inno Setup installer
pub fn check_inno_exe(archive: &Path) -> bool {
    let Some(innoextract) = innoextract_path() else {
        return false;
    };
    Command::new(innoextract)
        .arg("-i")
        .arg(archive)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

fn decompress_gog(archive: &Path, dest: &Path) -> Result<()> {
    let innoextract = innoextract_path().ok_or(ExtractError::MissingTool("innoextract"))?;
    fs::create_dir_all(dest)?;
    let status = Command::new(innoextract)
        .arg("-g")
        .arg("-d")
        .arg(dest)
        .arg("-e")
        .arg(archive)
        .status()?;
    check_status("innoextract", archive, status)
}

fn extract_gog(archive: &Path, dest: &Path) -> Result<()> {
    if !check_inno_exe(archive) {
        return Err(ExtractError::Failed("specified exe is not a GOG setup file".to_string()).into());
    }
    decompress_gog(archive, dest)
}

fn extract_exe(archive: &Path, dest: &Path) -> Result<()> {
    if check_inno_exe(archive) {
        return decompress_gog(archive, dest);
    }

    // Self-extracting archives pass the 7-zip integrity test
    let sevenza = find_runtime_tool("p7zip/7za", "7za")
        .or_else(|| find_runtime_tool("p7zip/7z", "7z"))
        .ok_or(ExtractError::MissingTool("7zip"))?;
    let status = Command::new(sevenza)
        .arg("t")
        .arg(archive)
        .stdout(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(ExtractError::NotAnArchive.into());
    }
    extract_7zip(archive, dest, None)
}

fn extract_7zip_family(archive: &Path, dest: &Path, kind: Option<&str>) -> Result<()> {
    let kind = kind.map(str::to_lowercase).or_else(|| {
        archive
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    });
    match kind.as_deref() {
        Some("zip") => extract_zip(archive, dest),
        Some("7z") => {
            sevenz_rust2::decompress_file(archive, dest)?;
            Ok(())
        }
        _ => extract_7zip(archive, dest, kind.as_deref()),
    }
}

fn extract_7zip(archive: &Path, dest: &Path, archive_type: Option<&str>) -> Result<()> {
    let sevenzip = find_runtime_tool("p7zip/7z", "7z").ok_or(ExtractError::MissingTool("7zip"))?;
    let mut cmd = Command::new(sevenzip);
    cmd.arg("x")
        .arg(archive)
        .arg(format!("-o{}", dest.display()))
        .arg("-aoa")
        .stdout(Stdio::null());
    if let Some(kind) = archive_type {
        cmd.arg(format!("-t{}", kind));
    }
    let status = cmd.status()?;
    check_status("7z", archive, status)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<()> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file))?;

    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name() else {
            tracing::warn!("Skipping unsafe path {} in {}", entry.name(), archive.display());
            continue;
        };
        let outpath = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&outpath, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Build a zip with the given (path, content) entries
    pub fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn zip_entries_are_unpacked_with_directories() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.zip");
        write_zip(&archive, &[("id1/pak0.pak", "pak"), ("readme.txt", "hi")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        run_extractor(&Extractor::SevenZip(None), &archive, &dest).unwrap();

        assert_eq!(fs::read_to_string(dest.join("id1/pak0.pak")).unwrap(), "pak");
        assert_eq!(fs::read_to_string(dest.join("readme.txt")).unwrap(), "hi");
    }

    #[test]
    fn explicit_zip_type_ignores_extension() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("data.bin");
        write_zip(&archive, &[("a.txt", "a")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        run_extractor(&Extractor::SevenZip(Some("zip".to_string())), &archive, &dest).unwrap();
        assert!(dest.join("a.txt").exists());
    }
}
