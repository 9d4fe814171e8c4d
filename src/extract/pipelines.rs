//! Archive extraction into a game directory

use crate::error::{ExtractError, Result};
use crate::util::{merge_folders, move_path, random_id, remove_folder};

use std::fs;
use std::path::{Path, PathBuf};

use super::operations::run_extractor;
use super::pure::resolve_extractor;

/// Extract `archive` into `to_directory`.
///
/// The archive is unpacked in a scratch directory inside `to_directory`
/// first. With `merge_single`, an archive holding a single top-level
/// directory has that directory unwrapped. Existing files in the
/// destination are overwritten and existing directories merged.
pub fn extract_archive(archive: &Path, to_directory: &Path, merge_single: bool, format: Option<&str>) -> Result<()> {
    let archive = fs::canonicalize(archive).unwrap_or_else(|_| archive.to_path_buf());
    tracing::debug!("Extracting {} to {}", archive.display(), to_directory.display());

    let extractor = resolve_extractor(&archive.to_string_lossy(), format)?;

    fs::create_dir_all(to_directory)?;
    let temp_dir = to_directory.join(format!(".extract-{}", random_id()));
    fs::create_dir_all(&temp_dir)?;

    if let Err(e) = run_extractor(&extractor, &archive, &temp_dir) {
        tracing::error!("Extraction failed: {}", e);
        remove_folder(&temp_dir).ok();
        return Err(e);
    }

    let result = move_extracted(&temp_dir, to_directory, merge_single);
    remove_folder(&temp_dir)?;
    result?;

    tracing::debug!("Finished extracting {} to {}", archive.display(), to_directory.display());
    Ok(())
}

fn move_extracted(temp_dir: &Path, to_directory: &Path, merge_single: bool) -> Result<()> {
    let mut source_root = temp_dir.to_path_buf();
    if merge_single {
        let entries = list_dir(temp_dir)?;
        if let [single] = entries.as_slice() {
            source_root = single.clone();
        }
    }

    if source_root.is_file() {
        let name = source_root
            .file_name()
            .ok_or_else(|| ExtractError::Failed("extracted file has no name".to_string()))?;
        let destination = to_directory.join(name);
        if destination.is_file() {
            tracing::warn!("Overwrite existing file {}", destination.display());
            fs::remove_file(&destination)?;
        } else if destination.is_dir() {
            let mut aside = destination.clone().into_os_string();
            aside.push(random_id());
            fs::rename(&destination, aside)?;
        }
        return move_path(&source_root, &destination);
    }

    for source in list_dir(&source_root)? {
        let Some(name) = source.file_name() else {
            continue;
        };
        let destination = to_directory.join(name);

        if destination.is_file() {
            tracing::warn!("Overwrite existing path {}", destination.display());
            fs::remove_file(&destination)?;
            move_path(&source, &destination)?;
        } else if destination.is_dir() {
            tracing::warn!("Overwrite existing path {}", destination.display());
            if let Err(e) = merge_folders(&source, &destination) {
                tracing::error!("Failed to merge to destination {}: {}", destination.display(), e);
                return Err(ExtractError::Failed(e.to_string()).into());
            }
        } else {
            move_path(&source, &destination)?;
        }
    }
    Ok(())
}

fn list_dir(path: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(path)? {
        entries.push(entry?.path());
    }
    entries.sort();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::operations::tests::write_zip;

    #[test]
    fn single_top_level_directory_is_unwrapped() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("quake.zip");
        write_zip(&archive, &[("Quake/id1/pak0.pak", "pak"), ("Quake/quake.exe", "exe")]);

        let dest = dir.path().join("games/quake");
        extract_archive(&archive, &dest, true, None).unwrap();

        assert!(dest.join("id1/pak0.pak").exists());
        assert!(dest.join("quake.exe").exists());
        assert!(!dest.join("Quake").exists());
        let leftovers: Vec<_> = fs::read_dir(&dest)
            .unwrap()
            .flatten()
            .filter(|e| e.file_name().to_string_lossy().starts_with(".extract-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn nomerge_keeps_the_top_level_directory() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("quake.zip");
        write_zip(&archive, &[("Quake/quake.exe", "exe")]);

        let dest = dir.path().join("out");
        extract_archive(&archive, &dest, false, None).unwrap();
        assert!(dest.join("Quake/quake.exe").exists());
    }

    #[test]
    fn existing_files_are_overwritten_and_directories_merged() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("patch.zip");
        write_zip(&archive, &[("id1/pak1.pak", "new"), ("config.cfg", "patched")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(dest.join("id1")).unwrap();
        fs::write(dest.join("id1/pak0.pak"), "old").unwrap();
        fs::write(dest.join("config.cfg"), "original").unwrap();

        extract_archive(&archive, &dest, true, None).unwrap();

        assert_eq!(fs::read_to_string(dest.join("id1/pak0.pak")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dest.join("id1/pak1.pak")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest.join("config.cfg")).unwrap(), "patched");
    }

    #[test]
    fn single_file_archive_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("exe.zip");
        write_zip(&archive, &[("game.bin", "v2")]);

        let dest = dir.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("game.bin"), "v1").unwrap();

        extract_archive(&archive, &dest, true, None).unwrap();
        assert_eq!(fs::read_to_string(dest.join("game.bin")).unwrap(), "v2");
    }

    #[test]
    fn unknown_archive_type_fails_before_touching_dest() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("notes.txt");
        fs::write(&archive, "text").unwrap();
        let dest = dir.path().join("out");
        assert!(extract_archive(&archive, &dest, true, None).is_err());
        assert!(!dest.exists());
    }
}
