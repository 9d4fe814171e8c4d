//! merge, move, rename and substitute_vars

use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::command::{check_required_params, param_bool};
use crate::interpreter::types::Interpreter;
use crate::script::value_to_string;
use crate::util::{merge_folders, move_path, random_id};

use serde_yaml::Value;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

impl Interpreter {
    /// `src` may be a file ID, `dst` is always a path. Trailing slashes are
    /// dropped from both.
    fn move_paths(&self, params: &Value) -> Result<(PathBuf, PathBuf)> {
        let src_ref = params
            .get("src")
            .and_then(value_to_string)
            .ok_or_else(|| ScriptingError::new("Missing parameter src"))?;
        let src = self.get_file_path(&src_ref);
        if src.is_empty() {
            return Err(ScriptingError::with_data("Wrong value for 'src' param", &src_ref).into());
        }

        let dst_ref = params.get("dst").and_then(value_to_string).unwrap_or_default();
        let dst = self.substitute(&dst_ref);
        if dst.is_empty() {
            return Err(ScriptingError::with_data("Wrong value for 'dst' param", &dst_ref).into());
        }

        Ok((strip_trailing_slash(&src), strip_trailing_slash(&dst)))
    }

    fn is_cached_file(&self, path: &Path) -> bool {
        self.options
            .persistent_cache
            .as_ref()
            .is_some_and(|cache| path.starts_with(cache))
    }

    /// Copy `src` into `dst`. A file copied under a file ID makes the ID
    /// point at the copy.
    pub(super) fn merge(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["src"], &["dst"]], params, "merge")?;
        let (src, dst) = self.move_paths(params)?;
        tracing::debug!("Merging {} into {}", src.display(), dst.display());

        if !src.exists() {
            if param_bool(params, "optional", false) {
                tracing::info!("Optional path {} not present", src.display());
                return Ok(());
            }
            return Err(ScriptingError::with_data(format!("Source does not exist: {}", src.display()), params).into());
        }
        fs::create_dir_all(&dst)?;

        if src.is_dir() {
            return merge_folders(&src, &dst);
        }

        let Some(name) = src.file_name() else {
            return Err(ScriptingError::with_data("Wrong value for 'src' param", &src).into());
        };
        let copied = dst.join(name);
        if src.parent() != Some(dst.as_path()) {
            fs::copy(&src, &copied)?;
        }
        if let Some(src_ref) = params.get("src").and_then(value_to_string)
            && let Some(path) = self.game_files.get_mut(&src_ref)
        {
            *path = copied.to_string_lossy().to_string();
        }
        Ok(())
    }

    /// Move `src` into the `dst` folder, or to `dst` when it doesn't exist
    /// yet. Files of the persistent cache are copied so they stay cached.
    pub(super) fn move_files(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["src"], &["dst"]], params, "move")?;
        let (src, dst) = self.move_paths(params)?;
        tracing::debug!("Moving {} to {}", src.display(), dst.display());

        if !src.exists() {
            if param_bool(params, "optional", false) {
                tracing::info!("Optional path {} not present", src.display());
                return Ok(());
            }
            return Err(ScriptingError::new(format!("Invalid source for 'move' operation: {}", src.display())).into());
        }

        let name = src
            .file_name()
            .ok_or_else(|| ScriptingError::with_data("Wrong value for 'src' param", &src))?;
        if src.is_file() {
            if src.parent() == Some(dst.as_path()) {
                tracing::info!("Source file is the same as destination, skipping");
                return Ok(());
            }
            if dst.join(name).exists() {
                tracing::info!("Destination file exists, skipping");
                return Ok(());
            }
        }

        let target = if dst.is_dir() { dst.join(name) } else { dst.clone() };
        let collision = || {
            ScriptingError::new(format!(
                "Can't move {} \nto destination {}",
                src.display(),
                dst.display()
            ))
        };
        if target.exists() {
            return Err(collision().into());
        }
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let moved = if self.is_cached_file(&src) {
            if src.is_dir() {
                fs::create_dir_all(&target).map_err(Into::into).and_then(|_| merge_folders(&src, &target))
            } else {
                fs::copy(&src, &target).map(|_| ()).map_err(Into::into)
            }
        } else {
            move_path(&src, &target)
        };
        moved.map_err(|e| {
            tracing::error!("Move failed: {}", e);
            collision().into()
        })
    }

    pub(super) fn rename(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["src"], &["dst"]], params, "rename")?;
        let (src, dst) = self.move_paths(params)?;

        if !src.exists() {
            return Err(ScriptingError::new(format!(
                "Rename error, source path does not exist: {}",
                src.display()
            ))
            .into());
        }
        if dst.is_dir() {
            // Only succeeds on empty directories
            let _ = fs::remove_dir(&dst);
        }
        if dst.exists() {
            return Err(ScriptingError::new(format!(
                "Rename error, destination already exists: {}",
                dst.display()
            ))
            .into());
        }

        // Stage next to dst so the final rename never crosses filesystems
        let dst_dir = dst.parent().map(Path::to_path_buf).unwrap_or_default();
        let temp_dir = dst_dir.join(format!("rename-temp-{}", random_id()));
        fs::create_dir_all(&temp_dir)?;
        let name = src
            .file_name()
            .ok_or_else(|| ScriptingError::with_data("Wrong value for 'src' param", &src))?;
        let staged = temp_dir.join(name);

        let result = move_path(&src, &staged).and_then(|_| fs::rename(&staged, &dst).map_err(Into::into));
        if let Err(e) = fs::remove_dir_all(&temp_dir) {
            tracing::debug!("Failed to remove {}: {}", temp_dir.display(), e);
        }
        result
    }

    /// Substitute variables in a file, line by line
    pub(super) fn substitute_vars(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["file"]], params, "substitute_vars")?;
        let filename = self.substitute(&params.get("file").and_then(value_to_string).unwrap_or_default());
        tracing::debug!("Substituting variables for file {}", filename);

        let vars = self.variables();
        let content = fs::read_to_string(&filename)?;
        let tmp_filename = format!("{}.tmp", filename);
        {
            let mut dest = BufWriter::new(fs::File::create(&tmp_filename)?);
            for line in content.split_inclusive('\n') {
                dest.write_all(crate::interpreter::substitute(line, &vars).as_bytes())?;
            }
            dest.flush()?;
        }
        fs::rename(&tmp_filename, &filename)?;
        Ok(())
    }
}

fn strip_trailing_slash(path: &str) -> PathBuf {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("/")
    } else {
        PathBuf::from(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slashes_are_dropped() {
        assert_eq!(strip_trailing_slash("/tmp/game/"), PathBuf::from("/tmp/game"));
        assert_eq!(strip_trailing_slash("/tmp/game"), PathBuf::from("/tmp/game"));
        assert_eq!(strip_trailing_slash("/"), PathBuf::from("/"));
    }
}
