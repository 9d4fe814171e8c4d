use crate::error::{Result, ScriptingError};
use crate::extract::extract_archive;
use crate::interpreter::pure::command::{check_required_params, has_param, param_str};
use crate::interpreter::types::Interpreter;

use serde_yaml::Value;
use std::path::PathBuf;

impl Interpreter {
    /// Extract one archive, or every archive a glob pattern matches
    pub(super) fn extract(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["file", "src"]], params, "extract")?;
        let source = param_str(params, "file")
            .or_else(|| param_str(params, "src"))
            .unwrap_or_default();
        let filespec = self.get_file_path(&source);

        let filenames: Vec<PathBuf> = if PathBuf::from(&filespec).exists() {
            vec![PathBuf::from(&filespec)]
        } else {
            match glob::glob(&filespec) {
                Ok(paths) => paths.flatten().collect(),
                Err(e) => {
                    tracing::debug!("Invalid pattern {}: {}", filespec, e);
                    Vec::new()
                }
            }
        };
        if filenames.is_empty() {
            return Err(ScriptingError::new(format!("{} does not exist", filespec)).into());
        }

        let dest_path = match param_str(params, "dst") {
            Some(dst) => PathBuf::from(self.substitute(&dst)),
            None => self
                .target_path
                .clone()
                .ok_or_else(|| ScriptingError::with_data("No destination for extract", params))?,
        };
        let merge_single = !has_param(params, "nomerge");
        let format = param_str(params, "format");

        for filename in &filenames {
            let name = filename.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
            self.status = format!("Extracting {}", name);
            tracing::info!("{}", self.status);
            extract_archive(filename, &dest_path, merge_single, format.as_deref())?;
        }
        tracing::debug!("Extract done");
        Ok(())
    }
}
