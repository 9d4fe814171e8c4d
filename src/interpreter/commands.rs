//! Directives of the `installer:` section
//!
//! Each directive is a method of the interpreter. Parameters arrive raw,
//! every handler substitutes the values it uses.

mod execute;
mod extract;
mod files;
mod input;
mod task;
mod write;

use crate::error::{Result, ScriptingError};
use crate::script::value_to_string;
use crate::util::make_executable;

use serde_yaml::Value;
use std::fs;
use std::path::PathBuf;

use super::types::Interpreter;

impl Interpreter {
    pub(super) fn run_command(&mut self, name: &str, params: &Value) -> Result<()> {
        match name {
            "chmodx" => self.chmodx(params),
            "execute" => self.execute(params),
            "extract" => self.extract(params),
            "input_menu" => self.input_menu(params),
            "insert_disc" => self.insert_disc(params),
            "mkdir" => self.mkdir(params),
            "merge" | "copy" => self.merge(params),
            "move" => self.move_files(params),
            "rename" => self.rename(params),
            "substitute_vars" => self.substitute_vars(params),
            "write_file" => self.write_file(params),
            "write_json" => self.write_json(params),
            "write_config" => self.write_config(params),
            "task" => self.task(params),
            _ => Err(ScriptingError::new(format!("The command \"{}\" does not exist.", name)).into()),
        }
    }

    /// Argument of the single-valued directives (`chmodx`, `mkdir`)
    fn scalar_param(&self, params: &Value, command: &str) -> Result<String> {
        value_to_string(params)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ScriptingError::with_data(format!("Wrong value for '{}' param", command), params).into())
    }

    fn chmodx(&mut self, params: &Value) -> Result<()> {
        let filename = self.scalar_param(params, "chmodx")?;
        let path = PathBuf::from(self.get_file_path(&filename));
        if !path.exists() {
            return Err(ScriptingError::new(format!(
                "Invalid file '{}'. Can't make it executable",
                path.display()
            ))
            .into());
        }
        make_executable(&path)
    }

    fn mkdir(&mut self, params: &Value) -> Result<()> {
        let directory = self.scalar_param(params, "mkdir")?;
        let path = PathBuf::from(self.substitute(&directory));
        fs::create_dir_all(&path)?;
        tracing::debug!("Created {}", path.display());
        Ok(())
    }
}
