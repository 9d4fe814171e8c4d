//! Installer script interpreter
//!
//! An install goes through four stages: the script is validated and its
//! dependencies checked, the files it declares are gathered, its directives
//! run in order, and the resulting game is written to the library. Any
//! failure reverts what the install created.
//!
//! ## Module Structure
//! - `types.rs`: the interpreter state and install options
//! - `pure/`: substitution, shell splitting, directive parsing
//! - `commands/`: one file per family of directives
//! - `pipelines/`: the install stages

mod commands;
mod pipelines;
pub mod pure;
mod types;

pub use pure::substitute::substitute;
pub use types::{InstallOptions, InstallStage, Interpreter, UserInput};

use crate::paths::PATH_HOME;
use crate::script::pure::value::value_to_string;

use std::collections::HashMap;

impl Interpreter {
    /// Every variable a script can reference. File IDs come last so they
    /// shadow anything else.
    pub fn variables(&self) -> HashMap<String, String> {
        let path = |p: Option<&std::path::PathBuf>| p.map(|p| p.to_string_lossy().to_string()).unwrap_or_default();
        let (width, height) = self.resolution;

        let mut vars: HashMap<String, String> = HashMap::from([
            ("GAMEDIR".to_string(), path(self.target_path.as_ref())),
            ("CACHE".to_string(), self.cache_path().to_string_lossy().to_string()),
            ("HOME".to_string(), PATH_HOME.to_string_lossy().to_string()),
            ("STEAM_DATA_DIR".to_string(), self.steam_data_dir.to_string_lossy().to_string()),
            ("DISC".to_string(), path(self.game_disc.as_ref())),
            ("USER".to_string(), std::env::var("USER").unwrap_or_default()),
            ("INPUT".to_string(), self.last_user_input()),
            ("VERSION".to_string(), self.installer.version.clone()),
            ("RESOLUTION".to_string(), format!("{}x{}", width, height)),
            ("RESOLUTION_WIDTH".to_string(), width.to_string()),
            ("RESOLUTION_HEIGHT".to_string(), height.to_string()),
        ]);

        for (key, value) in &self.installer.variables {
            if let Some(value) = value_to_string(value) {
                vars.insert(key.clone(), value);
            }
        }
        for input in &self.user_inputs {
            if let Some(alias) = &input.alias {
                vars.insert(alias.clone(), input.value.clone());
            }
        }
        vars.extend(self.game_files.iter().map(|(k, v)| (k.clone(), v.clone())));
        vars
    }

    pub fn substitute(&self, template: &str) -> String {
        substitute(template, &self.variables())
    }

    /// A file ID resolves to its path, anything else is substituted
    pub fn get_file_path(&self, reference: &str) -> String {
        match self.game_files.get(reference) {
            Some(path) if !path.is_empty() => path.clone(),
            _ => self.substitute(reference),
        }
    }

    /// `system.env` of the script with its values substituted
    pub fn script_env(&self) -> Vec<(String, String)> {
        let vars = self.variables();
        self.script
            .system_env()
            .into_iter()
            .map(|(key, value)| (key, substitute(&value, &vars)))
            .collect()
    }

    fn last_user_input(&self) -> String {
        self.user_inputs.last().map(|i| i.value.clone()).unwrap_or_default()
    }
}
