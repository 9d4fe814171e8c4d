//! Running the `installer:` directives

use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::command::command_name_and_params;
use crate::interpreter::types::{InstallStage, Interpreter};
use crate::script::pure::validation::is_steam_runner;
use crate::script::pure::value::value_to_string;
use crate::steam::find_game_path;

use serde_yaml::Value;
use std::fs;

impl Interpreter {
    pub(super) fn run_commands(&mut self) -> Result<()> {
        self.stage = InstallStage::RunningCommands;
        fs::create_dir_all(self.cache_path())?;

        if is_steam_runner(&self.installer.runner) {
            self.locate_steam_game()?;
        }

        let commands = self.script.commands();
        for (index, command) in commands.iter().enumerate() {
            let (name, mut params) = command_name_and_params(command)?;

            if let Value::Mapping(map) = &mut params
                && let Some(description) = map.remove("description")
                && let Some(description) = value_to_string(&description)
            {
                tracing::info!("{}", description);
                self.status = description;
            }

            tracing::debug!("Installer command {}/{}: {} {:?}", index + 1, commands.len(), name, params);
            self.run_command(&name, &params)?;
        }
        Ok(())
    }

    /// Steam games are not installed by us, but `$GAMEDIR` must point at
    /// the copy Steam already has
    fn locate_steam_game(&mut self) -> Result<()> {
        let appid = self
            .script
            .game_str("appid")
            .ok_or_else(|| ScriptingError::new("Missing appid for Steam game"))?;
        let parsed: u32 = appid
            .parse()
            .map_err(|_| ScriptingError::with_data("Invalid Steam appid", &appid))?;

        match find_game_path(parsed) {
            Some(path) => {
                tracing::info!("Found Steam game {} in {}", appid, path.display());
                self.target_path = Some(path);
                Ok(())
            }
            None => Err(ScriptingError::new(format!(
                "Steam game {} is not installed, install it from the Steam client first",
                appid
            ))
            .into()),
        }
    }
}
