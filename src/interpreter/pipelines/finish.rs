//! Recording the installed game

use crate::error::{Result, ScriptingError};
use crate::interpreter::types::{InstallStage, Interpreter};
use crate::library::GameRecord;
use crate::script::{get_game_launcher, value_as_i64, value_to_string};

use serde_yaml::{Mapping, Value};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

impl Interpreter {
    pub(super) fn finish_install(&mut self) -> Result<()> {
        self.stage = InstallStage::Finishing;

        if let Some(extends) = &self.extends {
            tracing::info!("This is an extension to {}, not creating a new game entry", extends);
            return Ok(());
        }

        let installed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        let configpath = format!("{}-{}", self.installer.slug, installed_at);

        let mut config = self.base_config()?;

        let record = GameRecord {
            id: self.game_id.unwrap_or(0),
            name: self.game_name.clone(),
            slug: self.installer.game_slug.clone(),
            installer_slug: self.installer.slug.clone(),
            parent_slug: self.requires.clone(),
            runner: self.installer.runner.clone(),
            directory: self.target_path.clone(),
            installed: true,
            year: self.installer.year.as_ref().and_then(value_as_i64),
            steamid: self.installer.steamid.as_ref().and_then(value_as_i64),
            configpath: configpath.clone(),
            installed_at,
        };
        let id = self.library.add_or_update(record);
        self.game_id = Some(id);
        tracing::debug!("Saved game entry {} ({})", self.installer.game_slug, id);

        if let Some(system) = self.script.get("system") {
            config.insert("system".into(), self.substitute_config(system)?);
        }
        let runner = self.installer.runner.clone();
        if self.script.has_section(&runner)
            && let Some(section) = self.script.get(&runner)
        {
            let section = self.substitute_config(section)?;
            config.insert(runner.into(), section);
        }

        let mut game = match config.remove("game") {
            Some(Value::Mapping(game)) => game,
            _ => Mapping::new(),
        };
        if let Some(launcher) = get_game_launcher(self.script.mapping()) {
            let value = self.resolve_launcher(&launcher.value);
            game.insert(launcher.key.into(), value);
        }
        if let Some(section) = self.script.get("game") {
            let Some(section) = section.as_mapping() else {
                return Err(ScriptingError::with_data("Invalid 'game' section", section).into());
            };
            for (key, value) in section {
                game.insert(key.clone(), value.clone());
            }
            game = match self.substitute_config(&Value::Mapping(game))? {
                Value::Mapping(game) => game,
                _ => Mapping::new(),
            };
        }
        config.insert("game".into(), Value::Mapping(game));

        let written = self.library.write_game_config(&configpath, &Value::Mapping(config))?;
        tracing::info!("Game config written to {}", written.display());
        self.library.save()?;

        self.report_launcher();
        Ok(())
    }

    /// The config of the base game when this install requires one, otherwise
    /// an empty `game` section
    fn base_config(&self) -> Result<Mapping> {
        let mut config = Mapping::new();
        config.insert("game".into(), Value::Mapping(Mapping::new()));

        let Some(requires) = &self.requires else {
            return Ok(config);
        };
        let Some(base) = self.library.get_by_installer_slug(requires) else {
            return Ok(config);
        };
        let path = self.library.config_file(&base.configpath);
        if !path.exists() {
            tracing::warn!("Config of {} not found at {}", requires, path.display());
            return Ok(config);
        }

        let content = std::fs::read_to_string(&path)?;
        if let Value::Mapping(base) = serde_yaml::from_str::<Value>(&content)? {
            config.extend(base);
        }
        if !config.get("game").is_some_and(Value::is_mapping) {
            config.insert("game".into(), Value::Mapping(Mapping::new()));
        }
        Ok(config)
    }

    /// File IDs in a launcher point at their files. A relative path that
    /// exists in the game folder is made absolute.
    fn resolve_launcher(&self, value: &Value) -> Value {
        if let Value::Sequence(items) = value {
            return Value::Sequence(
                items
                    .iter()
                    .map(|item| match value_to_string(item).and_then(|id| self.game_files.get(&id)) {
                        Some(path) => Value::from(path.as_str()),
                        None => item.clone(),
                    })
                    .collect(),
            );
        }

        let Some(launcher) = value_to_string(value) else {
            return value.clone();
        };
        if let Some(path) = self.game_files.get(&launcher) {
            return Value::from(path.as_str());
        }
        if let Some(target) = &self.target_path
            && target.join(&launcher).exists()
        {
            return Value::from(target.join(&launcher).to_string_lossy().to_string());
        }
        value.clone()
    }

    /// Substitute the values of a config section. `"true"` and `"false"`
    /// strings become booleans, nested mappings are substituted one level deep.
    pub(crate) fn substitute_config(&self, section: &Value) -> Result<Value> {
        let Some(section) = section.as_mapping() else {
            return Ok(Value::Mapping(Mapping::new()));
        };
        let vars = self.variables();
        let sub = |value: &Value| match value {
            Value::String(s) => Value::from(crate::interpreter::substitute(s, &vars)),
            other => other.clone(),
        };

        let mut config = Mapping::new();
        for (key, value) in section {
            if !key.is_string() {
                return Err(ScriptingError::with_data("Game config key must be a string", key).into());
            }
            let value = match value {
                Value::String(s) if s.eq_ignore_ascii_case("true") => Value::Bool(true),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Value::Bool(false),
                Value::Sequence(items) => Value::Sequence(items.iter().map(sub).collect()),
                Value::Mapping(map) => Value::Mapping(map.iter().map(|(k, v)| (k.clone(), sub(v))).collect()),
                other => sub(other),
            };
            config.insert(key.clone(), value);
        }
        Ok(Value::Mapping(config))
    }

    /// Tell the user whether the game can be started
    fn report_launcher(&self) {
        let launcher = self
            .script
            .game()
            .and_then(get_game_launcher)
            .and_then(|launcher| value_to_string(&launcher.value));

        if let Some(launcher) = launcher {
            let mut path = Path::new(&self.substitute(&launcher)).to_path_buf();
            if path.is_relative()
                && let Some(target) = &self.target_path
            {
                path = target.join(path);
            }
            if !path.is_file() && !matches!(self.installer.runner.as_str(), "web" | "browser") {
                tracing::warn!(
                    "The executable at path {} can't be found, please check the destination folder. \
                     Some parts of the installation process may have not completed successfully.",
                    path.display()
                );
                return;
            }
        }

        match self.script.install_complete_text() {
            Some(text) => tracing::info!("{}", text),
            None => tracing::info!("Installation completed!"),
        }
    }
}
