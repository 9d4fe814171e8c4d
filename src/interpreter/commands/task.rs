use crate::error::{Result, ScriptingError};
use crate::interpreter::pure::command::{check_required_params, param_str};
use crate::interpreter::types::Interpreter;
use crate::script::value_to_string;
use crate::tasks::{TaskParams, WINE_DEFAULT_ARCH, run_task};

use serde_yaml::{Mapping, Value};
use std::path::PathBuf;

impl Interpreter {
    /// Wine version asked for by the script, or the one of the base game
    fn runner_version(&self) -> Option<String> {
        if let Some(section) = self.script.get(&self.installer.runner).filter(|s| s.is_mapping()) {
            return section.get("version").and_then(value_to_string);
        }

        let requires = self.requires.as_ref()?;
        let Some(game) = self
            .library
            .get_by_installer_slug(requires)
            .or_else(|| self.library.get_by_slug(requires))
        else {
            tracing::warn!("Can't find game {}", requires);
            return None;
        };

        let content = std::fs::read_to_string(self.library.config_file(&game.configpath)).ok()?;
        let config: Value = serde_yaml::from_str(&content).ok()?;
        config
            .get(&game.runner)
            .and_then(|section| section.get("version"))
            .and_then(value_to_string)
    }

    /// Wine binary of the runner version used by this install, when that
    /// version is installed
    pub(crate) fn get_wine_path(&self) -> Option<PathBuf> {
        let version = self.runner_version().filter(|v| !v.is_empty())?;
        let wine = self.options.wine_runners_dir.join(&version).join("bin/wine");
        if wine.is_file() {
            Some(wine)
        } else {
            tracing::warn!("Wine {} is not installed, using the system wine", version);
            None
        }
    }

    /// Run a runner task, e.g. `wine.create_prefix` or just `winetricks`
    pub(super) fn task(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["name"]], params, "task")?;
        let name = param_str(params, "name").unwrap_or_default();
        let (runner, task_name) = match name.split('.').collect::<Vec<_>>().as_slice() {
            [task] => (self.installer.runner.clone(), task.to_string()),
            [runner, task] => (runner.to_string(), task.to_string()),
            _ => return Err(ScriptingError::with_data("Invalid task name", &name).into()),
        };

        let mut data: Mapping = params.as_mapping().cloned().unwrap_or_default();
        data.remove("name");

        if runner.starts_with("wine") {
            if let Some(wine_path) = self.get_wine_path() {
                data.insert("wine_path".into(), wine_path.to_string_lossy().to_string().into());
            }
            let from_game = |key: &str, fallback: &str| {
                param_str(params, key)
                    .or_else(|| self.script.game_str(key))
                    .unwrap_or_else(|| fallback.to_string())
            };
            data.insert("prefix".into(), from_game("prefix", "$GAMEDIR").into());
            data.insert("arch".into(), from_game("arch", WINE_DEFAULT_ARCH).into());
            if task_name == "wineexec" {
                let env: Mapping = self
                    .script_env()
                    .into_iter()
                    .map(|(k, v)| (Value::from(k), Value::from(v)))
                    .collect();
                data.insert("env".into(), Value::Mapping(env));
            }
        }

        let vars = self.variables();
        let sub = |value: &Value| match value {
            Value::String(s) => Value::from(crate::interpreter::substitute(s, &vars)),
            other => other.clone(),
        };
        let substituted: Mapping = data
            .iter()
            .map(|(key, value)| {
                let value = match value {
                    Value::Mapping(map) => Value::Mapping(map.iter().map(|(k, v)| (k.clone(), sub(v))).collect()),
                    Value::Sequence(items) => Value::Sequence(items.iter().map(sub).collect()),
                    other => sub(other),
                };
                (key.clone(), value)
            })
            .collect();

        if task_name.is_empty() {
            return Err(ScriptingError::with_data("Invalid task name", &name).into());
        }
        run_task(&runner, &task_name, &TaskParams::new(substituted, &self.cache_path()))
    }
}
