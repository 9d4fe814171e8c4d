//! write_file, write_json and write_config

use crate::error::{Result, ScriptingError};
use crate::fileio::{IniConfig, selective_merge};
use crate::interpreter::pure::command::{check_required_params, param_bool, param_str};
use crate::interpreter::types::Interpreter;
use crate::script::{pure::value::is_truthy, value_to_string};

use serde_yaml::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl Interpreter {
    fn target_file(&self, params: &Value) -> PathBuf {
        let file = params.get("file").and_then(value_to_string).unwrap_or_default();
        PathBuf::from(self.get_file_path(&file))
    }

    pub(super) fn write_file(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["file"], &["content"]], params, "write_file")?;
        let path = self.target_file(params);
        create_parent(&path)?;

        let mode = param_str(params, "mode").unwrap_or_else(|| "w".to_string());
        let append = match mode.chars().next() {
            Some('w') => false,
            Some('a') => true,
            _ => return Err(ScriptingError::new(format!("Wrong value for write_file mode: '{}'", mode)).into()),
        };

        let content = params.get("content").and_then(value_to_string).unwrap_or_default();
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(&path)?;
        file.write_all(self.substitute(&content).as_bytes())?;
        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    pub(super) fn write_json(&mut self, params: &Value) -> Result<()> {
        check_required_params(&[&["file"], &["data"]], params, "write_json")?;
        let path = self.target_file(params);
        create_parent(&path)?;

        let mut json = serde_json::Value::Object(serde_json::Map::new());
        if param_bool(params, "merge", true) && path.exists() {
            let content = fs::read_to_string(&path)?;
            if !content.trim().is_empty() {
                match serde_json::from_str(&content) {
                    Ok(existing) => json = existing,
                    Err(e) => tracing::error!("Failed to parse JSON from file {}: {}", path.display(), e),
                }
            }
        }

        let data = params.get("data").cloned().unwrap_or(Value::Null);
        let data = serde_json::to_value(&data)?;
        selective_merge(&mut json, &data);

        fs::write(&path, serde_json::to_string_pretty(&json)?)?;
        Ok(())
    }

    pub(super) fn write_config(&mut self, params: &Value) -> Result<()> {
        let has_data = params.get("data").is_some_and(is_truthy);
        if has_data {
            check_required_params(&[&["file"], &["data"]], params, "write_config")?;
        } else {
            check_required_params(&[&["file"], &["section"], &["key"], &["value"]], params, "write_config")?;
        }

        let path = self.target_file(params);
        create_parent(&path)?;

        let mut config = if param_bool(params, "merge", true) {
            IniConfig::read(&path)?
        } else {
            IniConfig::default()
        };

        let entries = if has_data {
            let Some(data) = params.get("data").and_then(Value::as_mapping) else {
                return Err(ScriptingError::with_data("The data of write_config must be a mapping", params).into());
            };
            let mut entries = Vec::new();
            for (section, keys) in data {
                let section = value_to_string(section).unwrap_or_default();
                let Some(keys) = keys.as_mapping() else {
                    return Err(ScriptingError::with_data("Invalid write_config section", keys).into());
                };
                for (key, value) in keys {
                    entries.push((section.clone(), value_to_string(key).unwrap_or_default(), value.clone()));
                }
            }
            entries
        } else {
            vec![(
                param_str(params, "section").unwrap_or_default(),
                param_str(params, "key").unwrap_or_default(),
                params.get("value").cloned().unwrap_or(Value::Null),
            )]
        };

        for (section, key, value) in entries {
            config.add_section(&section);
            let value = value_to_string(&value).map(|v| self.substitute(&v));
            config.set(&section, &key, value);
        }

        config.write(&path)?;
        tracing::debug!("Updated config {}", path.display());
        Ok(())
    }
}
