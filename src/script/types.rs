use crate::error::ScriptingError;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use super::pure::value::{is_truthy, value_to_string};

/// An installer as published by the website or written by hand: metadata
/// about the game plus the `script` that installs it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Installer {
    pub id: Option<Value>,
    pub name: String,
    pub game_slug: String,
    /// Installer slug, e.g. `quake-gog`
    pub slug: String,
    pub version: String,
    pub runner: String,
    pub year: Option<Value>,
    pub steamid: Option<Value>,
    pub gogid: Option<Value>,
    pub humblestoreid: Option<Value>,
    pub description: Option<String>,
    pub notes: Option<String>,
    /// Extra substitution variables
    pub variables: BTreeMap<String, Value>,
    pub script: Value,
}

impl Installer {
    /// Name shown to the user, `custom-name` wins over the catalog name
    pub fn game_name(&self) -> String {
        self.script
            .get("custom-name")
            .and_then(value_to_string)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn display(&self) -> String {
        if self.version.is_empty() {
            format!("{} ({})", self.game_name(), self.slug)
        } else {
            format!("{} - {} ({})", self.game_name(), self.version, self.slug)
        }
    }
}

/// The `script` section of an installer, after it was checked to be a mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Script(Mapping);

impl Script {
    pub fn from_value(value: &Value) -> Option<Self> {
        value.as_mapping().map(|m| Script(m.clone()))
    }

    pub fn mapping(&self) -> &Mapping {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String value of a top-level key, empty strings count as missing
    pub fn get_str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_to_string).filter(|s| !s.is_empty())
    }

    pub fn game(&self) -> Option<&Mapping> {
        self.get("game").and_then(Value::as_mapping)
    }

    pub fn game_str(&self, key: &str) -> Option<String> {
        self.game()
            .and_then(|g| g.get(key))
            .and_then(value_to_string)
            .filter(|s| !s.is_empty())
    }

    pub fn requires(&self) -> Option<String> {
        self.get_str("requires")
    }

    pub fn extends(&self) -> Option<String> {
        self.get_str("extends")
    }

    pub fn require_binaries(&self) -> Option<String> {
        self.get_str("require-binaries")
    }

    pub fn install_complete_text(&self) -> Option<String> {
        self.get_str("install_complete_text")
    }

    /// Flattened `files:` section as (file id, raw meta) pairs, in order
    pub fn files(&self) -> Result<Vec<(String, Value)>, ScriptingError> {
        let Some(files) = self.get("files") else {
            return Ok(Vec::new());
        };
        let Some(entries) = files.as_sequence() else {
            return Err(ScriptingError::with_data("The files section must be a list", files));
        };

        let mut out = Vec::new();
        for entry in entries {
            let Some(map) = entry.as_mapping() else {
                return Err(ScriptingError::with_data("Invalid file entry", entry));
            };
            for (id, meta) in map {
                let Some(id) = value_to_string(id) else {
                    return Err(ScriptingError::with_data("Invalid file id", id));
                };
                out.push((id, meta.clone()));
            }
        }
        Ok(out)
    }

    /// Directives of the `installer:` section
    pub fn commands(&self) -> Vec<Value> {
        self.get("installer")
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default()
    }

    pub fn command_names(&self) -> Vec<String> {
        self.commands()
            .iter()
            .filter_map(|command| match command {
                Value::Mapping(map) => map.keys().next().and_then(value_to_string),
                other => value_to_string(other),
            })
            .collect()
    }

    /// Raw `system.env` entries, values not yet substituted
    pub fn system_env(&self) -> Vec<(String, String)> {
        self.get("system")
            .and_then(|s| s.get("env"))
            .and_then(Value::as_mapping)
            .map(|env| {
                env.iter()
                    .filter_map(|(k, v)| Some((value_to_string(k)?, value_to_string(v).unwrap_or_default())))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether the script has a non-empty section for this key
    pub fn has_section(&self, key: &str) -> bool {
        self.get(key).map(is_truthy).unwrap_or(false)
    }
}
