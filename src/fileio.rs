//! Config file writers used by installer directives
//!
//! INI files are handled leniently: `=` is the only delimiter, keys keep
//! their case, keys may repeat and may have no value. JSON files are
//! deep-merged.

use crate::error::Result;

use std::fs;
use std::path::Path;

/// One `[section]` and its keys, in file order. Repeated keys are stored
/// once with their values joined by newlines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, Option<String>)>,
}

impl IniSection {
    fn get_mut(&mut self, key: &str) -> Option<&mut Option<String>> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IniConfig {
    pub sections: Vec<IniSection>,
}

impl IniConfig {
    pub fn parse(content: &str) -> Self {
        let mut config = IniConfig::default();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            if let Some((name, _)) = trimmed.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
                config.add_section(name);
                current_section = Some(name.to_string());
                continue;
            }

            let Some(section) = current_section.as_deref() else {
                tracing::warn!("Ignoring line outside of any section: {}", trimmed);
                continue;
            };

            let (key, value) = match trimmed.split_once('=') {
                Some((key, value)) => (key.trim_end(), Some(value.trim().to_string())),
                None => (trimmed, None),
            };
            config.append(section, key, value);
        }

        config
    }

    /// Parse `path`, a missing file is an empty config
    pub fn read(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Self::parse(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    pub fn add_section(&mut self, name: &str) {
        if !self.has_section(name) {
            self.sections.push(IniSection {
                name: name.to_string(),
                entries: Vec::new(),
            });
        }
    }

    fn section_mut(&mut self, name: &str) -> &mut IniSection {
        self.add_section(name);
        let index = self.sections.iter().position(|s| s.name == name).unwrap_or(self.sections.len() - 1);
        &mut self.sections[index]
    }

    /// Reading accumulates repeated keys
    fn append(&mut self, section: &str, key: &str, value: Option<String>) {
        let section = self.section_mut(section);
        let Some(slot) = section.get_mut(key) else {
            section.entries.push((key.to_string(), value));
            return;
        };
        match (slot, value) {
            (Some(existing), Some(value)) => {
                existing.push('\n');
                existing.push_str(&value);
            }
            (slot, value) => *slot = value,
        }
    }

    /// Setting replaces whatever the key held
    pub fn set(&mut self, section: &str, key: &str, value: Option<String>) {
        let section = self.section_mut(section);
        if let Some(slot) = section.get_mut(key) {
            *slot = value;
            return;
        }
        section.entries.push((key.to_string(), value));
    }

    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.name == section)?
            .entries
            .iter()
            .find(|(k, _)| k == key)?
            .1
            .as_deref()
    }

    /// `key=value` lines without spaces, a blank line after each section
    pub fn render(&self) -> String {
        let mut out = String::new();
        for section in &self.sections {
            out.push_str(&format!("[{}]\n", section.name));
            for (key, value) in &section.entries {
                match value {
                    Some(value) => {
                        for line in value.split('\n') {
                            out.push_str(&format!("{}={}\n", key, line));
                        }
                    }
                    None => out.push_str(&format!("{}\n", key)),
                }
            }
            out.push('\n');
        }
        out
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.render())?;
        Ok(())
    }
}

/// Recursively merge `extra` into `base`. Objects are merged key by key,
/// anything else in `extra` replaces the value in `base`.
pub fn selective_merge(base: &mut serde_json::Value, extra: &serde_json::Value) {
    match (base, extra) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(extra_map)) => {
            for (key, value) in extra_map {
                match base_map.get_mut(key) {
                    Some(existing) if existing.is_object() && value.is_object() => selective_merge(existing, value),
                    _ => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, extra) => *base = extra.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_sections_keys_and_bare_keys() {
        let config = IniConfig::parse("[Display]\nWidth = 1920\nFullscreen\n; comment\n[Audio]\nVolume=80\n");
        assert_eq!(config.get("Display", "Width"), Some("1920"));
        assert_eq!(config.get("Display", "Fullscreen"), None);
        assert_eq!(config.sections[0].entries[1], ("Fullscreen".to_string(), None));
        assert_eq!(config.get("Audio", "Volume"), Some("80"));
    }

    #[test]
    fn colon_is_not_a_delimiter_and_case_is_kept() {
        let config = IniConfig::parse("[Paths]\nDataDir=C:\\Games\nURL: http://x\n");
        assert_eq!(config.get("Paths", "DataDir"), Some("C:\\Games"));
        assert_eq!(config.sections[0].entries[1], ("URL: http://x".to_string(), None));
    }

    #[test]
    fn duplicate_keys_survive_a_round_trip() {
        let config = IniConfig::parse("[Mods]\nmod=a.pak\nmod=b.pak\n");
        assert_eq!(config.get("Mods", "mod"), Some("a.pak\nb.pak"));
        assert_eq!(config.render(), "[Mods]\nmod=a.pak\nmod=b.pak\n\n");
    }

    #[test]
    fn set_replaces_and_renders_without_spaces() {
        let mut config = IniConfig::parse("[Display]\nWidth = 800\n");
        config.set("Display", "Width", Some("1920".to_string()));
        config.set("Display", "Height", Some("1080".to_string()));
        config.set("New", "flag", None);
        assert_eq!(
            config.render(),
            "[Display]\nWidth=1920\nHeight=1080\n\n[New]\nflag\n\n"
        );
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = IniConfig::read(&dir.path().join("none.ini")).unwrap();
        assert!(config.sections.is_empty());
    }

    #[test]
    fn selective_merge_is_recursive() {
        let mut base = json!({"video": {"width": 800, "vsync": true}, "name": "old"});
        selective_merge(&mut base, &json!({"video": {"width": 1920}, "name": "new", "extra": [1]}));
        assert_eq!(
            base,
            json!({"video": {"width": 1920, "vsync": true}, "name": "new", "extra": [1]})
        );
    }

    #[test]
    fn selective_merge_replaces_non_objects() {
        let mut base = json!([1, 2]);
        selective_merge(&mut base, &json!({"a": 1}));
        assert_eq!(base, json!({"a": 1}));
    }
}
