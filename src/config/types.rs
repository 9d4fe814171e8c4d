use crate::paths::{PATH_HOME, PATH_INSTALLER_CACHE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_INSTALLER_URL: &str = "https://lutris.net/api/installers/%s";
pub const DEFAULT_INSTALLER_REVISION_URL: &str =
    "https://lutris.net/api/installers/game/%s/revisions/%s";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application settings, stored as settings.json in the config directory
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Settings {
    /// Parent directory for new game folders
    #[serde(default = "default_game_path")]
    pub game_path: PathBuf,
    /// Persistent cache for downloaded installer files.
    /// When unset, downloads only live for the duration of an install.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Forces $RESOLUTION instead of querying the display, e.g. "1920x1080"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,
    /// Installer API endpoint, `%s` is replaced by the game slug
    #[serde(default = "default_installer_url")]
    pub installer_url: String,
    /// Endpoint for one revision of an installer: slug, then revision
    #[serde(default = "default_installer_revision_url")]
    pub installer_revision_url: String,
}

fn default_game_path() -> PathBuf {
    PATH_HOME.join("Games")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_installer_url() -> String {
    DEFAULT_INSTALLER_URL.to_string()
}

fn default_installer_revision_url() -> String {
    DEFAULT_INSTALLER_REVISION_URL.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            game_path: default_game_path(),
            cache_path: None,
            log_level: default_log_level(),
            log_format: LogFormat::Pretty,
            resolution: None,
            installer_url: default_installer_url(),
            installer_revision_url: default_installer_revision_url(),
        }
    }
}

impl Settings {
    /// Parse the `resolution` override into (width, height)
    pub fn resolution_override(&self) -> Option<(u32, u32)> {
        let raw = self.resolution.as_deref()?;
        let (w, h) = raw.trim().split_once('x')?;
        Some((w.trim().parse().ok()?, h.trim().parse().ok()?))
    }

    /// Whether a user-configured persistent installer cache is active
    pub fn has_custom_cache_path(&self) -> bool {
        self.cache_path
            .as_ref()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false)
    }

    /// Root under which installer files are kept, one directory per game slug
    pub fn installer_cache_root(&self) -> PathBuf {
        match &self.cache_path {
            Some(path) if !path.as_os_str().is_empty() => path.clone(),
            _ => PATH_INSTALLER_CACHE.clone(),
        }
    }

    pub fn installer_url_for(&self, game_slug: &str) -> String {
        self.installer_url.replace("%s", game_slug)
    }

    pub fn installer_revision_url_for(&self, game_slug: &str, revision: &str) -> String {
        self.installer_revision_url
            .replacen("%s", game_slug, 1)
            .replacen("%s", revision, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"log_level": "debug"}"#).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.game_path, PATH_HOME.join("Games"));
        assert_eq!(settings.log_format, LogFormat::Pretty);
        assert!(!settings.has_custom_cache_path());
    }

    #[test]
    fn resolution_override_parses_width_and_height() {
        let settings = Settings {
            resolution: Some("2560x1440".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.resolution_override(), Some((2560, 1440)));

        let broken = Settings {
            resolution: Some("wide".to_string()),
            ..Default::default()
        };
        assert_eq!(broken.resolution_override(), None);
    }

    #[test]
    fn installer_url_substitutes_slug() {
        let settings = Settings::default();
        assert_eq!(
            settings.installer_url_for("quake"),
            "https://lutris.net/api/installers/quake"
        );
        assert_eq!(
            settings.installer_revision_url_for("quake", "42"),
            "https://lutris.net/api/installers/game/quake/revisions/42"
        );
    }

    #[test]
    fn installer_cache_root_prefers_custom_path() {
        let settings = Settings::default();
        assert_eq!(settings.installer_cache_root(), *PATH_INSTALLER_CACHE);

        let custom = Settings {
            cache_path: Some(PathBuf::from("/data/pga")),
            ..Default::default()
        };
        assert_eq!(custom.installer_cache_root(), PathBuf::from("/data/pga"));
    }
}
