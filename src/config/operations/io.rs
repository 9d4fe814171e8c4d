use crate::config::types::Settings;
use crate::error::Result;
use crate::paths::PATH_CONFIG;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub fn load_cfg() -> Settings {
    load_cfg_from(&PATH_CONFIG.join("settings.json"))
}

pub fn load_cfg_from(path: &Path) -> Settings {
    if let Ok(file) = File::open(path) {
        match serde_json::from_reader::<_, Settings>(BufReader::new(file)) {
            Ok(settings) => return settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
            }
        }
    }

    // Return default settings if file doesn't exist or has error
    Settings::default()
}

pub fn save_cfg(settings: &Settings) -> Result<()> {
    save_cfg_to(settings, &PATH_CONFIG.join("settings.json"))
}

pub fn save_cfg_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, settings)?;
    Ok(())
}
